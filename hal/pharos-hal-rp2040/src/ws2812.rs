//! PIO-based WS2812 strip output
//!
//! Uses RP2040's Programmable I/O to generate the self-clocked serial
//! waveform the LED string expects. The CPU only feeds whole GRB words
//! into the TX FIFO; the state machine owns every bit timing.
//!
//! # Timing
//!
//! The program spends 10 PIO cycles per bit (T1=2, T2=5, T3=3), so the
//! state machine is clocked at 10x the 800 kHz bit rate. A "1" holds
//! the line high for T1+T2 cycles, a "0" for T1 only - both satisfy the
//! WS2812B thresholds with margin.
//!
//! The inter-frame latch (>50us low) is not generated here; the render
//! cadence between frames provides it.

use embassy_rp::pio::{
    Common, Config, Direction as PioDirection, FifoJoin, Instance, PioPin, ShiftConfig,
    ShiftDirection, StateMachine,
};
use embassy_rp::Peri;
use fixed::types::U24F8;

use pharos_core::StripWrite;

/// System clock frequency (RP2040 default)
pub const SYS_CLK_HZ: u32 = 125_000_000;

/// WS2812 bit rate
pub const BIT_RATE_HZ: u32 = 800_000;

/// PIO cycles per transmitted bit (T1 + T2 + T3)
pub const CYCLES_PER_BIT: u32 = 10;

/// Errors from strip output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ws2812Error {
    /// Frame length is not a whole number of GRB triplets
    BadFrameLength,
}

/// Calculate the 16.8 fixed-point PIO clock divider for a bit rate
///
/// The state machine runs `CYCLES_PER_BIT` instructions per bit, so the
/// divider is SYS_CLK / (bit_rate * CYCLES_PER_BIT), split into integer
/// and fractional parts.
pub fn calc_clock_divider(bit_rate_hz: u32) -> (u16, u8) {
    if bit_rate_hz == 0 {
        return (0xFFFF, 0xFF); // Maximum divider = stopped
    }

    let divisor = bit_rate_hz * CYCLES_PER_BIT;
    let divider_x256 = (SYS_CLK_HZ as u64 * 256) / (divisor as u64);

    let int_part = (divider_x256 / 256) as u32;
    let frac_part = (divider_x256 % 256) as u32;

    let int_part = int_part.min(0xFFFF) as u16;
    let frac_part = frac_part.min(0xFF) as u8;

    (int_part, frac_part)
}

/// WS2812 strip driver on one PIO state machine
pub struct Ws2812Pio<'d, PIO: Instance, const SM: usize> {
    sm: StateMachine<'d, PIO, SM>,
}

impl<'d, PIO: Instance, const SM: usize> Ws2812Pio<'d, PIO, SM> {
    /// Create a new strip driver
    ///
    /// # Arguments
    /// * `common` - PIO common resources (for loading the program)
    /// * `sm` - State machine to use
    /// * `data_pin` - GPIO pin wired to the strip's data input
    pub fn new<DATA: PioPin>(
        common: &mut Common<'d, PIO>,
        mut sm: StateMachine<'d, PIO, SM>,
        data_pin: Peri<'d, DATA>,
    ) -> Self {
        // Classic WS2812 side-set program: one `out` decides between the
        // long-high and short-high pulse shapes.
        let prg = pio_proc::pio_asm!(
            ".side_set 1",
            ".wrap_target",
            "bitloop:",
            "out x, 1       side 0 [2]", // T3: line low, fetch next bit
            "jmp !x do_zero side 1 [1]", // T1: line high for every bit
            "jmp bitloop    side 1 [4]", // T2: stay high for a one
            "do_zero:",
            "nop            side 0 [4]", // T2: stay low for a zero
            ".wrap",
        );

        let installed = common.load_program(&prg.program);
        let out_pin = common.make_pio_pin(data_pin);

        let mut cfg = Config::default();
        cfg.use_program(&installed, &[&out_pin]);

        let (int_part, frac_part) = calc_clock_divider(BIT_RATE_HZ);
        cfg.clock_divider = U24F8::from_bits(((int_part as u32) << 8) | frac_part as u32);

        // 24 data bits per LED, shifted out MSB-first; the FIFO is
        // transmit-only so eight words can queue ahead of the shifter.
        cfg.fifo_join = FifoJoin::TxOnly;
        cfg.shift_out = ShiftConfig {
            auto_fill: true,
            threshold: 24,
            direction: ShiftDirection::Left,
        };

        sm.set_config(&cfg);
        sm.set_pin_dirs(PioDirection::Out, &[&out_pin]);
        sm.set_enable(true);

        Self { sm }
    }
}

impl<'d, PIO: Instance, const SM: usize> StripWrite for Ws2812Pio<'d, PIO, SM> {
    type Error = Ws2812Error;

    fn write_frame(&mut self, grb: &[u8]) -> Result<(), Self::Error> {
        if grb.len() % 3 != 0 {
            return Err(Ws2812Error::BadFrameLength);
        }
        for led in grb.chunks_exact(3) {
            // Data bits occupy the top 24 bits of the FIFO word
            let word = (u32::from(led[0]) << 24) | (u32::from(led[1]) << 16) | (u32::from(led[2]) << 8);
            // Spin until the FIFO takes the word; the strip's bit timing
            // is the state machine's job, not ours
            while !self.sm.tx().try_push(word) {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_divider_for_800khz() {
        // 125 MHz / (800 kHz * 10) = 15.625 -> 15 + 160/256
        assert_eq!(calc_clock_divider(BIT_RATE_HZ), (15, 160));
    }

    #[test]
    fn test_zero_rate_stops_the_machine() {
        assert_eq!(calc_clock_divider(0), (0xFFFF, 0xFF));
    }
}
