//! UART serial communication abstractions
//!
//! Provides traits for serial communication over the shared RS-485 panel
//! bus that can be implemented by chip-specific HALs, plus the baud-rate
//! divisor math common to all of them.

/// UART transmitter
///
/// Trait for sending data over a UART interface.
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Blocks until all data has been written or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    ///
    /// Returns once the last stop bit has left the shifter. On a shared
    /// bus the line driver must stay asserted until this completes.
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
///
/// Trait for receiving data from a UART interface.
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Read data from the UART
    ///
    /// Blocks until the buffer is filled or an error occurs.
    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Read a single byte from the UART
    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.read_blocking(&mut buf)?;
        Ok(buf[0])
    }
}

/// RS-485 transceiver driver-enable control
///
/// The panel bus is a shared differential pair: only the actively
/// transmitting device may assert the line driver, every other device
/// must keep its driver in the high-impedance listening state. The
/// driver must be asserted before the first byte is written and released
/// only after the final stop bit has left the wire.
pub trait LineDriver {
    /// Assert the driver and take ownership of the bus
    fn assert_driver(&mut self);

    /// Release the driver back to the high-impedance listening state
    fn release_driver(&mut self);
}

/// UART configuration
#[derive(Debug, Clone, Copy)]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 19_200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

/// Compute the 16x-oversampling baud-rate divisor for a clock frequency
///
/// Rounds to the nearest divisor rather than truncating, which halves
/// the worst-case rate error. Changing the divisor while a frame is on
/// the wire is undefined behavior; callers must wait for the transmitter
/// to drain first.
pub fn baud_divisor(clock_hz: u32, baudrate: u32) -> u16 {
    ((clock_hz + baudrate * 8) / (baudrate * 16) - 1) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divisor_rounds_to_nearest() {
        // Canonical 16 MHz AVR-class values
        assert_eq!(baud_divisor(16_000_000, 19_200), 51);
        assert_eq!(baud_divisor(16_000_000, 9_600), 103);
        assert_eq!(baud_divisor(16_000_000, 115_200), 8);
    }

    #[test]
    fn test_default_config_matches_bus_rate() {
        let cfg = UartConfig::default();
        assert_eq!(cfg.baudrate, 19_200);
        assert_eq!(cfg.data_bits, DataBits::Eight);
        assert_eq!(cfg.parity, Parity::None);
        assert_eq!(cfg.stop_bits, StopBits::One);
    }
}
