//! Whole-panel color wheel fade
//!
//! Walks the R-G-B color wheel one step per frame: each channel ramps
//! up or down between its endpoints, with the ramp directions derived
//! from the other two channels so the walk stays on the wheel.

use pharos_core::FrameBuffer;
use smart_leds::RGB8;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Ramp {
    Down,
    Hold,
    Up,
}

/// Color wheel fade across the whole panel
#[derive(Clone)]
pub struct RainbowFade {
    r: u8,
    g: u8,
    b: u8,
    r_ramp: Ramp,
    g_ramp: Ramp,
    b_ramp: Ramp,
    brightness: u8,
}

impl RainbowFade {
    /// Start at pure red with the given brightness cap
    pub fn new(brightness: u8) -> Self {
        Self {
            r: 0xFF,
            g: 0,
            b: 0,
            r_ramp: Ramp::Hold,
            g_ramp: Ramp::Hold,
            b_ramp: Ramp::Hold,
            brightness,
        }
    }

    /// Advance the wheel one step and repaint the panel
    pub fn step(&mut self, frame: &mut FrameBuffer) {
        // Ramp direction flips at the wheel's corner points
        if self.b == 0xFF && self.g == 0x00 {
            self.r_ramp = Ramp::Up;
        }
        if self.b == 0x00 && self.g == 0xFF {
            self.r_ramp = Ramp::Down;
        }
        if self.r == 0xFF && self.b == 0x00 {
            self.g_ramp = Ramp::Up;
        }
        if self.r == 0x00 && self.b == 0xFF {
            self.g_ramp = Ramp::Down;
        }
        if self.g == 0xFF && self.r == 0x00 {
            self.b_ramp = Ramp::Up;
        }
        if self.r == 0xFF && self.g == 0x00 {
            self.b_ramp = Ramp::Down;
        }

        self.r = ramp(self.r, self.r_ramp);
        self.g = ramp(self.g, self.g_ramp);
        self.b = ramp(self.b, self.b_ramp);

        frame.fill(self.scaled());
    }

    fn scaled(&self) -> RGB8 {
        let scale = |v: u8| ((v as u16 * self.brightness as u16) / 255) as u8;
        RGB8 {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
        }
    }
}

fn ramp(value: u8, direction: Ramp) -> u8 {
    match direction {
        Ramp::Up => value.saturating_add(1),
        Ramp::Down => value.saturating_sub(1),
        Ramp::Hold => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_ramping_green_from_red() {
        let mut p = RainbowFade::new(255);
        let mut frame = FrameBuffer::new();
        p.step(&mut frame);
        assert_eq!(p.r, 0xFF);
        assert_eq!(p.g, 1);
    }

    #[test]
    fn test_walks_full_wheel_and_returns() {
        let mut p = RainbowFade::new(255);
        let mut frame = FrameBuffer::new();
        // Six 255-step edges bring the walk back to pure red
        for _ in 0..(6 * 255) {
            p.step(&mut frame);
        }
        assert_eq!((p.r, p.g, p.b), (0xFF, 0, 0));
    }

    #[test]
    fn test_channels_stay_in_range_and_painted() {
        let mut p = RainbowFade::new(40);
        let mut frame = FrameBuffer::new();
        for _ in 0..1000 {
            p.step(&mut frame);
            let c = frame.color(0);
            assert!(c.r <= 40 && c.g <= 40 && c.b <= 40);
        }
    }
}
