//! Animation pattern state machines
//!
//! Each pattern advances one step per render frame and writes into the
//! caller-owned frame buffer.

pub mod pulse;
pub mod rainbow;
pub mod solid;

pub use pulse::PulseWalk;
pub use rainbow::RainbowFade;
pub use solid::SolidColor;

use pharos_core::FrameBuffer;
use smart_leds::RGB8;

/// The selectable panel pattern, dispatched by index from the bus
#[derive(Clone)]
pub enum Pattern {
    /// All LEDs dark
    Off,
    /// Single color across the panel
    Solid(SolidColor),
    /// Whole-panel color wheel fade
    Rainbow(RainbowFade),
    /// Walking pulse
    Pulse(PulseWalk),
}

impl Pattern {
    /// Look up a pattern by its bus command index
    pub fn from_index(index: u32, brightness: u8) -> Option<Self> {
        match index {
            0 => Some(Pattern::Off),
            1 => Some(Pattern::Solid(SolidColor::new(RGB8 {
                r: brightness,
                g: brightness,
                b: brightness,
            }))),
            2 => Some(Pattern::Rainbow(RainbowFade::new(brightness))),
            3 => Some(Pattern::Pulse(PulseWalk::new(brightness))),
            _ => None,
        }
    }

    /// Advance one animation step
    pub fn step(&mut self, frame: &mut FrameBuffer) {
        match self {
            Pattern::Off => frame.clear(),
            Pattern::Solid(p) => p.step(frame),
            Pattern::Rainbow(p) => p.step(frame),
            Pattern::Pulse(p) => p.step(frame),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_dispatch() {
        assert!(matches!(Pattern::from_index(0, 50), Some(Pattern::Off)));
        assert!(matches!(
            Pattern::from_index(2, 50),
            Some(Pattern::Rainbow(_))
        ));
        assert!(Pattern::from_index(99, 50).is_none());
    }

    #[test]
    fn test_off_clears_frame() {
        let mut frame = FrameBuffer::new();
        frame.fill(RGB8 { r: 9, g: 9, b: 9 });
        Pattern::Off.step(&mut frame);
        assert!(frame.as_bytes().iter().all(|&b| b == 0));
    }
}
