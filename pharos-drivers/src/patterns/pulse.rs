//! Walking pulse
//!
//! Brightens one LED up to the cap, blanks its neighbor, then advances
//! the cursor two positions and repeats, wrapping at the end of the
//! string.

use pharos_core::{FrameBuffer, LED_COUNT};
use smart_leds::RGB8;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Stage {
    Brighten,
    Blank,
}

/// Pulse that walks along the string
#[derive(Clone)]
pub struct PulseWalk {
    stage: Stage,
    level: u8,
    cursor: usize,
    max: u8,
}

impl PulseWalk {
    /// Create a walk starting at the head of the string
    pub fn new(max: u8) -> Self {
        Self {
            stage: Stage::Brighten,
            level: 0,
            cursor: 0,
            max,
        }
    }

    /// Position of the LED currently pulsing
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Advance one animation step
    pub fn step(&mut self, frame: &mut FrameBuffer) {
        match self.stage {
            Stage::Brighten => {
                self.level = self.level.saturating_add(1);
                if self.level <= self.max {
                    let v = self.level;
                    frame.set_color(self.cursor, RGB8 { r: v, g: v, b: v });
                } else {
                    self.stage = Stage::Blank;
                    self.level = 0;
                }
            }
            Stage::Blank => {
                self.level = self.level.saturating_add(1);
                if self.level <= self.max {
                    frame.set_color(self.cursor + 1, RGB8::default());
                } else {
                    self.stage = Stage::Brighten;
                    self.level = 0;
                    self.cursor = if self.cursor + 2 < LED_COUNT {
                        self.cursor + 2
                    } else {
                        0
                    };
                }
            }
        }
    }
}
