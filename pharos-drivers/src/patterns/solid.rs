//! Solid color fill

use pharos_core::FrameBuffer;
use smart_leds::RGB8;

/// Holds the whole panel at one color
#[derive(Clone)]
pub struct SolidColor {
    color: RGB8,
    dirty: bool,
}

impl SolidColor {
    /// Create a fill with the given color
    pub fn new(color: RGB8) -> Self {
        Self { color, dirty: true }
    }

    /// Change the fill color
    pub fn set(&mut self, color: RGB8) {
        self.color = color;
        self.dirty = true;
    }

    /// Current fill color
    pub fn color(&self) -> RGB8 {
        self.color
    }

    /// Write the fill into the frame on the first step after a change
    pub fn step(&mut self, frame: &mut FrameBuffer) {
        if self.dirty {
            frame.fill(self.color);
            self.dirty = false;
        }
    }
}
