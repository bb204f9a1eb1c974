//! Panel frame buffer
//!
//! Caller-owned byte frame for the WS2812 strings, three bytes per LED
//! in the G-R-B channel order the strip shifts in. The panel is split
//! into an upper and a lower string; `PANEL_ROWS` is the height of one
//! half.

use smart_leds::RGB8;

/// LEDs per row
pub const PANEL_WIDTH: usize = 40;
/// Rows per half-panel string
pub const PANEL_ROWS: usize = 11;
/// LEDs on one string
pub const LED_COUNT: usize = PANEL_WIDTH * PANEL_ROWS;
/// Frame size in bytes (three channels per LED)
pub const FRAME_BYTES: usize = LED_COUNT * 3;

/// One half-panel's worth of GRB channel data
#[derive(Clone)]
pub struct FrameBuffer {
    data: [u8; FRAME_BYTES],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    /// Create an all-dark frame
    pub const fn new() -> Self {
        Self {
            data: [0u8; FRAME_BYTES],
        }
    }

    /// Set the color of one LED by its position along the string
    ///
    /// Out-of-range positions are ignored.
    pub fn set_color(&mut self, led: usize, color: RGB8) {
        if led >= LED_COUNT {
            return;
        }
        let index = led * 3;
        self.data[index] = color.g;
        self.data[index + 1] = color.r;
        self.data[index + 2] = color.b;
    }

    /// Read back the color of one LED
    pub fn color(&self, led: usize) -> RGB8 {
        if led >= LED_COUNT {
            return RGB8::default();
        }
        let index = led * 3;
        RGB8 {
            r: self.data[index + 1],
            g: self.data[index],
            b: self.data[index + 2],
        }
    }

    /// Set every LED to the same color
    pub fn fill(&mut self, color: RGB8) {
        for led in 0..LED_COUNT {
            self.set_color(led, color);
        }
    }

    /// Turn every LED off
    pub fn clear(&mut self) {
        self.data = [0u8; FRAME_BYTES];
    }

    /// The raw GRB bytes, ready for the strip output
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of LEDs in the frame
    pub const fn len(&self) -> usize {
        LED_COUNT
    }

    /// True for a zero-LED frame (never, at current panel dimensions)
    pub const fn is_empty(&self) -> bool {
        LED_COUNT == 0
    }
}
