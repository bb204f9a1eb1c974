//! Panel render task
//!
//! Steps the active pattern once per frame interval and pushes the
//! frame out through the self-clocked strip output. The gap between
//! frames doubles as the strip's latch time.

use defmt::*;
use embassy_rp::peripherals::PIO0;
use embassy_time::{Duration, Ticker};

use pharos_core::{FrameBuffer, PanelConfig, StripWrite};
use pharos_drivers::{Pattern, RainbowFade, SolidColor};
use pharos_hal_rp2040::Ws2812Pio;

use crate::channels::{RenderCommand, RENDER_CHANNEL};

/// Render task - animates the panel
#[embassy_executor::task]
pub async fn render_task(mut strip: Ws2812Pio<'static, PIO0, 0>, config: PanelConfig) {
    info!("Render task started");

    let mut frame = FrameBuffer::new();
    let mut brightness = config.max_brightness;
    let mut pattern = Pattern::Rainbow(RainbowFade::new(brightness));
    let mut ticker = Ticker::every(Duration::from_millis(config.frame_interval_ms as u64));

    loop {
        while let Ok(cmd) = RENDER_CHANNEL.try_receive() {
            match cmd {
                RenderCommand::Pattern(index) => {
                    match Pattern::from_index(index as u32, brightness) {
                        Some(p) => {
                            frame.clear();
                            pattern = p;
                        }
                        None => warn!("Unknown pattern {}", index),
                    }
                }
                RenderCommand::Color(color) => {
                    frame.clear();
                    pattern = Pattern::Solid(SolidColor::new(color));
                }
                RenderCommand::Brightness(level) => {
                    brightness = level;
                    // Restart the running pattern under the new cap
                    if matches!(pattern, Pattern::Rainbow(_)) {
                        pattern = Pattern::Rainbow(RainbowFade::new(brightness));
                    }
                }
            }
        }

        pattern.step(&mut frame);
        if strip.write_frame(frame.as_bytes()).is_err() {
            warn!("Frame write failed");
        }

        ticker.next().await;
    }
}
