//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy
//! tasks. Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use smart_leds::RGB8;

/// Render-affecting effects of bus commands
#[derive(Debug, Clone, Copy)]
pub enum RenderCommand {
    /// Select a pattern by index
    Pattern(u8),
    /// Show a single color
    Color(RGB8),
    /// Cap pattern brightness
    Brightness(u8),
}

/// Channel capacity for render commands
const RENDER_CHANNEL_SIZE: usize = 4;

/// Render commands from the command processor to the render task
pub static RENDER_CHANNEL: Channel<CriticalSectionRawMutex, RenderCommand, RENDER_CHANNEL_SIZE> =
    Channel::new();

/// Signal that the link framed a complete command
pub static COMMAND_READY: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Signal that transmit data is queued and the line should be driven
pub static TX_KICK: Signal<CriticalSectionRawMutex, ()> = Signal::new();
