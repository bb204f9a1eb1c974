//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod bus;
pub mod command;
pub mod render;
pub mod tick;

pub use bus::{bus_rx_task, bus_tx_task};
pub use command::command_task;
pub use render::render_task;
pub use tick::tick_task;
