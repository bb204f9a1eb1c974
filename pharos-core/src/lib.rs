//! Board-agnostic core logic for the LED panel firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Serial transport engine for the shared bus (ring buffers, receive
//!   callback dispatch, all-or-nothing transmit queueing)
//! - Persistent device address store
//! - Panel frame buffer and LED output seam
//! - Abstraction traits (byte sink, strip output)
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod address;
pub mod config;
pub mod panel;
pub mod traits;
pub mod transport;

pub use address::{AddressError, AddressStore, ADDRESS_INIT_SENTINEL, DEFAULT_ADDRESS};
pub use config::{BusConfig, PanelConfig};
pub use panel::{FrameBuffer, FRAME_BYTES, LED_COUNT, PANEL_ROWS, PANEL_WIDTH};
pub use traits::{ByteSink, StripWrite};
pub use transport::{BusSerial, TransportError};
