//! Pharos Hardware Abstraction Layer
//!
//! This crate defines hardware abstraction traits that can be implemented
//! by chip-specific HALs (RP2040, AVR, etc.). This enables the same bus
//! protocol and panel logic to run on different controller boards.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (pharos-firmware, etc.)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pharos-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  pharos-hal-  │       │  (future HAL  │
//! │    rp2040     │       │   ports)      │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication
//! - [`uart::LineDriver`] - RS-485 transceiver driver-enable control
//! - [`store::ByteStore`] - Persistent single-byte cell storage

#![no_std]
#![deny(unsafe_code)]

pub mod store;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use store::{ByteStore, StorageCell, StoreError};
pub use uart::{LineDriver, UartRx, UartTx};
