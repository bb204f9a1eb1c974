//! RP2040 HAL implementations for Pharos
//!
//! This crate provides RP2040-specific implementations of the shared
//! `pharos-hal` traits, plus RP2040-specific functionality:
//!
//! - Flash byte-cell store (implements `pharos_hal::ByteStore`)
//! - PIO-based WS2812 strip output (implements `pharos_core::StripWrite`)

#![no_std]

pub mod flash;
pub mod ws2812;

pub use flash::FlashByteStore;
pub use ws2812::Ws2812Pio;

// Re-export shared traits for convenience
pub use pharos_hal::{ByteStore, StorageCell};
