//! LED pattern generators for Pharos panels
//!
//! Simple enumerated animation state machines. They only consume the
//! frame-buffer interface; all bus-protocol complexity lives elsewhere.

#![no_std]
#![deny(unsafe_code)]

pub mod patterns;

pub use patterns::{Pattern, PulseWalk, RainbowFade, SolidColor};
