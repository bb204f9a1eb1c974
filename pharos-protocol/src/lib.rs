//! Pharos Bus Command Protocol
//!
//! This crate implements the multi-drop command protocol spoken on the
//! shared RS-485 panel bus. A master controller addresses individual
//! panel nodes; every node sees every byte and frames only the commands
//! meant for it.
//!
//! # Protocol Overview
//!
//! Only two control bytes are reserved:
//! ```text
//! ┌────────┬─────────┬─────────────────┬────────────┐
//! │ '!'    │ ADDRESS │ PAYLOAD (ASCII) │ '$'        │
//! │ marker │ 1B      │ 0-N bytes       │ terminator │
//! └────────┴─────────┴─────────────────┴────────────┘
//! ```
//!
//! Address 0 is the broadcast address: every node frames the command but
//! suppresses its response so the bus is not flooded with replies.
//! Payloads are escape-free; the control byte values cannot appear in
//! them.
//!
//! The per-byte state machine ([`CommandLink`]) runs in the receive
//! interrupt. All faults degrade to counters or flags; nothing in this
//! crate allocates or blocks.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod commands;
pub mod framing;
pub mod parse;
pub mod ring;

pub use commands::{parse_command, CommandError, PanelCommand};
pub use framing::{
    CommandLink, FramingConfig, Phase, ADDRESS_MARKER, BROADCAST_ADDRESS, COMMAND_TERMINATOR,
    DEFAULT_ACK,
};
pub use parse::{leading_number, split_leading_digits};
pub use ring::{BufferFull, RingBuffer};
