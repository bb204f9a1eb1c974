//! Abstraction traits at the seams of the core
//!
//! The serial transport delivers received bytes to an injected
//! [`ByteSink`] rather than a hard-wired consumer, and panel frames
//! leave through [`StripWrite`] rather than a specific output
//! peripheral.

use pharos_protocol::CommandLink;

/// Consumer of received bus bytes
///
/// Installed into the transport at initialization and invoked once per
/// byte from the receive-interrupt context. Implementations must not
/// allocate, block, or fail unboundedly.
pub trait ByteSink {
    /// Handle one received byte
    fn on_byte(&mut self, byte: u8);
}

impl<const CMD: usize, const RESP: usize> ByteSink for CommandLink<CMD, RESP> {
    fn on_byte(&mut self, byte: u8) {
        CommandLink::on_byte(self, byte);
    }
}

/// Self-clocked LED strip output
///
/// Transmits a whole GRB frame over the dedicated output line with
/// fixed inter-bit timing meeting the LED protocol's thresholds. The
/// waveform generation itself is a hardware concern behind this seam.
pub trait StripWrite {
    /// Error type for frame output
    type Error;

    /// Transmit `grb` (three bytes per LED, G-R-B channel order)
    fn write_frame(&mut self, grb: &[u8]) -> Result<(), Self::Error>;
}
