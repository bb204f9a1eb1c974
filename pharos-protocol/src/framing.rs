//! Bus command framing state machine
//!
//! Interprets the byte stream shared by every device on the bus. Only
//! two control bytes are reserved: the address marker and the command
//! terminator. Everything else is either an address value (immediately
//! after a marker) or payload.
//!
//! Command format on the wire:
//! ```text
//! ┌────────┬─────────┬──────────────┬────────────┐
//! │ MARKER │ ADDRESS │ PAYLOAD      │ TERMINATOR │
//! │ '!'    │ 1B      │ 0..CMD bytes │ '$'        │
//! └────────┴─────────┴──────────────┴────────────┘
//! ```
//!
//! [`CommandLink::on_byte`] runs in the receive-interrupt context: it is
//! allocation-free, never blocks, and degrades every fault to a counter
//! or flag. The ready/process/respond lifecycle methods run in the main
//! context. Any caller sharing one link between the two contexts must
//! wrap it in a critical section.

use core::fmt;

use heapless::Vec;

use crate::ring::{BufferFull, RingBuffer};

/// "Next byte is an address." Recognized in every state.
pub const ADDRESS_MARKER: u8 = 0x21; // '!'

/// Command terminator; only meaningful while addressed.
pub const COMMAND_TERMINATOR: u8 = 0x24; // '$'

/// Reserved address meaning "all devices"; responses suppressed.
pub const BROADCAST_ADDRESS: u8 = 0x00;

/// Default single-byte acknowledgment payload
pub const DEFAULT_ACK: u8 = b'k';

/// Framing parameters
///
/// One parameterized core serves every panel variant; the marker,
/// terminator, and timeout are configuration rather than forks.
#[derive(Debug, Clone, Copy)]
pub struct FramingConfig {
    /// Control byte announcing that an address byte follows
    pub address_marker: u8,
    /// Control byte ending a command's payload
    pub terminator: u8,
    /// Reserved all-devices address
    pub broadcast_address: u8,
    /// Ticks an addressed-but-unterminated command may sit idle before
    /// the link abandons it, or `None` to accumulate indefinitely
    pub idle_timeout_ticks: Option<u32>,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            address_marker: ADDRESS_MARKER,
            terminator: COMMAND_TERMINATOR,
            broadcast_address: BROADCAST_ADDRESS,
            idle_timeout_ticks: None,
        }
    }
}

/// Conceptual link state, derived from the framing flags
///
/// Used for logging and assertions; the transition rules operate on the
/// individual flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Not addressed; discarding non-marker bytes
    Idle,
    /// Address marker seen; next byte is an address
    ExpectAddress,
    /// Addressed; collecting payload bytes
    Accumulating,
    /// Terminator seen; waiting for the application
    Ready,
    /// Application is between begin and end of processing
    Processing,
}

/// Per-device command link state machine
///
/// `CMD` is the command buffer capacity, `RESP` the response buffer
/// capacity. Singleton-scoped to the one bus the device is attached to.
pub struct CommandLink<const CMD: usize, const RESP: usize> {
    cfg: FramingConfig,
    address: u8,
    /// This device is the active recipient of the in-flight command
    addressed: bool,
    /// Next byte on the wire is an address byte, not data
    addr_next: bool,
    /// Current command was sent to the broadcast address
    global: bool,
    /// A complete command is waiting for the application
    ready: bool,
    /// Application is between begin and end of processing
    in_progress: bool,
    /// A new address match arrived while a command was still unfinished
    overloaded: bool,
    force_global_response: bool,
    idle_ticks: u32,
    timeouts: u16,
    cmd: RingBuffer<CMD>,
    resp: Vec<u8, RESP>,
}

impl<const CMD: usize, const RESP: usize> CommandLink<CMD, RESP> {
    /// Create an idle link for a device with the given bus address
    pub fn new(address: u8, cfg: FramingConfig) -> Self {
        Self {
            cfg,
            address,
            addressed: false,
            addr_next: false,
            global: false,
            ready: false,
            in_progress: false,
            overloaded: false,
            force_global_response: false,
            idle_ticks: 0,
            timeouts: 0,
            cmd: RingBuffer::new(),
            resp: Vec::new(),
        }
    }

    /// This device's bus address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Adopt a newly assigned bus address
    ///
    /// Takes effect for the next address byte on the wire; the in-flight
    /// command (if any) completes under the old address.
    pub fn set_address(&mut self, address: u8) {
        self.address = address;
    }

    /// Feed one received byte through the transition rules
    ///
    /// Called once per byte, in receipt order, from the receive-interrupt
    /// context.
    pub fn on_byte(&mut self, byte: u8) {
        self.idle_ticks = 0;

        if self.addr_next {
            // One address byte per marker
            self.addr_next = false;
            if byte == self.address {
                if self.addressed || self.ready || self.in_progress {
                    // Master re-addressed this device before the previous
                    // command finished; force-complete the stale cycle so
                    // the bus is not stalled by one hung consumer.
                    self.abort_stale_cycle();
                }
                self.addressed = true;
            } else if byte == self.cfg.broadcast_address {
                self.global = true;
                self.addressed = true;
            } else if self.addressed {
                // Another device claimed the bus mid-frame; whatever we
                // were accumulating will never see its terminator.
                self.addressed = false;
                if !self.ready && !self.in_progress {
                    self.cmd.clear();
                }
            }
            return;
        }

        if byte == self.cfg.address_marker {
            // Recognized in every state: a device must watch for its own
            // address even while idle, and mid-payload this is the first
            // half of the collision path above.
            self.addr_next = true;
            return;
        }

        if byte == self.cfg.terminator {
            if self.addressed {
                self.ready = true;
                self.addressed = false;
            }
            return;
        }

        if self.addressed {
            // Full buffer drops the byte and counts it; framing continues
            // with whatever fits.
            let _ = self.cmd.push_back(byte);
        }
    }

    /// Feed a sequence of bytes in order
    pub fn on_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.on_byte(byte);
        }
    }

    /// Advance the idle timer; called from the main-loop cadence
    ///
    /// With a configured timeout, an addressed-but-unterminated command
    /// that sits idle past the limit is abandoned: the command buffer is
    /// cleared and the link returns to idle.
    pub fn tick(&mut self) {
        let Some(limit) = self.cfg.idle_timeout_ticks else {
            return;
        };
        if !self.addressed {
            self.idle_ticks = 0;
            return;
        }
        self.idle_ticks = self.idle_ticks.saturating_add(1);
        if self.idle_ticks > limit {
            self.cmd.clear();
            self.addressed = false;
            self.addr_next = false;
            self.global = false;
            self.idle_ticks = 0;
            self.timeouts = self.timeouts.saturating_add(1);
        }
    }

    /// True exactly when a terminated command awaits the application
    pub fn is_command_ready(&self) -> bool {
        self.ready
    }

    /// Begin processing the ready command
    ///
    /// Returns false (and does nothing) when no command is ready.
    pub fn begin_command(&mut self) -> bool {
        if !self.ready {
            return false;
        }
        self.in_progress = true;
        self.ready = false;
        true
    }

    /// Length of the framed command payload
    pub fn command_len(&self) -> usize {
        self.cmd.len()
    }

    /// Copy the framed command payload into `out` without consuming it
    ///
    /// Returns the number of bytes copied. Valid between
    /// [`begin_command`](Self::begin_command) and
    /// [`end_command`](Self::end_command).
    pub fn read_command(&self, out: &mut [u8]) -> usize {
        self.cmd.copy_to(out)
    }

    /// Append bytes to the response buffer
    pub fn respond(&mut self, bytes: &[u8]) -> Result<(), BufferFull> {
        self.resp.extend_from_slice(bytes).map_err(|_| BufferFull)
    }

    /// A `core::fmt::Write` adapter over the response buffer
    pub fn response_writer(&mut self) -> ResponseWriter<'_, RESP> {
        ResponseWriter { resp: &mut self.resp }
    }

    /// One-shot override consumed by the next [`end_command`](Self::end_command):
    /// send the response even for a broadcast command.
    pub fn force_response_on_global(&mut self) {
        self.force_global_response = true;
    }

    /// Finish the command cycle and return the bytes to transmit
    ///
    /// An empty response buffer is replaced with the default
    /// acknowledgment; a terminator is appended when absent and space
    /// remains. Returns `None` (suppressing transmission) when the
    /// command was global and no override was armed. Either way the
    /// command buffer is cleared, the global flag reset, and the link
    /// returns to idle.
    pub fn end_command(&mut self) -> Option<Vec<u8, RESP>> {
        if self.resp.is_empty() {
            let _ = self.resp.push(DEFAULT_ACK);
        }
        if self.resp.last() != Some(&self.cfg.terminator) {
            let _ = self.resp.push(self.cfg.terminator);
        }
        let send = !self.global || self.force_global_response;
        self.force_global_response = false;
        let out = if send { Some(self.resp.clone()) } else { None };
        self.resp.clear();
        self.cmd.clear();
        self.global = false;
        self.in_progress = false;
        out
    }

    /// A new address match arrived while a previous command was unfinished
    pub fn overloaded(&self) -> bool {
        self.overloaded
    }

    /// Acknowledge (reset) the overloaded flag
    pub fn clear_overloaded(&mut self) {
        self.overloaded = false;
    }

    /// Payload bytes dropped because the command buffer was full
    pub fn overflow_count(&self) -> u16 {
        self.cmd.overflow_count()
    }

    /// Commands abandoned by the idle timeout
    pub fn timeout_count(&self) -> u16 {
        self.timeouts
    }

    /// Conceptual state derived from the framing flags
    pub fn phase(&self) -> Phase {
        if self.in_progress {
            Phase::Processing
        } else if self.ready {
            Phase::Ready
        } else if self.addr_next {
            Phase::ExpectAddress
        } else if self.addressed {
            Phase::Accumulating
        } else {
            Phase::Idle
        }
    }

    /// Force-complete a stale command cycle after an address collision
    ///
    /// Runs in the interrupt context: the stale response is suppressed,
    /// never transmitted.
    fn abort_stale_cycle(&mut self) {
        self.overloaded = true;
        self.force_global_response = false;
        self.cmd.clear();
        self.resp.clear();
        self.ready = false;
        self.in_progress = false;
        self.global = false;
        self.addressed = false;
    }
}

/// `core::fmt::Write` adapter for building responses with `write!`
pub struct ResponseWriter<'a, const RESP: usize> {
    resp: &'a mut Vec<u8, RESP>,
}

impl<const RESP: usize> fmt::Write for ResponseWriter<'_, RESP> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.resp
            .extend_from_slice(s.as_bytes())
            .map_err(|_| fmt::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write as _;

    const OWN: u8 = 0x35; // '5'

    fn link() -> CommandLink<8, 16> {
        CommandLink::new(OWN, FramingConfig::default())
    }

    fn command_of<const C: usize, const R: usize>(l: &CommandLink<C, R>) -> Vec<u8, 64> {
        let mut buf = [0u8; 64];
        let n = l.read_command(&mut buf);
        Vec::from_slice(&buf[..n]).unwrap()
    }

    #[test]
    fn test_unaddressed_stream_is_discarded() {
        let mut l = link();
        l.on_bytes(b"hello world no markers here");
        assert!(!l.is_command_ready());
        assert_eq!(l.command_len(), 0);
        assert_eq!(l.phase(), Phase::Idle);
    }

    #[test]
    fn test_other_device_command_is_ignored() {
        let mut l = link();
        l.on_bytes(b"!\x36payload$");
        assert!(!l.is_command_ready());
        assert_eq!(l.command_len(), 0);
    }

    #[test]
    fn test_own_address_frames_payload_exactly() {
        let mut l = link();
        l.on_bytes(b"!\x35p1r2$");
        assert!(l.is_command_ready());
        assert_eq!(&command_of(&l)[..], b"p1r2");

        assert!(l.begin_command());
        assert!(!l.is_command_ready());
        let out = l.end_command().unwrap();
        assert_eq!(&out[..], b"k$");
        assert_eq!(l.phase(), Phase::Idle);
        assert_eq!(l.command_len(), 0);
    }

    #[test]
    fn test_broadcast_suppresses_response() {
        let mut l = link();
        l.on_bytes(b"!\x00all$");
        assert!(l.is_command_ready());
        assert!(l.begin_command());
        assert_eq!(l.end_command(), None);
        // Suppression is per-command; the next direct command answers.
        l.on_bytes(b"!\x35x$");
        assert!(l.begin_command());
        assert!(l.end_command().is_some());
    }

    #[test]
    fn test_forced_response_on_broadcast_is_one_shot() {
        let mut l = link();
        l.on_bytes(b"!\x00q$");
        assert!(l.begin_command());
        l.force_response_on_global();
        assert!(l.end_command().is_some());

        l.on_bytes(b"!\x00q$");
        assert!(l.begin_command());
        assert_eq!(l.end_command(), None);
    }

    #[test]
    fn test_payload_overflow_counts_dropped_bytes() {
        let mut l = link(); // CMD capacity 8
        l.on_bytes(b"!\x35abcdefghijkl$");
        assert!(l.is_command_ready());
        assert_eq!(&command_of(&l)[..], b"abcdefgh");
        assert_eq!(l.overflow_count(), 4);
    }

    #[test]
    fn test_collision_discards_stale_payload() {
        let mut l = link();
        l.on_bytes(b"!\x35payload1!\x35pay2$");
        assert!(l.overloaded());
        assert!(l.is_command_ready());
        assert_eq!(&command_of(&l)[..], b"pay2");
    }

    #[test]
    fn test_collision_while_processing_suppresses_stale_response() {
        let mut l = link();
        l.on_bytes(b"!\x35one$");
        assert!(l.begin_command());
        l.respond(b"stale").unwrap();
        // Master re-addresses before the application finished
        l.on_bytes(b"!\x35two$");
        assert!(l.overloaded());
        assert!(l.is_command_ready());
        assert_eq!(&command_of(&l)[..], b"two");
        // The stale response buffer was discarded with the stale cycle
        assert!(l.begin_command());
        assert_eq!(&l.end_command().unwrap()[..], b"k$");
    }

    #[test]
    fn test_collision_while_ready_discards_unclaimed_command() {
        let mut l = link();
        l.on_bytes(b"!\x35first$");
        assert!(l.is_command_ready());
        l.on_bytes(b"!\x35second$");
        assert!(l.overloaded());
        assert_eq!(&command_of(&l)[..], b"second");
    }

    #[test]
    fn test_foreign_address_discards_partial_frame() {
        let mut l = link();
        l.on_bytes(b"!\x35ab!\x41cd$");
        // 0x41 claimed the bus mid-frame; the partial payload is stale
        // and the terminator belongs to the other device's command.
        assert!(!l.is_command_ready());
        assert_eq!(l.command_len(), 0);
        assert_eq!(l.phase(), Phase::Idle);
    }

    #[test]
    fn test_broadcast_mid_command_marks_global_without_buffering_marker() {
        let mut l = link();
        l.on_bytes(b"!\x35ab!\x00cd$");
        assert!(l.is_command_ready());
        // Accumulation continues across the re-address; the marker byte
        // itself is control, not payload.
        assert_eq!(&command_of(&l)[..], b"abcd");
        assert!(l.begin_command());
        // The cycle became global, so the response is suppressed.
        assert_eq!(l.end_command(), None);
    }

    #[test]
    fn test_custom_response_gets_terminator() {
        let mut l = link();
        l.on_bytes(b"!\x35v$");
        assert!(l.begin_command());
        write!(l.response_writer(), "addr={}", OWN).unwrap();
        let out = l.end_command().unwrap();
        assert_eq!(&out[..], b"addr=53$");
    }

    #[test]
    fn test_response_ending_in_terminator_not_doubled() {
        let mut l = link();
        l.on_bytes(b"!\x35v$");
        assert!(l.begin_command());
        l.respond(b"ok$").unwrap();
        assert_eq!(&l.end_command().unwrap()[..], b"ok$");
    }

    #[test]
    fn test_ready_and_in_progress_never_both() {
        let mut l = link();
        l.on_bytes(b"!\x35a$");
        assert_eq!(l.phase(), Phase::Ready);
        l.begin_command();
        assert_eq!(l.phase(), Phase::Processing);
        assert!(!l.is_command_ready());
        l.end_command();
        assert_eq!(l.phase(), Phase::Idle);
    }

    #[test]
    fn test_begin_without_ready_is_refused() {
        let mut l = link();
        assert!(!l.begin_command());
        assert_eq!(l.phase(), Phase::Idle);
    }

    #[test]
    fn test_idle_timeout_abandons_unterminated_command() {
        let cfg = FramingConfig {
            idle_timeout_ticks: Some(3),
            ..FramingConfig::default()
        };
        let mut l: CommandLink<8, 16> = CommandLink::new(OWN, cfg);
        l.on_bytes(b"!\x35abc");
        assert_eq!(l.phase(), Phase::Accumulating);
        for _ in 0..4 {
            l.tick();
        }
        assert_eq!(l.phase(), Phase::Idle);
        assert_eq!(l.command_len(), 0);
        assert_eq!(l.timeout_count(), 1);
        // A fresh command still frames normally afterwards
        l.on_bytes(b"!\x35xy$");
        assert!(l.is_command_ready());
        assert_eq!(&command_of(&l)[..], b"xy");
    }

    #[test]
    fn test_byte_arrival_resets_idle_timer() {
        let cfg = FramingConfig {
            idle_timeout_ticks: Some(2),
            ..FramingConfig::default()
        };
        let mut l: CommandLink<8, 16> = CommandLink::new(OWN, cfg);
        l.on_bytes(b"!\x35a");
        for _ in 0..8 {
            l.tick();
            l.on_byte(b'b'); // traffic keeps the command alive
        }
        assert_eq!(l.phase(), Phase::Accumulating);
        assert_eq!(l.timeout_count(), 0);
    }

    #[test]
    fn test_no_timeout_by_default() {
        let mut l = link();
        l.on_bytes(b"!\x35abc");
        for _ in 0..10_000 {
            l.tick();
        }
        assert_eq!(l.phase(), Phase::Accumulating);
    }

    #[test]
    fn test_address_change_applies_to_next_command() {
        let mut l = link();
        l.set_address(0x42);
        l.on_bytes(b"!\x35old$");
        assert!(!l.is_command_ready());
        l.on_bytes(b"!\x42new$");
        assert!(l.is_command_ready());
        assert_eq!(&command_of(&l)[..], b"new");
    }
}

#[cfg(test)]
mod proptests {
    use super::{CommandLink, FramingConfig, Phase, ADDRESS_MARKER, COMMAND_TERMINATOR};
    use proptest::prelude::*;

    fn non_control() -> impl Strategy<Value = u8> {
        any::<u8>().prop_filter("non-control byte", |&b| {
            b != ADDRESS_MARKER && b != COMMAND_TERMINATOR
        })
    }

    proptest! {
        /// Streams free of the control bytes never address the device,
        /// never buffer payload, and never produce a ready command.
        #[test]
        fn never_addressed_stays_idle(
            stream in proptest::collection::vec(non_control(), 0..256),
        ) {
            let mut link: CommandLink<16, 16> =
                CommandLink::new(0x35, FramingConfig::default());
            link.on_bytes(&stream);
            prop_assert_eq!(link.phase(), Phase::Idle);
            prop_assert!(!link.is_command_ready());
            prop_assert_eq!(link.command_len(), 0);
        }

        /// A well-formed frame to our address yields exactly its payload.
        #[test]
        fn frames_arbitrary_payload(
            payload in proptest::collection::vec(non_control(), 0..16),
        ) {
            let mut link: CommandLink<16, 16> =
                CommandLink::new(0x35, FramingConfig::default());
            link.on_byte(ADDRESS_MARKER);
            link.on_byte(0x35);
            link.on_bytes(&payload);
            link.on_byte(COMMAND_TERMINATOR);
            prop_assert!(link.is_command_ready());
            let mut buf = [0u8; 16];
            let n = link.read_command(&mut buf);
            prop_assert_eq!(&buf[..n], &payload[..]);
        }
    }
}
