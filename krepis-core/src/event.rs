//! I/O events and the sink they drain into
//!
//! Interrupt handlers produce compact [`IoEvent`] records; the interpreter
//! consumes them in normal context through its [`EventSink`]. The flag is
//! the event's identity (which watch slot, which serial device), the
//! payload carries the data that must survive until the drain.

use heapless::Vec;
use krepis_hal::SerialDevice;

/// Most bytes a single serial event carries; longer input is chunked
pub const MAX_RX_CHUNK: usize = 8;

/// Identity of an event source
///
/// Edge flags are watch-slot indices: a pin keeps the same flag for as
/// long as it stays watched, and the flag is reused only after unwatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventFlag {
    /// Edge on the pin held by this watch slot
    Edge(u8),
    /// Bytes received on a serial device
    SerialRx(SerialDevice),
}

/// Data carried by an event
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventPayload {
    /// Pin edge: capture time and the level after the edge
    Edge { at_us: u64, level: bool },
    /// Raw received bytes
    Bytes(Vec<u8, MAX_RX_CHUNK>),
}

/// One staged I/O event
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IoEvent {
    pub flag: EventFlag,
    pub payload: EventPayload,
}

/// Interpreter-side consumer of drained events
pub trait EventSink {
    fn deliver(&mut self, event: IoEvent);
}

/// Collecting sink, mostly for tests and simple consumers
///
/// Events past the vector's capacity are discarded.
impl<const N: usize> EventSink for Vec<IoEvent, N> {
    fn deliver(&mut self, event: IoEvent) {
        let _ = self.push(event);
    }
}
