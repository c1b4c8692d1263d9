//! Fail-soft diagnostics
//!
//! Queries like a level read on a misconfigured pin return a benign
//! default rather than failing; each absorbed anomaly is counted here so
//! misbehaving scripts stay visible without ever crashing the board.

use portable_atomic::{AtomicU32, Ordering};

/// Kinds of absorbed anomalies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// Query against a pin with no pinout entry
    UnknownPin,
    /// Query that does not apply to the pin's current mode
    InvalidPinOp,
    /// Auto-configuration for an analog access was refused
    UnsupportedState,
    /// Interrupt-side event with no live consumer (unwatched edge,
    /// countdown fire while disarmed, event drained after unwatch)
    SpuriousEvent,
    /// Staging queue was full; its oldest record was discarded
    DroppedEvent,
}

/// Relaxed counters, safe to bump from interrupt context
#[derive(Debug)]
pub struct Diagnostics {
    unknown_pin: AtomicU32,
    invalid_pin_op: AtomicU32,
    unsupported_state: AtomicU32,
    spurious_events: AtomicU32,
    dropped_events: AtomicU32,
}

impl Diagnostics {
    pub const fn new() -> Self {
        Self {
            unknown_pin: AtomicU32::new(0),
            invalid_pin_op: AtomicU32::new(0),
            unsupported_state: AtomicU32::new(0),
            spurious_events: AtomicU32::new(0),
            dropped_events: AtomicU32::new(0),
        }
    }

    /// Record one absorbed anomaly
    pub fn note(&self, fault: Fault) {
        #[cfg(feature = "defmt")]
        defmt::debug!("absorbed fault: {}", fault);

        let counter = match fault {
            Fault::UnknownPin => &self.unknown_pin,
            Fault::InvalidPinOp => &self.invalid_pin_op,
            Fault::UnsupportedState => &self.unsupported_state,
            Fault::SpuriousEvent => &self.spurious_events,
            Fault::DroppedEvent => &self.dropped_events,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Consistent-enough copy of all counters
    pub fn snapshot(&self) -> DiagSnapshot {
        DiagSnapshot {
            unknown_pin: self.unknown_pin.load(Ordering::Relaxed),
            invalid_pin_op: self.invalid_pin_op.load(Ordering::Relaxed),
            unsupported_state: self.unsupported_state.load(Ordering::Relaxed),
            spurious_events: self.spurious_events.load(Ordering::Relaxed),
            dropped_events: self.dropped_events.load(Ordering::Relaxed),
        }
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time counter values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DiagSnapshot {
    pub unknown_pin: u32,
    pub invalid_pin_op: u32,
    pub unsupported_state: u32,
    pub spurious_events: u32,
    pub dropped_events: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let diag = Diagnostics::new();
        diag.note(Fault::UnknownPin);
        diag.note(Fault::UnknownPin);
        diag.note(Fault::DroppedEvent);

        let snap = diag.snapshot();
        assert_eq!(snap.unknown_pin, 2);
        assert_eq!(snap.dropped_events, 1);
        assert_eq!(snap.invalid_pin_op, 0);
        assert_eq!(snap.spurious_events, 0);
    }
}
