//! Timing hardware abstractions
//!
//! Two separate pieces of silicon hide behind these traits: a free-running
//! counter that is never written, and a one-shot countdown that raises the
//! board's timer interrupt. Wraparound folding and the arm/disarm protocol
//! live above in the contract layer.

/// Free-running 32-bit microsecond counter
///
/// The counter wraps naturally at `u32::MAX`; consumers fold the wrap
/// into a wider value. Ports with a different native tick width scale
/// to microseconds behind this trait.
pub trait CounterPort {
    /// Current raw counter value in microseconds
    ///
    /// Must be callable from interrupt context: a register read, no
    /// blocking, no allocation.
    fn raw_micros(&self) -> u32;
}

/// One-shot countdown that drives the deferred-timer interrupt
///
/// At most one deadline exists at a time. Implementations latch nothing
/// across `cancel`: a cancel must also discard an expiry that the
/// hardware has latched but not yet delivered, so a caller that cancels
/// and re-arms never sees a fire for the old deadline.
pub trait CountdownPort {
    /// Arm the countdown to fire once after `period_us` microseconds
    ///
    /// Replaces any armed deadline.
    fn arm(&mut self, period_us: u32);

    /// Disarm the countdown and drop any latched, undelivered expiry
    fn cancel(&mut self);
}
