//! In-memory counter and countdown

use core::cell::Cell;

use krepis_hal::{CounterPort, CountdownPort};

/// Free-running counter that advances by a fixed step per read
///
/// The step defaults to one microsecond so busy-wait delays terminate;
/// tests widen it to cross the 32-bit wrap quickly. Control methods
/// take `&self` because the counter is read through shared references.
#[derive(Debug)]
pub struct SimCounter {
    raw: Cell<u32>,
    step: Cell<u32>,
}

impl SimCounter {
    pub fn new() -> Self {
        Self {
            raw: Cell::new(0),
            step: Cell::new(1),
        }
    }

    /// Jump the counter to a raw value
    pub fn set_raw(&self, raw: u32) {
        self.raw.set(raw);
    }

    /// Change how far the counter advances per read
    pub fn set_step(&self, step: u32) {
        self.step.set(step);
    }

    /// Advance the counter without a read
    pub fn advance(&self, us: u32) {
        self.raw.set(self.raw.get().wrapping_add(us));
    }
}

impl Default for SimCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterPort for SimCounter {
    fn raw_micros(&self) -> u32 {
        let raw = self.raw.get();
        self.raw.set(raw.wrapping_add(self.step.get()));
        raw
    }
}

/// One-shot countdown that records arms, cancels and latched expiries
///
/// [`SimCountdown::latch_expiry`] models the hardware raising its
/// expiry flag before anyone handled it; per the port contract a cancel
/// discards the latch.
#[derive(Debug)]
pub struct SimCountdown {
    armed: Cell<Option<u32>>,
    latched: Cell<bool>,
    arms: Cell<u32>,
    cancels: Cell<u32>,
}

impl SimCountdown {
    pub fn new() -> Self {
        Self {
            armed: Cell::new(None),
            latched: Cell::new(false),
            arms: Cell::new(0),
            cancels: Cell::new(0),
        }
    }

    /// Period the countdown is currently armed with
    pub fn armed_period(&self) -> Option<u32> {
        self.armed.get()
    }

    /// Simulate the hardware latching an expiry
    pub fn latch_expiry(&self) {
        self.latched.set(true);
    }

    /// Whether an undelivered expiry is latched
    pub fn expiry_latched(&self) -> bool {
        self.latched.get()
    }

    /// Total arm calls
    pub fn arm_count(&self) -> u32 {
        self.arms.get()
    }

    /// Total cancel calls
    pub fn cancel_count(&self) -> u32 {
        self.cancels.get()
    }
}

impl Default for SimCountdown {
    fn default() -> Self {
        Self::new()
    }
}

impl CountdownPort for SimCountdown {
    fn arm(&mut self, period_us: u32) {
        self.armed.set(Some(period_us));
        self.arms.set(self.arms.get() + 1);
    }

    fn cancel(&mut self) {
        self.armed.set(None);
        self.latched.set(false);
        self.cancels.set(self.cancels.get() + 1);
    }
}
