//! System clock: wraparound folding and time-unit conversions
//!
//! The hardware gives us a free-running 32-bit microsecond counter that
//! wraps every ~71.6 minutes. [`SystemClock::now_us`] folds the wraps
//! into a 64-bit value that never decreases: each read samples the
//! counter and compares it against the previous sample inside one short
//! critical section, bumping the wrap epoch when the counter has rolled
//! over. The fold stays correct as long as the clock is read at least
//! once per wrap period, which the interpreter's idle loop guarantees
//! in practice.
//!
//! On top of the monotonic base sits a settable wall clock, implemented
//! as a signed offset so adjusting the time of day never moves
//! `now_us` backwards.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use krepis_hal::CounterPort;

#[derive(Debug, Clone, Copy)]
struct ClockEpoch {
    last_raw: u32,
    wraps: u32,
}

/// Monotonic clock over a wrapping hardware counter
pub struct SystemClock {
    epoch: Mutex<CriticalSectionRawMutex, Cell<ClockEpoch>>,
    /// Wall-clock adjustment relative to the monotonic base
    offset_us: Mutex<CriticalSectionRawMutex, Cell<i64>>,
}

impl SystemClock {
    pub const fn new() -> Self {
        Self {
            epoch: Mutex::new(Cell::new(ClockEpoch {
                last_raw: 0,
                wraps: 0,
            })),
            offset_us: Mutex::new(Cell::new(0)),
        }
    }

    /// Monotonically non-decreasing microseconds since boot
    ///
    /// Interrupt-safe. The counter is sampled inside the same critical
    /// section that updates the epoch, so concurrent readers' samples
    /// can never reach the fold out of order and masquerade as a
    /// rollover.
    pub fn now_us<C: CounterPort>(&self, counter: &C) -> u64 {
        self.epoch.lock(|epoch| {
            let raw = counter.raw_micros();
            let mut e = epoch.get();
            if raw < e.last_raw {
                // counter rolled over since the previous read
                e.wraps += 1;
            }
            e.last_raw = raw;
            epoch.set(e);
            ((e.wraps as u64) << 32) | raw as u64
        })
    }

    /// Current wall-clock time in microseconds
    pub fn system_time_us<C: CounterPort>(&self, counter: &C) -> i64 {
        let now = self.now_us(counter) as i64;
        now + self.offset_us.lock(|o| o.get())
    }

    /// Set the wall clock to `t_us`
    ///
    /// Only the offset moves; the monotonic base is untouched.
    pub fn set_system_time<C: CounterPort>(&self, counter: &C, t_us: i64) {
        let now = self.now_us(counter) as i64;
        self.offset_us.lock(|o| o.set(t_us - now));
    }

    /// Busy-wait for `us` microseconds
    pub fn delay_us<C: CounterPort>(&self, counter: &C, us: u64) {
        let start = self.now_us(counter);
        while self.now_us(counter) - start < us {
            core::hint::spin_loop();
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Milliseconds to internal microsecond ticks, round half away from zero
pub fn from_millis(ms: f64) -> i64 {
    let scaled = ms * 1000.0;
    if scaled >= 0.0 {
        (scaled + 0.5) as i64
    } else {
        (scaled - 0.5) as i64
    }
}

/// Internal microsecond ticks to milliseconds
pub fn to_millis(t_us: i64) -> f64 {
    t_us as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::thread;

    /// Counter double fed from a scripted list of raw values
    ///
    /// Repeats the final value once the script runs out.
    struct Replay {
        values: RefCell<std::vec::IntoIter<u32>>,
        last: Cell<u32>,
    }

    impl Replay {
        fn new(values: Vec<u32>) -> Self {
            Self {
                values: RefCell::new(values.into_iter()),
                last: Cell::new(0),
            }
        }
    }

    impl CounterPort for Replay {
        fn raw_micros(&self) -> u32 {
            match self.values.borrow_mut().next() {
                Some(v) => {
                    self.last.set(v);
                    v
                }
                None => self.last.get(),
            }
        }
    }

    /// Counter double that advances by a fixed step per read
    struct Stepper {
        raw: Cell<u32>,
        step: u32,
    }

    impl Stepper {
        fn new(start: u32, step: u32) -> Self {
            Self {
                raw: Cell::new(start),
                step,
            }
        }
    }

    impl CounterPort for Stepper {
        fn raw_micros(&self) -> u32 {
            let v = self.raw.get();
            self.raw.set(v.wrapping_add(self.step));
            v
        }
    }

    /// Counter double safe to share between threads
    struct SharedTick(AtomicU32);

    impl CounterPort for SharedTick {
        fn raw_micros(&self) -> u32 {
            self.0.fetch_add(1, Ordering::Relaxed)
        }
    }

    #[test]
    fn test_fold_across_wrap() {
        let clock = SystemClock::new();
        let counter = Replay::new(vec![0xFFFF_FFF0, 0x0000_0005]);

        let before = clock.now_us(&counter);
        let after = clock.now_us(&counter);

        assert_eq!(before, 0xFFFF_FFF0);
        assert_eq!(after, (1u64 << 32) | 5);
        assert!(after > before);
    }

    #[test]
    fn test_many_reads_stay_monotonic_across_wraps() {
        let clock = SystemClock::new();
        // Large step so 10k reads cross the 32-bit boundary many times
        let counter = Stepper::new(0xFFFF_FF00, 1 << 24);

        let mut prev = clock.now_us(&counter);
        for _ in 0..10_000 {
            let now = clock.now_us(&counter);
            assert!(now >= prev);
            prev = now;
        }
    }

    #[test]
    fn test_millis_round_trip() {
        let t = from_millis(123.456);
        assert_eq!(t, 123_456);
        let back = to_millis(t);
        assert!((back - 123.456).abs() < 0.001);

        assert_eq!(from_millis(0.0), 0);
        assert_eq!(from_millis(-2.5), -2_500);
        assert_eq!(to_millis(-2_500), -2.5);
    }

    #[test]
    fn test_set_system_time_offsets_wall_clock_only() {
        let clock = SystemClock::new();
        let counter = Stepper::new(1_000, 1);

        let mono_before = clock.now_us(&counter);
        clock.set_system_time(&counter, 5_000_000);

        let wall = clock.system_time_us(&counter);
        assert!((5_000_000..5_000_100).contains(&wall));

        // Monotonic base keeps counting from where it was
        let mono_after = clock.now_us(&counter);
        assert!(mono_after >= mono_before);
        assert!(mono_after < 1_000_000);

        // Turning the wall clock back still never moves now_us backwards
        clock.set_system_time(&counter, 0);
        assert!(clock.system_time_us(&counter) < 1_000);
        assert!(clock.now_us(&counter) >= mono_after);
    }

    #[test]
    fn test_delay_waits_out_the_counter() {
        let clock = SystemClock::new();
        let counter = Stepper::new(0, 1);

        let start = clock.now_us(&counter);
        clock.delay_us(&counter, 50);
        let end = clock.now_us(&counter);
        assert!(end - start >= 50);
    }

    #[test]
    fn test_concurrent_readers_never_fold_a_false_wrap() {
        let shared = Arc::new((SystemClock::new(), SharedTick(AtomicU32::new(0))));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    let (clock, tick) = &*shared;
                    let mut prev = 0u64;
                    for _ in 0..200_000 {
                        let now = clock.now_us(tick);
                        // the raw counter stays far below 2^32 here, so
                        // any folded wrap is a misread
                        assert!(now < 1u64 << 32);
                        assert!(now >= prev);
                        prev = now;
                    }
                })
            })
            .collect();

        for reader in readers {
            reader.join().unwrap();
        }
    }

    proptest! {
        /// Folding is non-decreasing for any raw sample sequence
        #[test]
        fn prop_fold_never_decreases(raws in proptest::collection::vec(any::<u32>(), 1..256)) {
            let clock = SystemClock::new();
            let counter = Replay::new(raws.clone());

            let mut prev = 0u64;
            for _ in 0..raws.len() {
                let now = clock.now_us(&counter);
                prop_assert!(now >= prev);
                prev = now;
            }
        }

        /// Conversions agree within rounding for practically sized values
        #[test]
        fn prop_millis_round_trip(ms in -1.0e9f64..1.0e9f64) {
            let t = from_millis(ms);
            let back = to_millis(t);
            prop_assert!((back - ms).abs() <= 0.0005);
        }
    }
}
