//! Deferred timer state machine
//!
//! One countdown serves the whole board. The interpreter computes its
//! next wake deadline and (re)arms the timer here; the timer interrupt
//! calls [`DeferredTimer::fire`] and wakes the scheduler exactly when a
//! deadline is armed. The protocol is strict: arm only from disabled,
//! disable at any time. Rescheduling cancels the hardware countdown and
//! arms the new deadline inside one critical section, so an expiry of
//! the superseded deadline can never slip through in between.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use krepis_hal::CountdownPort;

use crate::error::HalError;

/// Shortest accepted countdown period
///
/// Anything shorter arms at this floor instead, so an already-overdue
/// deadline fires promptly rather than never.
pub const MIN_TIMER_PERIOD_US: u32 = 20;

/// Armed/disabled state of the single deferred timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerState {
    /// No deadline; countdown fires are spurious and swallowed
    Disabled,
    /// Countdown armed toward an absolute deadline
    Armed { deadline_us: u64 },
}

/// The board's one deferred timer
pub struct DeferredTimer {
    state: Mutex<CriticalSectionRawMutex, Cell<TimerState>>,
}

impl DeferredTimer {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(Cell::new(TimerState::Disabled)),
        }
    }

    /// Clamp a requested period into the range the hardware accepts
    pub fn clamp_period(period_us: i64) -> u32 {
        if period_us < MIN_TIMER_PERIOD_US as i64 {
            MIN_TIMER_PERIOD_US
        } else if period_us > u32::MAX as i64 {
            u32::MAX
        } else {
            period_us as u32
        }
    }

    /// Disarm the countdown and forget the deadline
    ///
    /// Always legal, idempotent. The port cancel happens inside the same
    /// critical section as the state change, leaving no window for a
    /// latched expiry to land on a half-disabled timer.
    pub fn disable<P: CountdownPort>(&self, port: &mut P) {
        self.state.lock(|state| {
            port.cancel();
            state.set(TimerState::Disabled);
        });
    }

    /// Arm a new deadline `period_us` from `now_us`
    ///
    /// Errors if a deadline is already armed; the armed deadline stays
    /// untouched. Use [`DeferredTimer::reschedule`] to supersede.
    pub fn start<P: CountdownPort>(
        &self,
        port: &mut P,
        period_us: i64,
        now_us: u64,
    ) -> Result<(), HalError> {
        let period = Self::clamp_period(period_us);
        self.state.lock(|state| {
            if matches!(state.get(), TimerState::Armed { .. }) {
                return Err(HalError::TimerProtocolViolation);
            }
            port.arm(period);
            state.set(TimerState::Armed {
                deadline_us: now_us + period as u64,
            });
            Ok(())
        })
    }

    /// Replace whatever deadline exists with a new one
    ///
    /// Disable-then-start as a single critical section: the old countdown
    /// (and any expiry it latched) is gone before the new one arms.
    pub fn reschedule<P: CountdownPort>(&self, port: &mut P, period_us: i64, now_us: u64) {
        let period = Self::clamp_period(period_us);
        self.state.lock(|state| {
            port.cancel();
            port.arm(period);
            state.set(TimerState::Armed {
                deadline_us: now_us + period as u64,
            });
        });
    }

    /// Countdown expiry, from the timer interrupt
    ///
    /// Returns `true` when a deadline was armed (the caller wakes the
    /// scheduler); a fire while disabled is spurious and reports `false`.
    /// There is no auto-repeat: the timer is disabled by its own fire.
    pub fn fire(&self) -> bool {
        self.state.lock(|state| match state.get() {
            TimerState::Armed { .. } => {
                state.set(TimerState::Disabled);
                true
            }
            TimerState::Disabled => false,
        })
    }

    /// Current protocol state
    pub fn state(&self) -> TimerState {
        self.state.lock(|state| state.get())
    }
}

impl Default for DeferredTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Countdown double that records the arm/cancel call sequence
    #[derive(Default)]
    struct RecordingCountdown {
        armed: Option<u32>,
        arms: u32,
        cancels: u32,
    }

    impl CountdownPort for RecordingCountdown {
        fn arm(&mut self, period_us: u32) {
            self.armed = Some(period_us);
            self.arms += 1;
        }

        fn cancel(&mut self) {
            self.armed = None;
            self.cancels += 1;
        }
    }

    #[test]
    fn test_start_arms_once() {
        let timer = DeferredTimer::new();
        let mut port = RecordingCountdown::default();

        timer.start(&mut port, 500, 1_000).unwrap();
        assert_eq!(port.armed, Some(500));
        assert_eq!(
            timer.state(),
            TimerState::Armed { deadline_us: 1_500 }
        );
    }

    #[test]
    fn test_double_start_is_protocol_violation() {
        let timer = DeferredTimer::new();
        let mut port = RecordingCountdown::default();

        timer.start(&mut port, 500, 0).unwrap();
        assert_eq!(
            timer.start(&mut port, 900, 0).err(),
            Some(HalError::TimerProtocolViolation)
        );
        // The armed deadline survives the rejected start
        assert_eq!(port.armed, Some(500));
        assert_eq!(timer.state(), TimerState::Armed { deadline_us: 500 });
    }

    #[test]
    fn test_disable_is_idempotent() {
        let timer = DeferredTimer::new();
        let mut port = RecordingCountdown::default();

        timer.start(&mut port, 500, 0).unwrap();
        timer.disable(&mut port);
        timer.disable(&mut port);

        assert_eq!(timer.state(), TimerState::Disabled);
        assert_eq!(port.armed, None);
        assert_eq!(port.cancels, 2);

        // Start is legal again after disable
        timer.start(&mut port, 100, 0).unwrap();
    }

    #[test]
    fn test_reschedule_cancels_before_arming() {
        let timer = DeferredTimer::new();
        let mut port = RecordingCountdown::default();

        timer.start(&mut port, 100, 0).unwrap();
        timer.reschedule(&mut port, 5_000, 50);

        assert_eq!(port.cancels, 1);
        assert_eq!(port.armed, Some(5_000));
        assert_eq!(
            timer.state(),
            TimerState::Armed { deadline_us: 5_050 }
        );

        // Reschedule also works from disabled
        timer.disable(&mut port);
        timer.reschedule(&mut port, 300, 60);
        assert_eq!(port.armed, Some(300));
    }

    #[test]
    fn test_fire_disables_and_spurious_is_swallowed() {
        let timer = DeferredTimer::new();
        let mut port = RecordingCountdown::default();

        timer.start(&mut port, 100, 0).unwrap();
        assert!(timer.fire());
        assert_eq!(timer.state(), TimerState::Disabled);

        // A second expiry has no armed deadline behind it
        assert!(!timer.fire());
    }

    #[test]
    fn test_period_clamping() {
        assert_eq!(DeferredTimer::clamp_period(-5), MIN_TIMER_PERIOD_US);
        assert_eq!(DeferredTimer::clamp_period(0), MIN_TIMER_PERIOD_US);
        assert_eq!(DeferredTimer::clamp_period(19), MIN_TIMER_PERIOD_US);
        assert_eq!(DeferredTimer::clamp_period(20), 20);
        assert_eq!(DeferredTimer::clamp_period(1_000_000), 1_000_000);
        assert_eq!(
            DeferredTimer::clamp_period(u32::MAX as i64 + 10),
            u32::MAX
        );
    }
}
