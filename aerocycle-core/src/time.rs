//! Time management for the cycle scheduler
//!
//! Provides clock implementations and the delta tracker that turns clock
//! readings into cycle `dt` values:
//! - Monotonic clock (for flight)
//! - Manual clock (for tests and replays)

use std::sync::Arc;
use std::time::Instant;

use aerocycle_si::{Quantity, Time};
use parking_lot::Mutex;

use crate::traits::Clock;

/// Monotonic clock backed by `std::time::Instant`
///
/// Starts at zero when created, always increases
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Time {
        Time::from(self.start.elapsed())
    }

    fn precision(&self) -> Time {
        Time::from_us(1.0)
    }
}

/// Hand-driven clock for testing
///
/// Clones share the same time, so a test can keep one handle and advance it
/// while the processing loop owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Time>>,
}

impl ManualClock {
    pub fn new(start: Time) -> Self {
        Self { now: Arc::new(Mutex::new(start)) }
    }

    pub fn set(&self, time: Time) {
        *self.now.lock() = time;
    }

    pub fn advance(&self, by: Time) {
        *self.now.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Time {
        *self.now.lock()
    }

    fn precision(&self) -> Time {
        Time::zero()
    }
}

/// Turns successive timestamps into deltas
///
/// A timestamp earlier than the previous one (clock adjustment, replay seek)
/// yields a zero delta instead of a negative one, and the tracker resyncs.
#[derive(Debug, Clone, Default)]
pub struct DeltaTracker {
    last: Option<Time>,
}

impl DeltaTracker {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Record `now`; returns the time since the previous call, or `None` on
    /// the first call
    pub fn update(&mut self, now: Time) -> Option<Time> {
        let delta = self.last.map(|last| {
            if now < last {
                log::warn!("Clock went backwards by {}", last - now);
                Time::zero()
            } else {
                now - last
            }
        });
        self.last = Some(now);
        delta
    }

    /// Timestamp of the previous update
    pub fn last(&self) -> Option<Time> {
        self.last
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(Time::from_s(1.0));
        let shared = clock.clone();
        assert_eq!(clock.now(), Time::from_s(1.0));

        shared.advance(Time::from_ms(500.0));
        assert_eq!(clock.now(), Time::from_s(1.5));
    }

    #[test]
    fn delta_tracker_first_update_has_no_delta() {
        let mut tracker = DeltaTracker::new();
        assert_eq!(tracker.update(Time::from_s(2.0)), None);
        assert_eq!(tracker.update(Time::from_s(2.5)), Some(Time::from_s(0.5)));
    }

    #[test]
    fn backwards_time_yields_zero_delta() {
        let mut tracker = DeltaTracker::new();
        tracker.update(Time::from_s(10.0));
        assert_eq!(tracker.update(Time::from_s(9.0)), Some(Time::from_s(0.0)));
        assert_eq!(tracker.update(Time::from_s(9.5)), Some(Time::from_s(0.5)));
    }

    #[test]
    fn monotonic_clock_never_decreases() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
