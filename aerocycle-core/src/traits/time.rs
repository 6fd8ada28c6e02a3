//! Clock Abstraction for the Cycle Scheduler
//!
//! The processing loop never reads the system time directly. It asks a
//! [`Clock`], which lets the same loop run against the monotonic system
//! clock in flight and against a hand-driven clock in tests and replays.
//!
//! ## Common Implementations
//!
//! - `MonotonicClock`: `std::time::Instant` based, starts at zero
//! - `ManualClock`: controllable time for deterministic tests

use aerocycle_si::Time;

/// Source of time for the cycle scheduler
///
/// ## Implementation Requirements
///
/// - `now()` must never go backwards for monotonic sources
/// - The epoch is arbitrary; only differences are meaningful
///
/// ## Example Implementation
///
/// ```rust
/// use aerocycle_core::traits::Clock;
/// use aerocycle_si::Time;
///
/// struct GpsClock {
///     seconds_of_week: f64,
/// }
///
/// impl Clock for GpsClock {
///     fn now(&self) -> Time {
///         Time::from_s(self.seconds_of_week)
///     }
///
///     fn precision(&self) -> Time {
///         Time::from_ms(100.0)
///     }
/// }
/// ```
pub trait Clock: Send {
    /// Current time since the clock's epoch
    fn now(&self) -> Time;

    /// Smallest difference this clock can resolve
    fn precision(&self) -> Time;
}
