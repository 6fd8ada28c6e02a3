//! Time-Related Constants
//!
//! Rates and intervals for the processing loop and for modules that
//! integrate over cycle time. Values are plain `f64` in the unit named by the
//! suffix; convert with the `aerocycle_si` factories at the point of use.

// ===== LOOP RATES =====

/// Default processing loop rate (hertz).
///
/// 100 Hz keeps attitude smoothing (25 ms time constant) well sampled while
/// leaving headroom for the slower navigation computations.
pub const DEFAULT_LOOP_RATE_HZ: f64 = 100.0;

/// Tick duration relative to the nominal period above which a tick is counted
/// as an overrun.
pub const OVERRUN_FACTOR: f64 = 1.0;

// ===== INTEGRATION MINIMUMS =====

/// Minimum accumulated time before the flight director recomputes (seconds).
///
/// Shorter intervals make the PID derivative terms noisy; cycle time is
/// accumulated until it is reached.
pub const FLIGHT_DIRECTOR_MINIMUM_DT_S: f64 = 0.005;

/// Minimum time between two position samples used for track computation
/// (seconds).
pub const TRACK_MINIMUM_DT_S: f64 = 0.001;

/// Minimum time between the oldest and newest samples used for ground speed
/// (seconds).
pub const GROUND_SPEED_MINIMUM_DT_S: f64 = 0.01;

/// Default lookahead smoother time constant (seconds).
pub const LOOKAHEAD_SMOOTHING_S: f64 = 0.1;
