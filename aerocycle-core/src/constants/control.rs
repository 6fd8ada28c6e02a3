//! Control Law Constants
//!
//! Default PID tuning and the per-mode output scales of the flight director.
//! Scales convert a unitless PID output into degrees of commanded pitch or
//! roll.

// ===== DEFAULT PID TUNING =====

/// Default proportional gain.
pub const DEFAULT_P: f64 = 1.0;

/// Default integral gain.
pub const DEFAULT_I: f64 = 0.1;

/// Default derivative gain.
pub const DEFAULT_D: f64 = 0.0;

/// Default symmetric integral limit.
pub const DEFAULT_INTEGRAL_LIMIT: f64 = 0.05;

// ===== FLIGHT DIRECTOR OUTPUT SCALES =====

/// Altitude hold: degrees of pitch per foot of error.
pub const ALTITUDE_OUTPUT_SCALE: f64 = 0.10;

/// Vertical speed: degrees of pitch per fpm of error.
pub const VERTICAL_SPEED_OUTPUT_SCALE: f64 = 0.01;

/// Flight path angle: degrees of pitch per degree of error.
pub const FPA_OUTPUT_SCALE: f64 = 1.0;

/// Heading hold: degrees of roll per unit of renormalized error.
///
/// Heading error is renormalized from `[0°, 360°)` to `[-1, 1)`, so 180
/// restores degrees.
pub const HEADING_OUTPUT_SCALE: f64 = 180.0;

/// Track hold: degrees of roll per unit of renormalized error.
pub const TRACK_OUTPUT_SCALE: f64 = 180.0;
