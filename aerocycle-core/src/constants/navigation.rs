//! Navigation Computer Constants
//!
//! Smoothing time constants and accuracy gating for the navigation computer.
//! Time constants are in milliseconds.

// ===== SMOOTHING TIME CONSTANTS =====

/// Pitch and roll smoothing (milliseconds).
///
/// Short enough that the attitude indicator does not lag visibly.
pub const ATTITUDE_SMOOTHING_MS: f64 = 25.0;

/// Magnetic heading smoothing (milliseconds).
pub const HEADING_SMOOTHING_MS: f64 = 200.0;

/// Vertical track (flight path angle) smoothing (milliseconds).
pub const VERTICAL_TRACK_SMOOTHING_MS: f64 = 500.0;

/// Lateral track smoothing (milliseconds).
pub const LATERAL_TRACK_SMOOTHING_MS: f64 = 500.0;

/// Track rotation rate smoothing (milliseconds).
///
/// Rate of change amplifies position noise, hence the long constant.
pub const TRACK_ROTATION_SMOOTHING_MS: f64 = 1500.0;

/// Ground speed smoothing (milliseconds).
pub const GROUND_SPEED_SMOOTHING_MS: f64 = 2000.0;

// ===== ACCURACY GATING =====

/// Number of positions kept in each history buffer.
pub const POSITION_BUFFER_CAPACITY: usize = 3;

/// Displacement, in multiples of the lateral standard deviation, required
/// before a fix enters the track buffer.
pub const MEDIUM_ACCURACY_FACTOR: f64 = 2.0;

/// Displacement, in multiples of the lateral standard deviation, required
/// before a fix enters the ground speed buffer.
pub const HIGH_ACCURACY_FACTOR: f64 = 9.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_speed_buffer_is_stricter_than_track_buffer() {
        assert!(HIGH_ACCURACY_FACTOR > MEDIUM_ACCURACY_FACTOR);
        assert!(POSITION_BUFFER_CAPACITY >= 2);
    }
}
