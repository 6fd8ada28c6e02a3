//! Constants for the Cycle Engine
//!
//! Centralized defaults used throughout the engine and its modules. Each value
//! is documented with its unit and where it applies; modules take these as
//! configuration defaults, never as hard limits.
//!
//! ## Organization
//!
//! Constants are grouped by domain:
//! - **Time**: loop rates, debounce intervals, integration minimums
//! - **Navigation**: smoother time constants, accuracy factors, buffer sizes
//! - **Control**: default PID gains and flight-director output scales

/// Loop rates, debounce intervals and integration minimums.
pub mod time;

/// Navigation computer time constants, accuracy factors and buffer sizes.
pub mod navigation;

/// PID defaults and flight-director output scales.
pub mod control;

pub use control::{
    ALTITUDE_OUTPUT_SCALE, FPA_OUTPUT_SCALE, HEADING_OUTPUT_SCALE, TRACK_OUTPUT_SCALE,
    VERTICAL_SPEED_OUTPUT_SCALE,
};
pub use navigation::{
    HIGH_ACCURACY_FACTOR, MEDIUM_ACCURACY_FACTOR, POSITION_BUFFER_CAPACITY,
};
pub use time::{DEFAULT_LOOP_RATE_HZ, FLIGHT_DIRECTOR_MINIMUM_DT_S};
