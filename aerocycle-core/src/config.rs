//! Configuration Documents
//!
//! ## Overview
//!
//! One JSON document configures a flight computer: the loop rate, the wiring
//! bindings and per-module tuning. Every section and field has a default, so
//! an empty object `{}` is a valid configuration.
//!
//! Physical quantities are written as strings with units and parsed by
//! `aerocycle_si`; a bad unit is reported as [`ConfigError`], never silently
//! defaulted.
//!
//! ```json
//! {
//!   "rate": "100 Hz",
//!   "bindings": {
//!     "fd": { "output-pitch": "autopilot/pitch", "vertical-mode-hint": "efis/fd/vertical-hint" }
//!   },
//!   "navigation": { "heading_smoothing": "300 ms" },
//!   "flight_director": { "altitude": { "p": 1.2 } }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use aerocycle_si::{Angle, Frequency, Time};

use crate::constants::{navigation as nav, time as timing};
use crate::errors::{ConfigError, ConfigResult};
use crate::pid::PidConfig;

/// Top-level configuration of one engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Processing loop rate
    pub rate: Frequency,
    /// instance -> IO name -> registry path
    pub bindings: BTreeMap<String, BTreeMap<String, String>>,
    pub navigation: NavigationConfig,
    pub flight_director: FlightDirectorConfig,
    pub lookahead: LookaheadConfig,
}

impl EngineConfig {
    /// Parses and validates a JSON configuration document
    pub fn from_json(text: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let hz = self.rate.hz();
        if !hz.is_finite() || hz <= 0.0 {
            return Err(ConfigError::InvalidValue { field: "rate", reason: "must be positive" });
        }
        self.navigation.validate()?;
        self.flight_director.validate()?;
        self.lookahead.validate()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rate: Frequency::from_hz(timing::DEFAULT_LOOP_RATE_HZ),
            bindings: BTreeMap::new(),
            navigation: NavigationConfig::default(),
            flight_director: FlightDirectorConfig::default(),
            lookahead: LookaheadConfig::default(),
        }
    }
}

/// Navigation computer tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigationConfig {
    pub attitude_smoothing: Time,
    pub heading_smoothing: Time,
    pub vertical_track_smoothing: Time,
    pub lateral_track_smoothing: Time,
    pub track_rotation_smoothing: Time,
    pub ground_speed_smoothing: Time,
    /// Displacement in lateral standard deviations before a fix enters the
    /// track buffer
    pub track_accuracy_factor: f64,
    /// Displacement in lateral standard deviations before a fix enters the
    /// ground speed buffer
    pub ground_speed_accuracy_factor: f64,
    pub track_minimum_dt: Time,
    pub ground_speed_minimum_dt: Time,
    /// Declination reported by the fixed magnetic model
    pub magnetic_declination: Angle,
    /// Inclination reported by the fixed magnetic model
    pub magnetic_inclination: Angle,
}

impl NavigationConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        let constants = [
            self.attitude_smoothing,
            self.heading_smoothing,
            self.vertical_track_smoothing,
            self.lateral_track_smoothing,
            self.track_rotation_smoothing,
            self.ground_speed_smoothing,
        ];
        if constants.iter().any(|tau| !(tau.s() >= 0.0)) {
            return Err(ConfigError::InvalidValue {
                field: "navigation smoothing",
                reason: "time constants must not be negative",
            });
        }
        if !(self.track_accuracy_factor > 0.0 && self.ground_speed_accuracy_factor > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "navigation accuracy factor",
                reason: "must be positive",
            });
        }
        if !(self.track_minimum_dt.s() > 0.0 && self.ground_speed_minimum_dt.s() > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "navigation minimum dt",
                reason: "must be positive",
            });
        }
        Ok(())
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            attitude_smoothing: Time::from_ms(nav::ATTITUDE_SMOOTHING_MS),
            heading_smoothing: Time::from_ms(nav::HEADING_SMOOTHING_MS),
            vertical_track_smoothing: Time::from_ms(nav::VERTICAL_TRACK_SMOOTHING_MS),
            lateral_track_smoothing: Time::from_ms(nav::LATERAL_TRACK_SMOOTHING_MS),
            track_rotation_smoothing: Time::from_ms(nav::TRACK_ROTATION_SMOOTHING_MS),
            ground_speed_smoothing: Time::from_ms(nav::GROUND_SPEED_SMOOTHING_MS),
            track_accuracy_factor: nav::MEDIUM_ACCURACY_FACTOR,
            ground_speed_accuracy_factor: nav::HIGH_ACCURACY_FACTOR,
            track_minimum_dt: Time::from_s(timing::TRACK_MINIMUM_DT_S),
            ground_speed_minimum_dt: Time::from_s(timing::GROUND_SPEED_MINIMUM_DT_S),
            magnetic_declination: Angle::from_deg(0.0),
            magnetic_inclination: Angle::from_deg(0.0),
        }
    }
}

/// Flight director tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlightDirectorConfig {
    pub heading: PidConfig,
    pub track: PidConfig,
    pub altitude: PidConfig,
    pub vertical_speed: PidConfig,
    pub fpa: PidConfig,
    /// Cycle time accumulated before the control law runs
    pub minimum_dt: Time,
}

impl FlightDirectorConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        for pid in [&self.heading, &self.track, &self.altitude, &self.vertical_speed, &self.fpa] {
            pid.validate()?;
        }
        if !(self.minimum_dt.s() >= 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "flight_director.minimum_dt",
                reason: "must not be negative",
            });
        }
        Ok(())
    }
}

impl Default for FlightDirectorConfig {
    fn default() -> Self {
        Self {
            heading: PidConfig::default().winding(),
            track: PidConfig::default().winding(),
            altitude: PidConfig::default(),
            vertical_speed: PidConfig::default(),
            fpa: PidConfig::default(),
            minimum_dt: Time::from_s(timing::FLIGHT_DIRECTOR_MINIMUM_DT_S),
        }
    }
}

/// Lookahead tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LookaheadConfig {
    /// Rate of change is measured over at least this long
    pub minimum_integration_time: Time,
    /// Time constant of the output smoother
    pub smoothing: Time,
}

impl LookaheadConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.minimum_integration_time.s() >= 0.0 && self.smoothing.s() >= 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "lookahead",
                reason: "times must not be negative",
            });
        }
        Ok(())
    }
}

impl Default for LookaheadConfig {
    fn default() -> Self {
        Self {
            minimum_integration_time: Time::from_s(0.0),
            smoothing: Time::from_s(timing::LOOKAHEAD_SMOOTHING_S),
        }
    }
}
