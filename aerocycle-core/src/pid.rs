//! PID Controller
//!
//! ## Overview
//!
//! Error-integrating controller used by the flight director. Targets and
//! measurements are plain `f64`; callers convert typed quantities into the
//! unit the gains were tuned for (feet, fpm, degrees) before feeding them in.
//!
//! ```text
//! error      = target - measurement            (or shortest distance on [-1, 1) when winding)
//! integral   = clamp(integral + error·dt, integral_limit)
//! derivative = (error - last_error) / dt       (zero on the first call)
//! output     = clamp(P·error + I·integral + D·derivative, output_limit)
//! ```
//!
//! ## Anti-Windup
//!
//! Purely by clamping the integral after every step. There is no
//! conditional integration.
//!
//! ## Winding
//!
//! With winding enabled the controller works on the unit circle `[-1, 1)`:
//! target `0.9` and measurement `-0.9` are `0.2` apart, not `1.8`. Headings are
//! renormalized from `[0°, 360°)` onto that interval before use.

use serde::{Deserialize, Serialize};

use aerocycle_si::floored_mod;

use crate::constants::control::{DEFAULT_D, DEFAULT_I, DEFAULT_INTEGRAL_LIMIT, DEFAULT_P};
use crate::errors::{ConfigError, ConfigResult};
use crate::numeric::Range;

/// Static PID settings, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidConfig {
    pub p: f64,
    pub i: f64,
    pub d: f64,
    pub integral_limit: Range<f64>,
    pub output_limit: Option<Range<f64>>,
    pub winding: bool,
}

impl PidConfig {
    /// Same tuning, winding over `[-1, 1)`
    pub fn winding(self) -> Self {
        Self { winding: true, ..self }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if ![self.p, self.i, self.d].iter().all(|gain| gain.is_finite()) {
            return Err(ConfigError::InvalidValue { field: "pid gains", reason: "must be finite" });
        }
        if !self.integral_limit.is_valid() {
            return Err(ConfigError::InvalidValue {
                field: "integral_limit",
                reason: "min exceeds max",
            });
        }
        if self.output_limit.is_some_and(|limit| !limit.is_valid()) {
            return Err(ConfigError::InvalidValue { field: "output_limit", reason: "min exceeds max" });
        }
        Ok(())
    }
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            p: DEFAULT_P,
            i: DEFAULT_I,
            d: DEFAULT_D,
            integral_limit: Range::symmetric(DEFAULT_INTEGRAL_LIMIT),
            output_limit: None,
            winding: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pid {
    config: PidConfig,
    target: f64,
    integral: f64,
    last_error: Option<f64>,
    output: f64,
}

impl Pid {
    pub fn new(config: PidConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self { config, target: 0.0, integral: 0.0, last_error: None, output: 0.0 })
    }

    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Advances the controller by `dt` seconds and returns the new output
    ///
    /// A non-positive `dt` or a non-finite error leaves the state untouched
    /// and returns the previous output.
    pub fn process(&mut self, measurement: f64, dt: f64) -> f64 {
        // Also rejects NaN
        if !(dt > 0.0) {
            return self.output;
        }

        let error = self.error(measurement);
        if !error.is_finite() {
            return self.output;
        }
        let limit = self.config.integral_limit;
        self.integral = limit.limit(self.integral + error * dt);

        let derivative = match self.last_error {
            Some(last) => (error - last) / dt,
            None => 0.0,
        };
        self.last_error = Some(error);

        let raw = self.config.p * error + self.config.i * self.integral + self.config.d * derivative;
        self.output = match self.config.output_limit {
            Some(limit) => limit.limit(raw),
            None => raw,
        };
        self.output
    }

    pub fn output(&self) -> f64 {
        self.output
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn config(&self) -> &PidConfig {
        &self.config
    }

    /// Clears the integral, derivative history and output; keeps the target
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_error = None;
        self.output = 0.0;
    }

    fn error(&self, measurement: f64) -> f64 {
        if self.config.winding {
            // Shortest signed distance on the unit circle [-1, 1)
            floored_mod(self.target - measurement, -1.0, 1.0)
        } else {
            self.target - measurement
        }
    }
}
