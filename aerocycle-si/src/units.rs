//! Linear quantities and the cross-dimension arithmetic between them.
//!
//! Conversion factors are exact definitions and used consistently by both the
//! factory functions and the string parser:
//!
//! ```text
//! 1 ft  = 0.3048 m          1 nmi = 1852 m
//! 1 kt  = 1852/3600 m/s     1 fpm = 0.00508 m/s
//! 1 lb  = 453.592 g
//! ```

use core::f64::consts::PI;
use core::ops::{Div, Mul};
use core::time::Duration;

use crate::angle::Angle;

const FOOT: f64 = 0.3048;
const NAUTICAL_MILE: f64 = 1852.0;
const KNOT: f64 = NAUTICAL_MILE / 3600.0;
const FOOT_PER_MINUTE: f64 = FOOT / 60.0;
const KILOMETRE_PER_HOUR: f64 = 1000.0 / 3600.0;
const POUND: f64 = 453.592;
const DEG_TO_RAD: f64 = PI / 180.0;

quantity! {
    /// Length or distance (base unit: metre)
    Length, "length", base = "m",
    units { "m" => 1.0, "km" => 1000.0, "ft" => FOOT, "nmi" => NAUTICAL_MILE }
    conversions {
        from_m / m => 1.0,
        from_km / km => 1000.0,
        from_ft / ft => FOOT,
        from_nmi / nmi => NAUTICAL_MILE,
    }
}

quantity! {
    /// Linear speed (base unit: metre per second)
    Speed, "speed", base = "m/s",
    units {
        "m/s" => 1.0,
        "km/h" => KILOMETRE_PER_HOUR,
        "kt" => KNOT,
        "fpm" => FOOT_PER_MINUTE,
    }
    conversions {
        from_mps / mps => 1.0,
        from_kph / kph => KILOMETRE_PER_HOUR,
        from_kt / kt => KNOT,
        from_fpm / fpm => FOOT_PER_MINUTE,
    }
}

quantity! {
    /// Time interval or timestamp (base unit: second)
    Time, "time", base = "s",
    units { "s" => 1.0, "ms" => 0.001, "us" => 0.000_001, "min" => 60.0, "h" => 3600.0 }
    conversions {
        from_s / s => 1.0,
        from_ms / ms => 0.001,
        from_us / us => 0.000_001,
        from_min / min => 60.0,
        from_h / h => 3600.0,
    }
}

quantity! {
    /// Frequency (base unit: hertz)
    Frequency, "frequency", base = "Hz",
    units { "Hz" => 1.0, "kHz" => 1000.0 }
    conversions { from_hz / hz => 1.0, from_khz / khz => 1000.0 }
}

quantity! {
    /// Mass (base unit: gram)
    Weight, "weight", base = "g",
    units { "g" => 1.0, "kg" => 1000.0, "lb" => POUND }
    conversions { from_g / g => 1.0, from_kg / kg => 1000.0, from_lb / lb => POUND }
}

quantity! {
    /// Angular velocity (base unit: radian per second)
    AngularVelocity, "angular velocity", base = "rad/s",
    units { "rad/s" => 1.0, "deg/s" => DEG_TO_RAD }
    conversions { from_radps / radps => 1.0, from_degps / degps => DEG_TO_RAD }
}

impl Time {
    /// Converts to a `core::time::Duration`, saturating negative values to zero
    pub fn to_duration(self) -> Duration {
        if self.0 <= 0.0 || !self.0.is_finite() {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(self.0)
        }
    }
}

impl From<Duration> for Time {
    fn from(duration: Duration) -> Self {
        Self::from_s(duration.as_secs_f64())
    }
}

impl Frequency {
    /// Time between two events at this frequency
    pub fn period(self) -> Time {
        Time::from_s(1.0 / self.0)
    }

    /// Frequency whose period is `period`
    pub fn from_period(period: Time) -> Self {
        Self(1.0 / period.s())
    }
}

impl Div<Time> for Length {
    type Output = Speed;
    fn div(self, rhs: Time) -> Speed {
        Speed::from_mps(self.0 / rhs.s())
    }
}

impl Mul<Time> for Speed {
    type Output = Length;
    fn mul(self, rhs: Time) -> Length {
        Length::from_m(self.0 * rhs.s())
    }
}

impl Mul<Speed> for Time {
    type Output = Length;
    fn mul(self, rhs: Speed) -> Length {
        rhs * self
    }
}

impl Div<Time> for Angle {
    type Output = AngularVelocity;
    fn div(self, rhs: Time) -> AngularVelocity {
        AngularVelocity::from_radps(self.rad() / rhs.s())
    }
}

impl Mul<Time> for AngularVelocity {
    type Output = Angle;
    fn mul(self, rhs: Time) -> Angle {
        Angle::from_rad(self.0 * rhs.s())
    }
}
