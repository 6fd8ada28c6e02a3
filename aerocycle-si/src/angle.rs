//! Plane angles.
//!
//! Stored in radians. Trigonometry goes through `libm` so the crate stays
//! usable without `std`.

use core::f64::consts::PI;

use crate::quantity::Quantity;

const DEG_TO_RAD: f64 = PI / 180.0;

quantity! {
    /// Plane angle (base unit: radian)
    Angle, "angle", base = "rad",
    units { "rad" => 1.0, "deg" => DEG_TO_RAD, "°" => DEG_TO_RAD }
    conversions { from_rad / rad => 1.0, from_deg / deg => DEG_TO_RAD }
}

impl Angle {
    /// Sine of the angle
    pub fn sin(self) -> f64 {
        libm::sin(self.0)
    }

    /// Cosine of the angle
    pub fn cos(self) -> f64 {
        libm::cos(self.0)
    }

    /// Tangent of the angle
    pub fn tan(self) -> f64 {
        libm::tan(self.0)
    }

    /// Arc sine as an angle
    pub fn asin(value: f64) -> Self {
        Self(libm::asin(value))
    }

    /// Four-quadrant arc tangent of `y / x`
    pub fn atan2(y: f64, x: f64) -> Self {
        Self(libm::atan2(y, x))
    }

    /// Wraps into `[0°, 360°)`
    pub fn normalized_positive(self) -> Self {
        self.wrapped(Self::from_deg(0.0), Self::from_deg(360.0))
    }

    /// Wraps into `[-180°, 180°)`
    pub fn normalized_signed(self) -> Self {
        self.wrapped(Self::from_deg(-180.0), Self::from_deg(180.0))
    }

    /// Shortest signed rotation that takes `from` onto `self`, in `[-180°, 180°)`
    pub fn shortest_from(self, from: Self) -> Self {
        (self - from).normalized_signed()
    }
}
