//! Geographic positions on a spherical Earth.
//!
//! Navigation computations need three things from a pair of positions: the
//! great-circle distance, the initial bearing, and nothing more exotic. Both
//! use the haversine formulation, which stays well-conditioned for the short
//! baselines between consecutive GPS fixes.

use crate::angle::Angle;
use crate::units::Length;

/// Mean Earth radius used for all great-circle computations
pub const EARTH_MEAN_RADIUS: Length = Length::from_km(6367.46);

/// Longitude/latitude pair
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LonLat {
    /// Longitude, positive east
    pub lon: Angle,
    /// Latitude, positive north
    pub lat: Angle,
}

impl LonLat {
    /// Creates a position from longitude and latitude
    pub const fn new(lon: Angle, lat: Angle) -> Self {
        Self { lon, lat }
    }

    /// Central angle between two positions (haversine)
    pub fn central_angle_to(&self, other: &LonLat) -> Angle {
        let dlat = other.lat.rad() - self.lat.rad();
        let dlon = other.lon.rad() - self.lon.rad();
        let sin_dlat = libm::sin(dlat / 2.0);
        let sin_dlon = libm::sin(dlon / 2.0);
        let a = sin_dlat * sin_dlat + self.lat.cos() * other.lat.cos() * sin_dlon * sin_dlon;
        let a = a.clamp(0.0, 1.0);
        Angle::from_rad(2.0 * libm::atan2(libm::sqrt(a), libm::sqrt(1.0 - a)))
    }

    /// Great-circle distance to `other`
    pub fn distance_to(&self, other: &LonLat) -> Length {
        EARTH_MEAN_RADIUS * self.central_angle_to(other).rad()
    }

    /// Initial true bearing from `self` towards `other`, in `[0°, 360°)`
    pub fn initial_bearing_to(&self, other: &LonLat) -> Angle {
        let dlon = other.lon.rad() - self.lon.rad();
        let y = libm::sin(dlon) * other.lat.cos();
        let x = self.lat.cos() * other.lat.sin()
            - self.lat.sin() * other.lat.cos() * libm::cos(dlon);
        Angle::atan2(y, x).normalized_positive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(lon_deg: f64, lat_deg: f64) -> LonLat {
        LonLat::new(Angle::from_deg(lon_deg), Angle::from_deg(lat_deg))
    }

    #[test]
    fn one_degree_of_equator() {
        let distance = at(0.0, 0.0).distance_to(&at(1.0, 0.0));
        let expected = EARTH_MEAN_RADIUS.m() * core::f64::consts::PI / 180.0;
        assert!((distance.m() - expected).abs() < 1e-6);
    }

    #[test]
    fn cardinal_bearings() {
        let origin = at(10.0, 0.0);
        assert!((origin.initial_bearing_to(&at(11.0, 0.0)).deg() - 90.0).abs() < 1e-9);
        assert!((origin.initial_bearing_to(&at(9.0, 0.0)).deg() - 270.0).abs() < 1e-9);
        assert!(origin.initial_bearing_to(&at(10.0, 1.0)).deg().abs() < 1e-9);
        assert!((origin.initial_bearing_to(&at(10.0, -1.0)).deg() - 180.0).abs() < 1e-9);
    }

    #[test]
    fn coincident_points() {
        let p = at(21.0, 52.0);
        assert_eq!(p.distance_to(&p).m(), 0.0);
    }
}
