//! Shared fixtures for the integration tests: a scripted GPS feed and
//! tolerance assertions.

#![allow(dead_code)]

use aerocycle_core::{Engine, PropertyOut};
use aerocycle_si::{Angle, Length};

/// Lateral standard deviation reported with every scripted fix
pub const FIX_STDDEV_M: f64 = 5.0;

/// Asserts `$actual` is within `$tolerance` of `$expected`
#[macro_export]
macro_rules! assert_close {
    ($actual:expr, $expected:expr, $tolerance:expr) => {{
        let (actual, expected, tolerance): (f64, f64, f64) = ($actual, $expected, $tolerance);
        assert!(
            (actual - expected).abs() <= tolerance,
            "{} = {actual}, expected {expected} ± {tolerance}",
            stringify!($actual)
        );
    }};
}

/// One scripted GPS fix
#[derive(Debug, Clone, Copy)]
pub struct Fix {
    pub time_s: f64,
    pub lon_deg: f64,
    pub lat_deg: f64,
    pub alt_m: f64,
}

/// Fixes along a constant-rate trajectory, `interval_s` apart
pub fn straight_line(
    start: Fix,
    lon_rate_deg_s: f64,
    lat_rate_deg_s: f64,
    climb_rate_m_s: f64,
    interval_s: f64,
    count: usize,
) -> Vec<Fix> {
    (0..count)
        .map(|i| {
            let t = interval_s * i as f64;
            Fix {
                time_s: start.time_s + t,
                lon_deg: start.lon_deg + lon_rate_deg_s * t,
                lat_deg: start.lat_deg + lat_rate_deg_s * t,
                alt_m: start.alt_m + climb_rate_m_s * t,
            }
        })
        .collect()
}

/// Fixes along a constant-rate turn near the equator
///
/// Each leg covers `step_deg` of arc in the direction of the current bearing;
/// the bearing changes by `turn_rate_deg_s * interval_s` per leg.
pub fn turning(
    start: Fix,
    step_deg: f64,
    initial_bearing_deg: f64,
    turn_rate_deg_s: f64,
    interval_s: f64,
    count: usize,
) -> Vec<Fix> {
    let mut fixes = Vec::with_capacity(count);
    let mut current = start;
    let mut bearing = initial_bearing_deg;
    for _ in 0..count {
        fixes.push(current);
        let radians = bearing.to_radians();
        current = Fix {
            time_s: current.time_s + interval_s,
            lon_deg: current.lon_deg + step_deg * radians.sin(),
            lat_deg: current.lat_deg + step_deg * radians.cos(),
            alt_m: current.alt_m,
        };
        bearing += turn_rate_deg_s * interval_s;
    }
    fixes
}

/// Writers for the GPS properties the navigation computer reads
pub struct GpsFeed {
    pub longitude: PropertyOut<Angle>,
    pub latitude: PropertyOut<Angle>,
    pub altitude: PropertyOut<Length>,
    pub lateral_stddev: PropertyOut<Length>,
}

impl GpsFeed {
    pub fn attach(engine: &mut Engine) -> Self {
        Self {
            longitude: engine.sensor("position/longitude").unwrap(),
            latitude: engine.sensor("position/latitude").unwrap(),
            altitude: engine.sensor("position/altitude.amsl").unwrap(),
            lateral_stddev: engine.sensor("position/lateral.standard-deviation").unwrap(),
        }
    }

    pub fn publish(&self, fix: &Fix) {
        self.longitude.write(Angle::from_deg(fix.lon_deg));
        self.latitude.write(Angle::from_deg(fix.lat_deg));
        self.altitude.write(Length::from_m(fix.alt_m));
        self.lateral_stddev.write(Length::from_m(FIX_STDDEV_M));
    }
}
