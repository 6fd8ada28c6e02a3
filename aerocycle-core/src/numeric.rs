//! Small numeric helpers shared by the control and navigation code.

use serde::{Deserialize, Serialize};

/// Closed interval `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
}

impl<T: Copy + PartialOrd> Range<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// Clamps `value` into the interval; unordered values (NaN) map to `min`
    pub fn limit(&self, value: T) -> T {
        if value > self.max {
            self.max
        } else if value >= self.min {
            value
        } else {
            self.min
        }
    }

    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }
}

impl Range<f64> {
    /// `[-limit, +limit]`
    pub fn symmetric(limit: f64) -> Self {
        let limit = libm::fabs(limit);
        Self::new(-limit, limit)
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

/// Linearly maps `value` from `[a_min, a_max]` onto `[b_min, b_max]`
///
/// ```rust
/// use aerocycle_core::numeric::renormalize;
///
/// assert_eq!(renormalize(180.0, 0.0, 360.0, -1.0, 1.0), 0.0);
/// assert_eq!(renormalize(90.0, 0.0, 360.0, -1.0, 1.0), -0.5);
/// ```
pub fn renormalize(value: f64, a_min: f64, a_max: f64, b_min: f64, b_max: f64) -> f64 {
    let a_width = a_max - a_min;
    if a_width == 0.0 {
        return b_min;
    }
    b_min + (value - a_min) / a_width * (b_max - b_min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_clamps_both_ends() {
        let range = Range::symmetric(0.05);
        assert_eq!(range.limit(1.0), 0.05);
        assert_eq!(range.limit(-1.0), -0.05);
        assert_eq!(range.limit(0.01), 0.01);
    }

    #[test]
    fn limit_maps_nan_to_lower_bound() {
        let range = Range::symmetric(0.05);
        assert_eq!(range.limit(f64::NAN), -0.05);
    }

    #[test]
    fn symmetric_accepts_negative_limit() {
        assert_eq!(Range::symmetric(-3.0), Range::new(-3.0, 3.0));
    }

    #[test]
    fn renormalize_maps_endpoints() {
        assert_eq!(renormalize(0.0, 0.0, 360.0, -1.0, 1.0), -1.0);
        assert_eq!(renormalize(360.0, 0.0, 360.0, -1.0, 1.0), 1.0);
        assert_eq!(renormalize(5.0, 1.0, 1.0, 2.0, 3.0), 2.0);
    }
}
