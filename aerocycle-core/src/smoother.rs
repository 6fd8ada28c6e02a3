//! Exponential Time-Domain Smoothers
//!
//! ## Overview
//!
//! Every derived value in the navigation computer is passed through a
//! first-order low-pass filter before it is published. The filter works in
//! the time domain, so its behaviour does not depend on the loop rate:
//!
//! ```text
//! output += (1 - e^(-dt/τ)) · (sample - output)
//! ```
//!
//! A constant input held for `5τ` brings the output within 1% of it.
//!
//! ## Cyclic Domains
//!
//! Headings and tracks live on a circle. Filtering 359° and 1° naively gives
//! 180°. [`RangeSmoother`] instead moves each sample to whichever copy
//! (`sample`, `sample ± width`) lies nearest the current output, filters in
//! that unwrapped space, and wraps the result back into `[lo, hi)`. The output
//! therefore always travels along the short arc.
//!
//! ```text
//!        358°  359°  0°   1°   2°
//!   ──────┼─────┼────┼────┼────┼──────
//!               out ─────► sample        short arc, never via 180°
//! ```
//!
//! Both smoothers are generic over any [`Quantity`], converting through the
//! base unit.

use aerocycle_si::{Quantity, Time};

/// First-order exponential smoother
#[derive(Debug, Clone)]
pub struct Smoother<Q> {
    time_constant: Time,
    output: Option<Q>,
}

impl<Q: Quantity> Smoother<Q> {
    pub fn new(time_constant: Time) -> Self {
        Self { time_constant, output: None }
    }

    /// Feeds one sample taken `dt` after the previous one
    ///
    /// The first sample seeds the output. `dt <= 0` leaves the state alone
    /// and returns the previous output. A non-finite sample is never stored:
    /// the previous output is returned, or the sample itself before the
    /// first finite one.
    pub fn process(&mut self, sample: Q, dt: Time) -> Q {
        if !sample.is_finite_value() {
            return self.output.unwrap_or(sample);
        }
        let output = match self.output {
            None => sample,
            Some(previous) if !(dt.s() > 0.0) => previous,
            Some(previous) => {
                let alpha = self.alpha(dt);
                Q::from_base(previous.base() + alpha * (sample.base() - previous.base()))
            }
        };
        self.output = Some(output);
        output
    }

    /// Last output, `None` before the first sample
    pub fn value(&self) -> Option<Q> {
        self.output
    }

    pub fn time_constant(&self) -> Time {
        self.time_constant
    }

    pub fn set_time_constant(&mut self, time_constant: Time) {
        self.time_constant = time_constant;
    }

    /// Forgets the history; the next sample seeds the output again
    pub fn reset(&mut self) {
        self.output = None;
    }

    fn alpha(&self, dt: Time) -> f64 {
        let tau = self.time_constant.s();
        if tau <= 0.0 {
            return 1.0;
        }
        1.0 - libm::exp(-dt.s() / tau)
    }

    fn seed(&mut self, value: Q) {
        self.output = Some(value);
    }
}

/// Exponential smoother over the cyclic domain `[lo, hi)`
#[derive(Debug, Clone)]
pub struct RangeSmoother<Q> {
    smoother: Smoother<Q>,
    lo: Q,
    hi: Q,
}

impl<Q: Quantity> RangeSmoother<Q> {
    pub fn new(lo: Q, hi: Q, time_constant: Time) -> Self {
        Self { smoother: Smoother::new(time_constant), lo, hi }
    }

    pub fn process(&mut self, sample: Q, dt: Time) -> Q {
        if !sample.is_finite_value() {
            return self.smoother.value().unwrap_or(sample);
        }
        let sample = sample.wrapped(self.lo, self.hi);
        let Some(previous) = self.smoother.value() else {
            return self.smoother.process(sample, dt);
        };

        let width = (self.hi - self.lo).base();
        let nearest = [sample.base(), sample.base() + width, sample.base() - width]
            .into_iter()
            .min_by(|a, b| {
                let da = libm::fabs(a - previous.base());
                let db = libm::fabs(b - previous.base());
                da.total_cmp(&db)
            })
            .unwrap_or(sample.base());

        let unwrapped = self.smoother.process(Q::from_base(nearest), dt);
        let wrapped = unwrapped.wrapped(self.lo, self.hi);
        self.smoother.seed(wrapped);
        wrapped
    }

    pub fn value(&self) -> Option<Q> {
        self.smoother.value()
    }

    pub fn time_constant(&self) -> Time {
        self.smoother.time_constant()
    }

    pub fn reset(&mut self) {
        self.smoother.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aerocycle_si::Angle;
    use proptest::prelude::*;

    #[test]
    fn first_sample_seeds_output() {
        let mut smoother = Smoother::new(Time::from_s(1.0));
        assert_eq!(smoother.value(), None::<f64>);
        assert_eq!(smoother.process(10.0, Time::from_ms(10.0)), 10.0);
    }

    #[test]
    fn non_positive_dt_is_a_no_op() {
        let mut smoother = Smoother::new(Time::from_s(1.0));
        smoother.process(0.0, Time::from_s(0.1));
        assert_eq!(smoother.process(100.0, Time::from_s(0.0)), 0.0);
        assert_eq!(smoother.process(100.0, Time::from_s(-1.0)), 0.0);
    }

    #[test]
    fn non_finite_samples_are_not_stored() {
        let mut smoother = Smoother::new(Time::from_s(1.0));
        assert!(smoother.process(f64::NAN, Time::from_s(0.1)).is_nan());
        assert_eq!(smoother.value(), None);

        smoother.process(4.0, Time::from_s(0.1));
        assert_eq!(smoother.process(f64::NAN, Time::from_s(0.1)), 4.0);
        assert_eq!(smoother.process(f64::INFINITY, Time::from_s(0.1)), 4.0);
        assert_eq!(smoother.process(4.0, Time::from_s(f64::NAN)), 4.0);
        assert_eq!(smoother.process(4.0, Time::from_s(0.1)), 4.0);
    }

    #[test]
    fn range_smoother_recovers_after_nan_heading() {
        let mut smoother =
            RangeSmoother::new(Angle::from_deg(0.0), Angle::from_deg(360.0), Time::from_ms(200.0));
        smoother.process(Angle::from_deg(90.0), Time::from_ms(10.0));
        let held = smoother.process(Angle::from_rad(f64::NAN), Time::from_ms(10.0));
        assert!((held.deg() - 90.0).abs() < 1e-9);

        let mut out = held;
        for _ in 0..200 {
            out = smoother.process(Angle::from_deg(90.0), Time::from_ms(10.0));
        }
        assert!((out.deg() - 90.0).abs() < 1e-9, "got {}", out.deg());
    }

    #[test]
    fn one_time_constant_covers_63_percent() {
        let mut smoother = Smoother::new(Time::from_s(2.0));
        smoother.process(0.0, Time::from_s(0.0));
        let out = smoother.process(1.0, Time::from_s(2.0));
        assert!((out - (1.0 - (-1.0f64).exp())).abs() < 1e-12);
    }

    #[test]
    fn reset_forgets_history() {
        let mut smoother = Smoother::new(Time::from_s(1.0));
        smoother.process(5.0, Time::from_s(0.1));
        smoother.reset();
        assert_eq!(smoother.process(-3.0, Time::from_s(0.1)), -3.0);
    }

    #[test]
    fn typed_quantities_smooth_in_base_units() {
        let mut smoother = Smoother::new(Time::from_ms(500.0));
        smoother.process(Angle::from_deg(0.0), Time::from_ms(10.0));
        let out = smoother.process(Angle::from_deg(10.0), Time::from_ms(10.0));
        assert!(out.deg() > 0.0 && out.deg() < 10.0);
    }

    #[test]
    fn range_smoother_crosses_north_the_short_way() {
        let mut smoother =
            RangeSmoother::new(Angle::from_deg(0.0), Angle::from_deg(360.0), Time::from_ms(200.0));
        smoother.process(Angle::from_deg(359.0), Time::from_ms(10.0));

        for sample in [1.0, 359.0, 1.0, 359.0, 1.0] {
            let out = smoother.process(Angle::from_deg(sample), Time::from_ms(10.0)).deg();
            assert!(out >= 358.0 || out <= 2.0, "went the long way: {out}");
        }
    }

    #[test]
    fn range_smoother_wraps_input() {
        let mut smoother = RangeSmoother::new(
            Angle::from_deg(-180.0),
            Angle::from_deg(180.0),
            Time::from_ms(25.0),
        );
        let out = smoother.process(Angle::from_deg(190.0), Time::from_ms(10.0));
        assert!((out.deg() + 170.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn converges_within_five_time_constants(
            tau_s in 0.01f64..10.0,
            start in -1000.0f64..1000.0,
            target in -1000.0f64..1000.0,
        ) {
            let tau = Time::from_s(tau_s);
            let mut smoother = Smoother::new(tau);
            smoother.process(start, Time::from_s(0.0));

            let steps = 100;
            let dt = tau * 5.0 / steps as f64;
            let mut out = start;
            for _ in 0..steps {
                out = smoother.process(target, dt);
            }

            let tolerance = 0.01 * (target - start).abs() + 1e-9;
            prop_assert!((out - target).abs() <= tolerance);
        }

        #[test]
        fn monotonic_toward_constant_input(
            start in -100.0f64..100.0,
            target in -100.0f64..100.0,
            dt_ms in 1.0f64..100.0,
        ) {
            let mut smoother = Smoother::new(Time::from_ms(300.0));
            smoother.process(start, Time::from_s(0.0));
            let mut previous_gap = (target - start).abs();
            for _ in 0..50 {
                let out = smoother.process(target, Time::from_ms(dt_ms));
                let gap = (target - out).abs();
                prop_assert!(gap <= previous_gap + 1e-12);
                previous_gap = gap;
            }
        }

        #[test]
        fn range_smoother_stays_on_short_arc(
            a in 0.0f64..360.0,
            offset in -10.0f64..10.0,
            dt_ms in 1.0f64..50.0,
        ) {
            let b = a + offset;
            let mut smoother = RangeSmoother::new(
                Angle::from_deg(0.0),
                Angle::from_deg(360.0),
                Time::from_ms(200.0),
            );
            smoother.process(Angle::from_deg(a), Time::from_s(0.0));

            for i in 0..20 {
                let sample = if i % 2 == 0 { b } else { a };
                let out = smoother.process(Angle::from_deg(sample), Time::from_ms(dt_ms));
                prop_assert!((0.0..360.0).contains(&out.deg()));
                // Distance on the circle from `a` never exceeds the sample spread
                let distance = out.shortest_from(Angle::from_deg(a)).deg().abs();
                prop_assert!(distance <= offset.abs() + 1e-6, "out {} drifted from {}", out.deg(), a);
            }
        }
    }
}
