//! Lookahead
//!
//! Predicts a value a short time ahead by linear extrapolation of its rate of
//! change. Used to lead trend vectors such as the speed trend arrow.
//!
//! ```text
//! rate   = (input - previous input) / dt       dt >= minimum integration time
//! output = smooth(input + rate * lookahead-time)
//! ```
//!
//! Missing or non-finite input or lookahead time writes nil and drops the rate
//! history, so the first sample after a gap never produces a spurious rate.
//! A prediction that overflows also writes nil and reports
//! [`ModuleError::NonFinite`].

use aerocycle_si::{Quantity, Time};

use crate::config::LookaheadConfig;
use crate::cycle::Cycle;
use crate::engine::Engine;
use crate::errors::{ConfigResult, ModuleError, ModuleResult};
use crate::property::{PropertyIn, PropertyOut};
use crate::smoother::Smoother;
use crate::traits::Module;

pub struct Lookahead {
    instance: String,
    input: PropertyIn<f64>,
    lookahead_time: PropertyIn<Time>,
    output: PropertyOut<f64>,
    smoother: Smoother<f64>,
    minimum_integration_time: Time,
    dt: Time,
    last_value: Option<f64>,
}

impl Lookahead {
    pub fn new(engine: &mut Engine, instance: &str, config: &LookaheadConfig) -> ConfigResult<Self> {
        config.validate()?;
        let mut io = engine.io(instance);
        Ok(Self {
            instance: instance.to_owned(),
            input: io.input("input")?,
            lookahead_time: io.input("lookahead-time")?,
            output: io.output("output")?,
            smoother: Smoother::new(config.smoothing),
            minimum_integration_time: config.minimum_integration_time,
            dt: Time::from_s(0.0),
            last_value: None,
        })
    }
}

impl Module for Lookahead {
    fn name(&self) -> &str {
        &self.instance
    }

    fn process(&mut self, cycle: &Cycle) -> ModuleResult<()> {
        let input = self.input.read().filter(|value| value.is_finite());
        let lookahead_time = self.lookahead_time.read().filter(|time| time.is_finite_value());
        let (Some(input), Some(lookahead_time)) = (input, lookahead_time) else {
            self.output.write_nil();
            self.last_value = None;
            self.dt = Time::from_s(0.0);
            return Ok(());
        };

        let Some(last_value) = self.last_value else {
            self.last_value = Some(input);
            self.dt = Time::from_s(0.0);
            return Ok(());
        };

        self.dt += cycle.dt();
        if self.dt < self.minimum_integration_time || self.dt.s() <= 0.0 {
            return Ok(());
        }

        let rate = (input - last_value) / self.dt.s();
        let predicted = input + rate * lookahead_time.s();
        if !predicted.is_finite() {
            self.output.write_nil();
            self.last_value = Some(input);
            self.dt = Time::from_s(0.0);
            return Err(ModuleError::NonFinite { what: "lookahead prediction" });
        }
        let output = self.smoother.process(predicted, self.dt);
        self.output.write(output);

        self.last_value = Some(input);
        self.dt = Time::from_s(0.0);
        Ok(())
    }

    fn reset(&mut self) {
        self.smoother.reset();
        self.last_value = None;
        self.dt = Time::from_s(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Rig {
        engine: Engine,
        lookahead: Lookahead,
        input: PropertyOut<f64>,
        time: PropertyOut<Time>,
    }

    fn rig(config: LookaheadConfig) -> Rig {
        let mut engine = Engine::new();
        engine.bind("speed-trend", "input", "ias");
        engine.bind("speed-trend", "lookahead-time", "settings/trend-time");
        let input = engine.sensor("ias").unwrap();
        let time = engine.sensor("settings/trend-time").unwrap();
        let lookahead = Lookahead::new(&mut engine, "speed-trend", &config).unwrap();
        Rig { engine, lookahead, input, time }
    }

    fn cycle(serial: u64) -> Cycle {
        Cycle::new(serial, Time::from_ms(100.0 * serial as f64), Time::from_ms(100.0))
    }

    #[test]
    fn constant_ramp_is_extrapolated() {
        let config = LookaheadConfig { minimum_integration_time: Time::from_s(0.0), smoothing: Time::from_s(0.0) };
        let mut rig = rig(config);
        rig.time.write(Time::from_s(10.0));

        // 1 unit per 100 ms = 10 units/s
        for serial in 1..=5 {
            rig.input.write(serial as f64);
            rig.lookahead.process(&cycle(serial)).unwrap();
        }

        let output = rig.engine.reader::<f64>("speed-trend/output").unwrap().read().unwrap();
        assert!((output - 105.0).abs() < 1e-9, "output {output}");
    }

    #[test]
    fn waits_for_integration_time() {
        let config = LookaheadConfig { minimum_integration_time: Time::from_ms(250.0), smoothing: Time::from_s(0.0) };
        let mut rig = rig(config);
        rig.time.write(Time::from_s(1.0));
        let output = rig.engine.reader::<f64>("speed-trend/output").unwrap();

        for serial in 1..=3 {
            rig.input.write(serial as f64);
            rig.lookahead.process(&cycle(serial)).unwrap();
        }
        assert!(!output.valid());

        rig.input.write(4.0);
        rig.lookahead.process(&cycle(4)).unwrap();
        // 3 units over 300 ms, projected 1 s ahead
        assert!((output.read().unwrap() - 14.0).abs() < 1e-9);
    }

    #[test]
    fn missing_input_writes_nil() {
        let mut rig = rig(LookaheadConfig::default());
        rig.input.write(1.0);
        rig.lookahead.process(&cycle(1)).unwrap();

        let output = rig.engine.reader::<f64>("speed-trend/output").unwrap();
        assert!(output.is_nil());
    }

    #[test]
    fn nan_input_writes_nil_and_recovers() {
        let config = LookaheadConfig { minimum_integration_time: Time::from_s(0.0), smoothing: Time::from_s(0.0) };
        let mut rig = rig(config);
        rig.time.write(Time::from_s(1.0));
        let output = rig.engine.reader::<f64>("speed-trend/output").unwrap();

        rig.input.write(1.0);
        rig.lookahead.process(&cycle(1)).unwrap();
        rig.input.write(2.0);
        rig.lookahead.process(&cycle(2)).unwrap();
        assert!(output.valid());

        rig.input.write(f64::NAN);
        rig.lookahead.process(&cycle(3)).unwrap();
        assert!(output.is_nil());

        // History restarts after the gap
        rig.input.write(3.0);
        rig.lookahead.process(&cycle(4)).unwrap();
        assert!(output.is_nil());
        rig.input.write(4.0);
        rig.lookahead.process(&cycle(5)).unwrap();
        assert!((output.read().unwrap() - 14.0).abs() < 1e-9);
    }

    #[test]
    fn overflowing_prediction_writes_nil() {
        let config = LookaheadConfig { minimum_integration_time: Time::from_s(0.0), smoothing: Time::from_s(0.0) };
        let mut rig = rig(config);
        rig.time.write(Time::from_s(1.0));
        let output = rig.engine.reader::<f64>("speed-trend/output").unwrap();

        rig.input.write(0.0);
        rig.lookahead.process(&cycle(1)).unwrap();
        rig.input.write(1.0);
        rig.lookahead.process(&cycle(2)).unwrap();
        assert!(output.valid());

        rig.input.write(f64::MAX);
        let err = rig.lookahead.process(&cycle(3)).unwrap_err();
        assert_eq!(err, ModuleError::NonFinite { what: "lookahead prediction" });
        assert!(output.is_nil());
    }
}
