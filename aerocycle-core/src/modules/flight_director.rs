//! Flight Director
//!
//! ## Overview
//!
//! Computes commanded pitch and roll from the selected lateral and vertical
//! modes. Five PID controllers run side by side; the active modes pick which
//! controller drives each output and how its unitless output is scaled to
//! degrees:
//!
//! | Mode              | Controller input (target, measured)  | Scale | Output |
//! |-------------------|--------------------------------------|-------|--------|
//! | Altitude hold     | altitude in ft                       | 0.10  | pitch  |
//! | Vertical speed    | vertical speed in fpm                | 0.01  | pitch  |
//! | Flight path angle | FPA in degrees                       | 1.0   | pitch  |
//! | Follow heading    | magnetic heading, renormalized ±1    | 180   | roll   |
//! | Follow track      | magnetic track, renormalized ±1      | 180   | roll   |
//!
//! Outputs are clamped to `±pitch_limit` and `±roll_limit`. A disabled mode or
//! a disabled director commands zero. A selected mode whose inputs are
//! missing writes nil, so the display removes the bar instead of showing a
//! stale command.
//!
//! ## Timing
//!
//! Cycle time is accumulated until it reaches the configured minimum (5 ms by
//! default); shorter intervals would make derivative terms noisy.

use aerocycle_si::{Angle, Length, Quantity, Speed, Time};
use serde::{Deserialize, Serialize};

use crate::actions::{PropAction, PropChanged, PropChangedTo};
use crate::config::FlightDirectorConfig;
use crate::constants::control::{
    ALTITUDE_OUTPUT_SCALE, FPA_OUTPUT_SCALE, HEADING_OUTPUT_SCALE, TRACK_OUTPUT_SCALE,
    VERTICAL_SPEED_OUTPUT_SCALE,
};
use crate::cycle::Cycle;
use crate::engine::Engine;
use crate::errors::{ConfigResult, ModuleResult};
use crate::numeric::{renormalize, Range};
use crate::pid::{Pid, PidConfig};
use crate::property::{PropertyIn, PropertyOut};
use crate::traits::Module;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LateralMode {
    #[default]
    Disabled,
    FollowHeading,
    FollowTrack,
}

impl LateralMode {
    pub fn hint(self) -> &'static str {
        match self {
            LateralMode::Disabled => "",
            LateralMode::FollowHeading => "HDG HOLD",
            LateralMode::FollowTrack => "TRK HOLD",
        }
    }

    fn law(self) -> Option<Law> {
        match self {
            LateralMode::Disabled => None,
            LateralMode::FollowHeading => Some(Law::Heading),
            LateralMode::FollowTrack => Some(Law::Track),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerticalMode {
    #[default]
    Disabled,
    AltitudeHold,
    VerticalSpeed,
    FlightPathAngle,
}

impl VerticalMode {
    pub fn hint(self) -> &'static str {
        match self {
            VerticalMode::Disabled => "",
            VerticalMode::AltitudeHold => "ALT HOLD",
            VerticalMode::VerticalSpeed => "V/SPD",
            VerticalMode::FlightPathAngle => "FPA",
        }
    }

    fn law(self) -> Option<Law> {
        match self {
            VerticalMode::Disabled => None,
            VerticalMode::AltitudeHold => Some(Law::Altitude),
            VerticalMode::VerticalSpeed => Some(Law::VerticalSpeed),
            VerticalMode::FlightPathAngle => Some(Law::Fpa),
        }
    }
}

/// Index into the control channel table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Law {
    Heading = 0,
    Track = 1,
    Altitude = 2,
    VerticalSpeed = 3,
    Fpa = 4,
}

struct Channel {
    pid: Pid,
    scale: f64,
    // Whether the PID ran with valid inputs this computation
    fresh: bool,
}

impl Channel {
    fn new(config: PidConfig, scale: f64) -> ConfigResult<Self> {
        Ok(Self { pid: Pid::new(config)?, scale, fresh: false })
    }

    /// Runs the PID if both values are present and finite
    fn update(&mut self, target: Option<f64>, measured: Option<f64>, dt: Time) {
        self.fresh = match (target, measured) {
            (Some(target), Some(measured)) if target.is_finite() && measured.is_finite() => {
                self.pid.set_target(target);
                self.pid.process(measured, dt.s());
                true
            }
            _ => false,
        };
    }

    /// Scaled and clamped command in degrees, `None` if the inputs or the
    /// limit were missing or non-finite
    fn command(&self, limit: Option<Angle>) -> Option<Angle> {
        if !self.fresh {
            return None;
        }
        let limit = limit.filter(|limit| limit.is_finite_value())?;
        let limit = Range::symmetric(limit.deg());
        Some(Angle::from_deg(limit.limit(self.scale * self.pid.output())))
    }
}

struct Inputs {
    enabled: PropertyIn<bool>,
    lateral_mode: PropertyIn<LateralMode>,
    vertical_mode: PropertyIn<VerticalMode>,
    pitch_limit: PropertyIn<Angle>,
    roll_limit: PropertyIn<Angle>,
    selected_magnetic_heading: PropertyIn<Angle>,
    selected_magnetic_track: PropertyIn<Angle>,
    selected_altitude: PropertyIn<Length>,
    selected_vertical_speed: PropertyIn<Speed>,
    selected_fpa: PropertyIn<Angle>,
    measured_magnetic_heading: PropertyIn<Angle>,
    measured_magnetic_track: PropertyIn<Angle>,
    measured_altitude: PropertyIn<Length>,
    measured_vertical_speed: PropertyIn<Speed>,
    measured_fpa: PropertyIn<Angle>,
}

struct Outputs {
    pitch: PropertyOut<Angle>,
    roll: PropertyOut<Angle>,
    vertical_mode_hint: Option<PropertyOut<String>>,
    lateral_mode_hint: Option<PropertyOut<String>>,
}

pub struct FlightDirector {
    instance: String,
    inputs: Inputs,
    outputs: Outputs,
    channels: [Channel; 5],
    dt: Time,
    minimum_dt: Time,
    lateral_mode_changed: PropChanged<LateralMode>,
    vertical_mode_changed: PropChanged<VerticalMode>,
    engaged: PropChangedTo<bool>,
}

impl FlightDirector {
    pub fn new(engine: &mut Engine, instance: &str, config: &FlightDirectorConfig) -> ConfigResult<Self> {
        config.validate()?;
        let mut io = engine.io(instance);

        let inputs = Inputs {
            enabled: io.input("enabled")?,
            lateral_mode: io.input("lateral-mode")?,
            vertical_mode: io.input("vertical-mode")?,
            pitch_limit: io.input("pitch-limit")?,
            roll_limit: io.input("roll-limit")?,
            selected_magnetic_heading: io.input("selected-magnetic-heading")?,
            selected_magnetic_track: io.input("selected-magnetic-track")?,
            selected_altitude: io.input("selected-altitude")?,
            selected_vertical_speed: io.input("selected-vertical-speed")?,
            selected_fpa: io.input("selected-fpa")?,
            measured_magnetic_heading: io.input("measured-magnetic-heading")?,
            measured_magnetic_track: io.input("measured-magnetic-track")?,
            measured_altitude: io.input("measured-altitude")?,
            measured_vertical_speed: io.input("measured-vertical-speed")?,
            measured_fpa: io.input("measured-fpa")?,
        };

        let outputs = Outputs {
            pitch: io.output("output-pitch")?,
            roll: io.output("output-roll")?,
            vertical_mode_hint: io.optional_output("vertical-mode-hint")?,
            lateral_mode_hint: io.optional_output("lateral-mode-hint")?,
        };

        // Order matches `Law`
        let channels = [
            Channel::new(config.heading, HEADING_OUTPUT_SCALE)?,
            Channel::new(config.track, TRACK_OUTPUT_SCALE)?,
            Channel::new(config.altitude, ALTITUDE_OUTPUT_SCALE)?,
            Channel::new(config.vertical_speed, VERTICAL_SPEED_OUTPUT_SCALE)?,
            Channel::new(config.fpa, FPA_OUTPUT_SCALE)?,
        ];

        Ok(Self {
            instance: instance.to_owned(),
            lateral_mode_changed: PropChanged::new(inputs.lateral_mode.clone()),
            vertical_mode_changed: PropChanged::new(inputs.vertical_mode.clone()),
            engaged: PropChangedTo::new(inputs.enabled.clone(), true),
            inputs,
            outputs,
            channels,
            dt: Time::from_s(0.0),
            minimum_dt: config.minimum_dt,
        })
    }

    fn channel(&self, law: Law) -> &Channel {
        &self.channels[law as usize]
    }

    fn detect_mode_changes(&mut self) {
        if self.engaged.check() {
            log::info!("{}: engaged", self.instance);
            for channel in &mut self.channels {
                channel.pid.reset();
            }
        }
        if self.lateral_mode_changed.check() {
            log::info!(
                "{}: lateral mode {:?}",
                self.instance,
                self.lateral_mode_changed.last_value().copied().unwrap_or_default()
            );
        }
        if self.vertical_mode_changed.check() {
            log::info!(
                "{}: vertical mode {:?}",
                self.instance,
                self.vertical_mode_changed.last_value().copied().unwrap_or_default()
            );
        }
    }

    fn run_controllers(&mut self, dt: Time) {
        let inputs = &self.inputs;
        let heading = |angle: Angle| renormalize(angle.normalized_positive().deg(), 0.0, 360.0, -1.0, 1.0);

        let [heading_channel, track_channel, altitude, vertical_speed, fpa] = &mut self.channels;
        heading_channel.update(
            inputs.selected_magnetic_heading.read().map(heading),
            inputs.measured_magnetic_heading.read().map(heading),
            dt,
        );
        track_channel.update(
            inputs.selected_magnetic_track.read().map(heading),
            inputs.measured_magnetic_track.read().map(heading),
            dt,
        );
        altitude.update(
            inputs.selected_altitude.read().map(|alt| alt.ft()),
            inputs.measured_altitude.read().map(|alt| alt.ft()),
            dt,
        );
        vertical_speed.update(
            inputs.selected_vertical_speed.read().map(|vs| vs.fpm()),
            inputs.measured_vertical_speed.read().map(|vs| vs.fpm()),
            dt,
        );
        fpa.update(
            inputs.selected_fpa.read().map(|fpa| fpa.deg()),
            inputs.measured_fpa.read().map(|fpa| fpa.deg()),
            dt,
        );
    }

    fn command(&self, law: Option<Law>, limit: Option<Angle>) -> Option<Angle> {
        match law {
            None => Some(Angle::from_deg(0.0)),
            Some(law) => self.channel(law).command(limit),
        }
    }

    fn write_hints(&self, lateral_mode: LateralMode, vertical_mode: VerticalMode) {
        if let Some(hint) = &self.outputs.lateral_mode_hint {
            hint.write(lateral_mode.hint().to_owned());
        }
        if let Some(hint) = &self.outputs.vertical_mode_hint {
            hint.write(vertical_mode.hint().to_owned());
        }
    }
}

impl Module for FlightDirector {
    fn name(&self) -> &str {
        &self.instance
    }

    fn process(&mut self, cycle: &Cycle) -> ModuleResult<()> {
        self.detect_mode_changes();

        self.dt += cycle.dt();
        if self.dt < self.minimum_dt {
            return Ok(());
        }
        let dt = self.dt;
        self.dt = Time::from_s(0.0);

        let lateral_mode = self.inputs.lateral_mode.read_or(LateralMode::Disabled);
        let vertical_mode = self.inputs.vertical_mode.read_or(VerticalMode::Disabled);

        if self.inputs.enabled.read_or(false) {
            self.run_controllers(dt);
            let pitch = self.command(vertical_mode.law(), self.inputs.pitch_limit.read());
            let roll = self.command(lateral_mode.law(), self.inputs.roll_limit.read());
            self.outputs.pitch.set(pitch);
            self.outputs.roll.set(roll);
        } else {
            self.outputs.pitch.write(Angle::from_deg(0.0));
            self.outputs.roll.write(Angle::from_deg(0.0));
        }

        self.write_hints(lateral_mode, vertical_mode);
        Ok(())
    }

    fn reset(&mut self) {
        for channel in &mut self.channels {
            channel.pid.reset();
            channel.fresh = false;
        }
        self.dt = Time::from_s(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Panel {
        engine: Engine,
        fd: FlightDirector,
        enabled: PropertyOut<bool>,
        lateral: PropertyOut<LateralMode>,
        vertical: PropertyOut<VerticalMode>,
        selected_heading: PropertyOut<Angle>,
        measured_heading: PropertyOut<Angle>,
        selected_altitude: PropertyOut<Length>,
        measured_altitude: PropertyOut<Length>,
    }

    fn panel(bind_hints: bool) -> Panel {
        let mut engine = Engine::new();
        if bind_hints {
            engine.bind("fd", "lateral-mode-hint", "fd/hint/lateral");
            engine.bind("fd", "vertical-mode-hint", "fd/hint/vertical");
        }
        let enabled = engine.sensor("enabled").unwrap();
        let lateral = engine.sensor("lateral-mode").unwrap();
        let vertical = engine.sensor("vertical-mode").unwrap();
        let pitch_limit: PropertyOut<Angle> = engine.sensor("pitch-limit").unwrap();
        let roll_limit: PropertyOut<Angle> = engine.sensor("roll-limit").unwrap();
        pitch_limit.write(Angle::from_deg(15.0));
        roll_limit.write(Angle::from_deg(25.0));
        let selected_heading = engine.sensor("selected-magnetic-heading").unwrap();
        let measured_heading = engine.sensor("measured-magnetic-heading").unwrap();
        let selected_altitude = engine.sensor("selected-altitude").unwrap();
        let measured_altitude = engine.sensor("measured-altitude").unwrap();

        let fd = FlightDirector::new(&mut engine, "fd", &FlightDirectorConfig::default()).unwrap();
        Panel {
            engine,
            fd,
            enabled,
            lateral,
            vertical,
            selected_heading,
            measured_heading,
            selected_altitude,
            measured_altitude,
        }
    }

    fn tick(fd: &mut FlightDirector, serial: u64) {
        let cycle = Cycle::new(serial, Time::from_ms(10.0 * serial as f64), Time::from_ms(10.0));
        fd.process(&cycle).unwrap();
    }

    #[test]
    fn disabled_director_commands_zero() {
        let mut p = panel(false);
        p.enabled.write(false);
        p.vertical.write(VerticalMode::AltitudeHold);
        tick(&mut p.fd, 1);

        let pitch = p.engine.reader::<Angle>("fd/output-pitch").unwrap();
        let roll = p.engine.reader::<Angle>("fd/output-roll").unwrap();
        assert_eq!(pitch.read(), Some(Angle::from_deg(0.0)));
        assert_eq!(roll.read(), Some(Angle::from_deg(0.0)));
    }

    #[test]
    fn altitude_hold_pitches_toward_selection() {
        let mut p = panel(false);
        p.enabled.write(true);
        p.vertical.write(VerticalMode::AltitudeHold);
        p.selected_altitude.write(Length::from_ft(1000.0));
        let pitch = p.engine.reader::<Angle>("fd/output-pitch").unwrap();

        p.measured_altitude.write(Length::from_ft(900.0));
        tick(&mut p.fd, 1);
        let below = pitch.read().unwrap().deg();
        assert!(below > 0.0 && below <= 15.0, "pitch {below}");

        p.measured_altitude.write(Length::from_ft(1100.0));
        tick(&mut p.fd, 2);
        let above = pitch.read().unwrap().deg();
        assert!(above < 0.0 && above >= -15.0, "pitch {above}");
    }

    #[test]
    fn heading_hold_turns_toward_selection() {
        let mut p = panel(false);
        p.enabled.write(true);
        p.lateral.write(LateralMode::FollowHeading);
        p.selected_heading.write(Angle::from_deg(10.0));
        p.measured_heading.write(Angle::from_deg(350.0));
        tick(&mut p.fd, 1);

        let roll = p.engine.reader::<Angle>("fd/output-roll").unwrap().read().unwrap();
        // 20° right across north, scaled back to degrees and below the limit
        assert!(roll.deg() > 19.0 && roll.deg() <= 25.0, "roll {}", roll.deg());
    }

    #[test]
    fn roll_is_clamped_to_limit() {
        let mut p = panel(false);
        p.enabled.write(true);
        p.lateral.write(LateralMode::FollowHeading);
        p.selected_heading.write(Angle::from_deg(270.0));
        p.measured_heading.write(Angle::from_deg(0.0));
        tick(&mut p.fd, 1);

        let roll = p.engine.reader::<Angle>("fd/output-roll").unwrap().read().unwrap();
        assert!((roll.deg() + 25.0).abs() < 1e-9, "roll {}", roll.deg());
    }

    #[test]
    fn missing_inputs_write_nil() {
        let mut p = panel(false);
        p.enabled.write(true);
        p.vertical.write(VerticalMode::AltitudeHold);
        p.selected_altitude.write(Length::from_ft(1000.0));
        tick(&mut p.fd, 1);

        let pitch = p.engine.reader::<Angle>("fd/output-pitch").unwrap();
        assert!(pitch.is_nil());
        p.measured_altitude.write(Length::from_ft(1000.0));
        tick(&mut p.fd, 2);
        assert!(pitch.valid());
    }

    #[test]
    fn non_finite_limit_or_measurement_writes_nil() {
        let mut p = panel(false);
        p.enabled.write(true);
        p.lateral.write(LateralMode::FollowHeading);
        p.selected_heading.write(Angle::from_deg(270.0));
        p.measured_heading.write(Angle::from_deg(0.0));
        let roll_limit = p.engine.reader::<Angle>("roll-limit").unwrap();
        let roll = p.engine.reader::<Angle>("fd/output-roll").unwrap();
        tick(&mut p.fd, 1);
        assert!(roll.valid());
        assert_eq!(roll_limit.read(), Some(Angle::from_deg(25.0)));

        p.measured_heading.write(Angle::from_rad(f64::NAN));
        tick(&mut p.fd, 2);
        assert!(roll.is_nil());

        p.measured_heading.write(Angle::from_deg(0.0));
        tick(&mut p.fd, 3);
        let recovered = roll.read().unwrap().deg();
        assert!((recovered + 25.0).abs() < 1e-9, "roll {recovered}");
    }

    #[test]
    fn nan_roll_limit_writes_nil() {
        let mut engine = Engine::new();
        let enabled: PropertyOut<bool> = engine.sensor("enabled").unwrap();
        let lateral: PropertyOut<LateralMode> = engine.sensor("lateral-mode").unwrap();
        let roll_limit: PropertyOut<Angle> = engine.sensor("roll-limit").unwrap();
        let selected: PropertyOut<Angle> = engine.sensor("selected-magnetic-heading").unwrap();
        let measured: PropertyOut<Angle> = engine.sensor("measured-magnetic-heading").unwrap();
        let mut fd = FlightDirector::new(&mut engine, "fd", &FlightDirectorConfig::default()).unwrap();
        let roll = engine.reader::<Angle>("fd/output-roll").unwrap();

        enabled.write(true);
        lateral.write(LateralMode::FollowHeading);
        roll_limit.write(Angle::from_rad(f64::NAN));
        selected.write(Angle::from_deg(270.0));
        measured.write(Angle::from_deg(0.0));
        tick(&mut fd, 1);

        assert!(roll.is_nil());
    }

    #[test]
    fn short_cycles_accumulate() {
        let mut p = panel(false);
        p.enabled.write(false);
        let short = |serial: u64| Cycle::new(serial, Time::from_ms(serial as f64), Time::from_ms(2.0));

        p.fd.process(&short(1)).unwrap();
        p.fd.process(&short(2)).unwrap();
        let pitch = p.engine.reader::<Angle>("fd/output-pitch").unwrap();
        assert!(!pitch.valid());

        p.fd.process(&short(3)).unwrap();
        assert!(pitch.valid());
    }

    #[test]
    fn hints_follow_modes_when_bound() {
        let mut p = panel(true);
        p.enabled.write(false);
        p.lateral.write(LateralMode::FollowTrack);
        p.vertical.write(VerticalMode::VerticalSpeed);
        tick(&mut p.fd, 1);

        let lateral = p.engine.reader::<String>("fd/hint/lateral").unwrap();
        let vertical = p.engine.reader::<String>("fd/hint/vertical").unwrap();
        assert_eq!(lateral.read().as_deref(), Some("TRK HOLD"));
        assert_eq!(vertical.read().as_deref(), Some("V/SPD"));

        p.vertical.write(VerticalMode::Disabled);
        tick(&mut p.fd, 2);
        assert_eq!(vertical.read().as_deref(), Some(""));
    }

    #[test]
    fn hints_absent_when_unbound() {
        let mut p = panel(false);
        tick(&mut p.fd, 1);
        assert!(!p.engine.registry().contains("fd/vertical-mode-hint"));
    }
}
