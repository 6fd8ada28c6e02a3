//! Navigation Computer
//!
//! ## Overview
//!
//! Fuses raw position and attitude into the values instruments display:
//! smoothed attitude and heading, true heading, lateral and vertical track,
//! track rotation rate, ground speed and magnetic variation.
//!
//! ## Computation Graph
//!
//! Each computation is gated by its own observer and runs only when its
//! inputs changed. Observers on observers order the work within a cycle:
//!
//! ```text
//!  position inputs ──► [position] ──┬──► [magnetic variation] ──┐
//!                                   ├──► [track]                 │
//!                                   └──► [ground speed]          ▼
//!  attitude inputs ─────────────────────────────────────► [orientation]
//! ```
//!
//! ## Accuracy-Gated History
//!
//! Track and ground speed are differences between positions, so GPS noise
//! dominates them when the aircraft moved less than the fix uncertainty.
//! Three position histories are kept:
//!
//! | Buffer        | Admits a fix when                         | Used for     |
//! |---------------|-------------------------------------------|--------------|
//! | primary       | always                                    | latest fix   |
//! | 2x-accurate   | moved > 2 × lateral σ since last admitted | track        |
//! | 9x-accurate   | moved > 9 × lateral σ since last admitted | ground speed |
//!
//! Degenerate intervals (too little time, zero distance) skip the write;
//! non-finite values are never published.

use aerocycle_si::{Angle, AngularVelocity, Length, LonLat, Quantity, Speed, Time};

use crate::buffer::AdmissionBuffer;
use crate::config::NavigationConfig;
use crate::constants::navigation::POSITION_BUFFER_CAPACITY;
use crate::cycle::Cycle;
use crate::engine::Engine;
use crate::errors::{ConfigResult, ModuleResult};
use crate::observer::PropertyObserver;
use crate::property::{PropertyIn, PropertyOut};
use crate::smoother::{RangeSmoother, Smoother};
use crate::traits::Module;

/// Magnetic field direction at a point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagneticVariation {
    /// Angle from true north to magnetic north, positive east
    pub declination: Angle,
    /// Dip of the field below the horizontal
    pub inclination: Angle,
}

/// Source of magnetic variation, usually a world magnetic model
pub trait MagneticModel: Send {
    fn variation(&self, position: LonLat, altitude: Length, time: Time) -> MagneticVariation;
}

/// Same variation everywhere; for bench rigs, simulators and tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedMagneticModel {
    variation: MagneticVariation,
}

impl FixedMagneticModel {
    pub fn new(declination: Angle, inclination: Angle) -> Self {
        Self { variation: MagneticVariation { declination, inclination } }
    }
}

impl MagneticModel for FixedMagneticModel {
    fn variation(&self, _position: LonLat, _altitude: Length, _time: Time) -> MagneticVariation {
        self.variation
    }
}

/// One position fix as stored in the histories
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub lateral_position: LonLat,
    pub lateral_stddev: Length,
    pub altitude: Length,
    pub altitude_stddev: Length,
    pub time: Time,
    pub valid: bool,
}

type PositionBuffer = AdmissionBuffer<Position, POSITION_BUFFER_CAPACITY>;

/// Buffer admitting a fix only after it moved `factor` lateral standard
/// deviations away from the last admitted one
fn accuracy_gated(factor: f64) -> PositionBuffer {
    AdmissionBuffer::new(move |last: &Position, next: &Position| {
        let moved = last.lateral_position.distance_to(&next.lateral_position);
        moved > next.lateral_stddev * factor
    })
}

/// Current value of `input`, with non-finite values treated as missing
fn finite<Q: Quantity + Send + Sync + 'static>(input: &PropertyIn<Q>) -> Option<Q> {
    input.read().filter(|value| value.is_finite_value())
}

struct Inputs {
    longitude: PropertyIn<Angle>,
    latitude: PropertyIn<Angle>,
    altitude_amsl: PropertyIn<Length>,
    lateral_stddev: PropertyIn<Length>,
    vertical_stddev: PropertyIn<Length>,
    source: PropertyIn<String>,
    pitch: PropertyIn<Angle>,
    roll: PropertyIn<Angle>,
    heading_magnetic: PropertyIn<Angle>,
}

struct Outputs {
    longitude: PropertyOut<Angle>,
    latitude: PropertyOut<Angle>,
    altitude_amsl: PropertyOut<Length>,
    lateral_stddev: PropertyOut<Length>,
    vertical_stddev: PropertyOut<Length>,
    stddev: PropertyOut<Length>,
    source: PropertyOut<String>,
    pitch: PropertyOut<Angle>,
    roll: PropertyOut<Angle>,
    heading_magnetic: PropertyOut<Angle>,
    heading_true: PropertyOut<Angle>,
    track_vertical: PropertyOut<Angle>,
    track_lateral_true: PropertyOut<Angle>,
    track_lateral_magnetic: PropertyOut<Angle>,
    track_rotation: PropertyOut<AngularVelocity>,
    ground_speed: PropertyOut<Speed>,
    magnetic_declination: PropertyOut<Angle>,
    magnetic_inclination: PropertyOut<Angle>,
}

struct Smoothers {
    pitch: RangeSmoother<Angle>,
    roll: RangeSmoother<Angle>,
    heading_magnetic: RangeSmoother<Angle>,
    track_vertical: Smoother<Angle>,
    track_lateral_true: RangeSmoother<Angle>,
    track_rotation: Smoother<AngularVelocity>,
    ground_speed: Smoother<Speed>,
}

impl Smoothers {
    fn new(config: &NavigationConfig) -> Self {
        let half_turn = Angle::from_deg(180.0);
        let full_turn = Angle::from_deg(360.0);
        let zero = Angle::from_deg(0.0);
        Self {
            pitch: RangeSmoother::new(-half_turn, half_turn, config.attitude_smoothing),
            roll: RangeSmoother::new(-half_turn, half_turn, config.attitude_smoothing),
            heading_magnetic: RangeSmoother::new(zero, full_turn, config.heading_smoothing),
            track_vertical: Smoother::new(config.vertical_track_smoothing),
            track_lateral_true: RangeSmoother::new(zero, full_turn, config.lateral_track_smoothing),
            track_rotation: Smoother::new(config.track_rotation_smoothing),
            ground_speed: Smoother::new(config.ground_speed_smoothing),
        }
    }
}

struct Observers {
    position: PropertyObserver,
    magnetic_variation: PropertyObserver,
    orientation: PropertyObserver,
    track: PropertyObserver,
    ground_speed: PropertyObserver,
}

/// Last track sample, for rotation rate and smoothing intervals
#[derive(Debug, Clone, Copy)]
struct TrackSample {
    time: Time,
    lateral_true: Angle,
}

pub struct NavigationComputer {
    instance: String,
    inputs: Inputs,
    outputs: Outputs,
    smoothers: Smoothers,
    observers: Observers,
    positions: PositionBuffer,
    positions_accurate_2_times: PositionBuffer,
    positions_accurate_9_times: PositionBuffer,
    magnetic_model: Box<dyn MagneticModel>,
    last_track: Option<TrackSample>,
    last_ground_speed_time: Option<Time>,
    track_minimum_dt: Time,
    ground_speed_minimum_dt: Time,
}

impl NavigationComputer {
    /// Declares the module's IO on `engine` under `instance`
    ///
    /// Magnetic variation comes from a [`FixedMagneticModel`] built from the
    /// configuration until [`with_magnetic_model`](Self::with_magnetic_model)
    /// replaces it.
    pub fn new(engine: &mut Engine, instance: &str, config: &NavigationConfig) -> ConfigResult<Self> {
        config.validate()?;
        let mut io = engine.io(instance);

        let inputs = Inputs {
            longitude: io.input("position/longitude")?,
            latitude: io.input("position/latitude")?,
            altitude_amsl: io.input("position/altitude.amsl")?,
            lateral_stddev: io.input("position/lateral.standard-deviation")?,
            vertical_stddev: io.input("position/vertical.standard-deviation")?,
            source: io.input("position/source")?,
            pitch: io.input("orientation/pitch")?,
            roll: io.input("orientation/roll")?,
            heading_magnetic: io.input("orientation/heading.magnetic")?,
        };

        let outputs = Outputs {
            longitude: io.output("position/longitude")?,
            latitude: io.output("position/latitude")?,
            altitude_amsl: io.output("position/altitude.amsl")?,
            lateral_stddev: io.output("position/lateral.standard-deviation")?,
            vertical_stddev: io.output("position/vertical.standard-deviation")?,
            stddev: io.output("position/standard-deviation")?,
            source: io.output("position/source")?,
            pitch: io.output("orientation/pitch")?,
            roll: io.output("orientation/roll")?,
            heading_magnetic: io.output("orientation/heading.magnetic")?,
            heading_true: io.output("orientation/heading.true")?,
            track_vertical: io.output("track/vertical")?,
            track_lateral_true: io.output("track/lateral.true")?,
            track_lateral_magnetic: io.output("track/lateral.magnetic")?,
            track_rotation: io.output("track/rotation")?,
            ground_speed: io.output("track/ground-speed")?,
            magnetic_declination: io.output("magnetic-declination")?,
            magnetic_inclination: io.output("magnetic-inclination")?,
        };

        let position = PropertyObserver::new()
            .watching(&inputs.longitude)
            .watching(&inputs.latitude)
            .watching(&inputs.altitude_amsl)
            .watching(&inputs.lateral_stddev)
            .watching(&inputs.vertical_stddev)
            .watching(&inputs.source);
        let magnetic_variation = PropertyObserver::new().watching(&position);
        let orientation = PropertyObserver::new()
            .watching(&inputs.pitch)
            .watching(&inputs.roll)
            .watching(&inputs.heading_magnetic)
            .watching(&outputs.magnetic_declination);
        let track = PropertyObserver::new().watching(&position);
        let ground_speed = PropertyObserver::new().watching(&position);

        Ok(Self {
            instance: instance.to_owned(),
            inputs,
            outputs,
            smoothers: Smoothers::new(config),
            observers: Observers { position, magnetic_variation, orientation, track, ground_speed },
            positions: AdmissionBuffer::admit_all(),
            positions_accurate_2_times: accuracy_gated(config.track_accuracy_factor),
            positions_accurate_9_times: accuracy_gated(config.ground_speed_accuracy_factor),
            magnetic_model: Box::new(FixedMagneticModel::new(
                config.magnetic_declination,
                config.magnetic_inclination,
            )),
            last_track: None,
            last_ground_speed_time: None,
            track_minimum_dt: config.track_minimum_dt,
            ground_speed_minimum_dt: config.ground_speed_minimum_dt,
        })
    }

    pub fn with_magnetic_model(mut self, model: impl MagneticModel + 'static) -> Self {
        self.magnetic_model = Box::new(model);
        self
    }

    fn compute_position(&mut self, now: Time) {
        let inputs = &self.inputs;
        let outputs = &self.outputs;

        outputs.longitude.set(finite(&inputs.longitude));
        outputs.latitude.set(finite(&inputs.latitude));
        outputs.altitude_amsl.set(finite(&inputs.altitude_amsl));
        outputs.lateral_stddev.set(finite(&inputs.lateral_stddev));
        outputs.vertical_stddev.set(finite(&inputs.vertical_stddev));
        outputs.source.set(inputs.source.read());

        let stddev = match (finite(&inputs.lateral_stddev), finite(&inputs.vertical_stddev)) {
            (Some(lateral), Some(vertical)) => Some(if lateral > vertical { lateral } else { vertical }),
            (lateral, vertical) => lateral.or(vertical),
        };
        outputs.stddev.set(stddev);

        let fix = (
            finite(&inputs.longitude),
            finite(&inputs.latitude),
            finite(&inputs.altitude_amsl),
            finite(&inputs.lateral_stddev),
        );
        let position = match fix {
            (Some(lon), Some(lat), Some(altitude), Some(lateral_stddev)) => Position {
                lateral_position: LonLat::new(lon, lat),
                lateral_stddev,
                altitude,
                altitude_stddev: finite(&inputs.vertical_stddev).unwrap_or(Length::zero()),
                time: now,
                valid: true,
            },
            _ => Position {
                lateral_position: LonLat::default(),
                lateral_stddev: Length::zero(),
                altitude: Length::zero(),
                altitude_stddev: Length::zero(),
                time: now,
                valid: false,
            },
        };

        self.positions.offer(position);
        if position.valid {
            self.positions_accurate_2_times.offer(position);
            self.positions_accurate_9_times.offer(position);
        }
    }

    fn latest_valid_position(&self) -> Option<Position> {
        self.positions.entries().last().copied().filter(|position| position.valid)
    }

    fn compute_magnetic_variation(&mut self) {
        match self.latest_valid_position() {
            Some(position) => {
                let variation =
                    self.magnetic_model.variation(position.lateral_position, position.altitude, position.time);
                let declination = Some(variation.declination).filter(|d| d.is_finite_value());
                let inclination = Some(variation.inclination).filter(|i| i.is_finite_value());
                self.outputs.magnetic_declination.set(declination);
                self.outputs.magnetic_inclination.set(inclination);
            }
            None => {
                self.outputs.magnetic_declination.write_nil();
                self.outputs.magnetic_inclination.write_nil();
            }
        }
    }

    fn compute_orientation(&mut self) {
        let dt = self.observers.orientation.update_dt();

        let smoothers = &mut self.smoothers;

        let pitch = finite(&self.inputs.pitch).map(|pitch| smoothers.pitch.process(pitch, dt));
        self.outputs.pitch.set(pitch);

        let roll = finite(&self.inputs.roll).map(|roll| smoothers.roll.process(roll, dt));
        self.outputs.roll.set(roll);

        let magnetic =
            finite(&self.inputs.heading_magnetic).map(|heading| smoothers.heading_magnetic.process(heading, dt));
        self.outputs.heading_magnetic.set(magnetic);

        let heading_true = magnetic
            .zip(self.outputs.magnetic_declination.read())
            .map(|(magnetic, declination)| (magnetic + declination).normalized_positive());
        self.outputs.heading_true.set(heading_true);
    }

    fn compute_track(&mut self) {
        let history = self.positions_accurate_2_times.entries();
        let (Some(&newer), Some(&older)) = (history.nth_newest(0), history.nth_newest(1)) else {
            return;
        };
        if self.last_track.is_some_and(|last| last.time == newer.time) {
            return;
        }

        let dt = newer.time - older.time;
        if dt < self.track_minimum_dt {
            log::warn!("{}: track interval {dt} below minimum, skipped", self.instance);
            return;
        }
        let distance = older.lateral_position.distance_to(&newer.lateral_position);
        if !(distance.m() > 0.0) {
            return;
        }

        let lateral_true = older.lateral_position.initial_bearing_to(&newer.lateral_position);
        let vertical = Angle::atan2((newer.altitude - older.altitude).m(), distance.m());
        if !lateral_true.is_finite_value() || !vertical.is_finite_value() {
            return;
        }

        let smoothing_dt = self.last_track.map_or(dt, |last| newer.time - last.time);
        let vertical = self.smoothers.track_vertical.process(vertical, smoothing_dt);
        let smoothed_true = self.smoothers.track_lateral_true.process(lateral_true, smoothing_dt);
        self.outputs.track_vertical.write(vertical);
        self.outputs.track_lateral_true.write(smoothed_true);

        let magnetic = self
            .outputs
            .magnetic_declination
            .read()
            .map(|declination| (smoothed_true - declination).normalized_positive());
        self.outputs.track_lateral_magnetic.set(magnetic);

        if let Some(last) = self.last_track {
            let rotation = lateral_true.shortest_from(last.lateral_true) / smoothing_dt;
            if rotation.is_finite_value() {
                let rotation = self.smoothers.track_rotation.process(rotation, smoothing_dt);
                self.outputs.track_rotation.write(rotation);
            }
        }

        self.last_track = Some(TrackSample { time: newer.time, lateral_true });
    }

    fn compute_ground_speed(&mut self) {
        let history = self.positions_accurate_9_times.entries();
        if !history.is_full() {
            return;
        }
        let (Some(&oldest), Some(&newest)) = (history.first(), history.last()) else {
            return;
        };
        if self.last_ground_speed_time == Some(newest.time) {
            return;
        }

        let dt = newest.time - oldest.time;
        if dt < self.ground_speed_minimum_dt {
            log::warn!("{}: ground speed interval {dt} below minimum, skipped", self.instance);
            return;
        }

        let speed = oldest.lateral_position.distance_to(&newest.lateral_position) / dt;
        if !speed.is_finite_value() {
            return;
        }

        let smoothing_dt = self.last_ground_speed_time.map_or(dt, |last| newest.time - last);
        let speed = self.smoothers.ground_speed.process(speed, smoothing_dt);
        self.outputs.ground_speed.write(speed);
        self.last_ground_speed_time = Some(newest.time);
    }
}

impl Module for NavigationComputer {
    fn name(&self) -> &str {
        &self.instance
    }

    fn process(&mut self, cycle: &Cycle) -> ModuleResult<()> {
        let now = cycle.timestamp();

        if self.observers.position.observe(now) {
            self.compute_position(now);
        }
        if self.observers.magnetic_variation.observe(now) {
            self.compute_magnetic_variation();
        }
        if self.observers.orientation.observe(now) {
            self.compute_orientation();
        }
        if self.observers.track.observe(now) {
            self.compute_track();
        }
        if self.observers.ground_speed.observe(now) {
            self.compute_ground_speed();
        }
        Ok(())
    }

    fn reset(&mut self) {
        let smoothers = &mut self.smoothers;
        smoothers.pitch.reset();
        smoothers.roll.reset();
        smoothers.heading_magnetic.reset();
        smoothers.track_vertical.reset();
        smoothers.track_lateral_true.reset();
        smoothers.track_rotation.reset();
        smoothers.ground_speed.reset();

        self.positions.clear();
        self.positions_accurate_2_times.clear();
        self.positions_accurate_9_times.clear();
        self.last_track = None;
        self.last_ground_speed_time = None;
    }
}
