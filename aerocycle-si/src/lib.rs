//! Typed Physical Quantities for Flight Computations
//!
//! ## Overview
//!
//! Every signal that flows through the flight computer carries a physical
//! dimension: an angle, an altitude, an airspeed, a time step. Mixing them up
//! (feet for metres, degrees for radians) is the classic avionics bug, so this
//! crate wraps each dimension in its own newtype over an `f64` stored in the
//! base unit of that dimension.
//!
//! | Type | Base unit | Other units |
//! |------|-----------|-------------|
//! | [`Angle`] | rad | deg |
//! | [`Length`] | m | km, ft, nmi |
//! | [`Speed`] | m/s | km/h, kt, fpm |
//! | [`Time`] | s | ms, us, min, h |
//! | [`Frequency`] | Hz | kHz |
//! | [`Weight`] | g | kg, lb |
//! | [`AngularVelocity`] | rad/s | deg/s |
//!
//! ## Construction
//!
//! Values are created through explicit factory functions, never from bare
//! numbers:
//!
//! ```rust
//! use aerocycle_si::{Angle, Frequency, Length, Time};
//!
//! let heading = Angle::from_deg(270.0);
//! let rate = Frequency::from_hz(100.0);
//! let altitude = Length::from_ft(1000.0);
//!
//! assert_eq!(rate.period(), Time::from_ms(10.0));
//! assert!((altitude.m() - 304.8).abs() < 1e-9);
//! assert!((heading.rad() - 3.0 * core::f64::consts::FRAC_PI_2).abs() < 1e-12);
//! ```
//!
//! ## Parsing
//!
//! Configuration files carry quantities as strings with a unit suffix. Every
//! quantity implements `FromStr` and, with the `serde` feature, deserializes
//! from such strings:
//!
//! ```rust
//! use aerocycle_si::{Time, Weight};
//!
//! let tau: Time = "200 ms".parse().unwrap();
//! assert_eq!(tau, Time::from_ms(200.0));
//!
//! let mass: Weight = "1 lb".parse().unwrap();
//! assert!((mass.g() - 453.592).abs() < 1e-9);
//! ```
//!
//! ## Generic Code
//!
//! Filters and controllers are written once against the [`Quantity`] trait,
//! which exposes the base-unit value. `f64` implements it as a dimensionless
//! quantity.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod quantity;

pub mod angle;
pub mod lonlat;
pub mod units;

pub use angle::Angle;
pub use lonlat::{LonLat, EARTH_MEAN_RADIUS};
pub use quantity::{floored_mod, ParseError, Quantity};
pub use units::{AngularVelocity, Frequency, Length, Speed, Time, Weight};
