//! Flight computer modules built on the engine.
//!
//! | Module | Reads | Writes |
//! |--------|-------|--------|
//! | [`NavigationComputer`] | GPS fix, AHRS orientation | smoothed attitude, track, ground speed |
//! | [`FlightDirector`] | selected and measured flight parameters | commanded pitch and roll |
//! | [`Lookahead`] | any scalar | its short-term prediction |

pub mod flight_director;
pub mod lookahead;
pub mod navigation;

pub use flight_director::{FlightDirector, LateralMode, VerticalMode};
pub use lookahead::Lookahead;
pub use navigation::{FixedMagneticModel, MagneticModel, MagneticVariation, NavigationComputer};
