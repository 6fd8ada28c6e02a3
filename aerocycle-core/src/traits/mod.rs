//! Core Traits and Extension Points
//!
//! ## Module Organization
//!
//! - [`module`] - The unit of computation scheduled by the processing loop
//! - [`time`] - Clock abstraction for the cycle scheduler
//!
//! Modules are stored as trait objects in registration order, so [`Module`]
//! is object safe. [`Clock`] is generic on the loop to keep the tick path
//! free of dynamic dispatch.

pub mod module;
pub mod time;

pub use module::Module;
pub use time::Clock;
