//! Cycle-driven dataflow engine for flight computers
//!
//! Modules exchange typed, path-named properties and are run once per tick by
//! a fixed-rate processing loop. Change detection through serial numbers lets
//! each module recompute only what its inputs invalidated.
//!
//! Key constraints:
//! - One writer per property, any number of readers
//! - Missing data is a value (nil), not an error
//! - A failing or panicking module never stops the loop
//!
//! ```rust
//! use aerocycle_core::modules::Lookahead;
//! use aerocycle_core::{Engine, EngineConfig, ProcessingLoop};
//! use aerocycle_si::Time;
//!
//! let config = EngineConfig::from_json(r#"{ "rate": "50 Hz" }"#).unwrap();
//! let mut engine = Engine::from_config(&config);
//!
//! let input = engine.sensor::<f64>("input").unwrap();
//! let lookahead_time = engine.sensor::<Time>("lookahead-time").unwrap();
//! let trend = Lookahead::new(&mut engine, "trend", &config.lookahead).unwrap();
//! let output = engine.reader::<f64>("trend/output").unwrap();
//!
//! let mut cycles = ProcessingLoop::new();
//! cycles.set_rate(config.rate).unwrap();
//! cycles.register_module(trend).unwrap();
//!
//! lookahead_time.write(Time::from_s(1.0));
//! for step in 0..10 {
//!     input.write(step as f64);
//!     cycles.tick(Time::from_ms(20.0 * step as f64)).unwrap();
//! }
//! assert!(output.valid());
//! ```

#![deny(unsafe_code)]

pub mod actions;
pub mod buffer;
pub mod config;
pub mod constants;
pub mod cycle;
pub mod engine;
pub mod errors;
pub mod modules;
pub mod numeric;
pub mod observer;
pub mod pid;
pub mod processing_loop;
pub mod property;
pub mod smoother;
pub mod time;
pub mod traits;

// Public API
pub use actions::{ChangedToNil, PropAction, PropChanged, PropChangedTo, SerialChanged};
pub use config::{EngineConfig, FlightDirectorConfig, LookaheadConfig, NavigationConfig};
pub use cycle::Cycle;
pub use engine::{Engine, ModuleIo};
pub use errors::{ConfigError, ConfigResult, LoopError, LoopResult, ModuleError, ModuleResult};
pub use observer::PropertyObserver;
pub use pid::{Pid, PidConfig};
pub use processing_loop::{LoopHandle, LoopState, LoopStats, ProcessingLoop};
pub use property::{BasicProperty, Property, PropertyIn, PropertyOut, Slot};
pub use smoother::{RangeSmoother, Smoother};
pub use traits::{Clock, Module};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
