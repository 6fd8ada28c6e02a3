//! Error Types for the Cycle Engine
//!
//! ## Error Categories
//!
//! The engine distinguishes four kinds of trouble, and only two of them are
//! represented as Rust errors:
//!
//! ### Missing Data (not an error)
//! An unset or nil property. Consumers read an `Option` and branch around it.
//!
//! ### Numeric Degeneracy (not an error)
//! Division by a near-zero time or distance. Guarded by minimum-separation
//! policies inside the computation; the result is simply not written.
//!
//! ### Module Failure
//! - [`ModuleError`]: returned from `Module::process()`. The processing loop
//!   logs it and skips the module for the current tick only.
//!
//! ### Configuration Failure
//! - [`ConfigError`]: wiring or parsing problems found while the module graph
//!   is built. Fatal to startup, never raised mid-run.
//! - [`LoopError`]: misuse of the processing loop state machine.
//!
//! ## Handling Strategy
//!
//! ```rust
//! use aerocycle_core::{ConfigError, Engine};
//! use aerocycle_si::Angle;
//!
//! let mut engine = Engine::new();
//! let _gps = engine.sensor::<Angle>("position/latitude").unwrap();
//!
//! match engine.sensor::<Angle>("position/latitude") {
//!     Err(ConfigError::DuplicateWriter { path }) => assert_eq!(path, "position/latitude"),
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

use thiserror_no_std::Error;

use aerocycle_si::ParseError;

/// Result type for module processing
pub type ModuleResult<T> = Result<T, ModuleError>;

/// Result type for configuration and wiring
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for processing loop control
pub type LoopResult<T> = Result<T, LoopError>;

/// Failure inside a module's `process()`
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModuleError {
    /// The computation produced a non-finite result
    #[error("Non-finite result in {what}")]
    NonFinite {
        /// Which computation degenerated
        what: &'static str,
    },

    /// Module-specific failure
    #[error("{0}")]
    Failed(String),
}

/// Configuration and wiring failure, raised while building the module graph
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A property path was requested with two different value types
    #[error("Property {path} holds {existing}, requested as {requested}")]
    TypeMismatch {
        /// Registry path
        path: String,
        /// Type the property was created with
        existing: &'static str,
        /// Type of the conflicting request
        requested: &'static str,
    },

    /// A second writer tried to claim a property
    #[error("Property {path} already has a writer")]
    DuplicateWriter {
        /// Registry path
        path: String,
    },

    /// A physical quantity could not be parsed
    #[error("Invalid quantity: {0}")]
    Quantity(ParseError),

    /// Malformed configuration document
    #[error("Malformed configuration: {0}")]
    Malformed(String),

    /// A value is outside its permitted domain
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Configuration field
        field: &'static str,
        /// Why it was rejected
        reason: &'static str,
    },
}

impl From<ParseError> for ConfigError {
    fn from(error: ParseError) -> Self {
        Self::Quantity(error)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(error: serde_json::Error) -> Self {
        Self::Malformed(error.to_string())
    }
}

/// Processing loop state machine misuse
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopError {
    /// The requested transition is not allowed from the current state
    #[error("Operation {operation} not allowed while the loop is {state}")]
    InvalidState {
        /// Operation attempted
        operation: &'static str,
        /// Current state name
        state: &'static str,
    },

    /// The tick rate is zero, negative or not finite
    #[error("Invalid loop rate")]
    InvalidRate,

    /// The cycle thread could not be spawned or panicked outside any module
    #[error("Cycle thread failure")]
    ThreadFailure,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_convert() {
        let err: ConfigError = "1 parsec".parse::<aerocycle_si::Length>().unwrap_err().into();
        assert!(matches!(err, ConfigError::Quantity(ParseError::UnknownUnit { .. })));
    }

    #[test]
    fn messages_name_the_property() {
        let err = ConfigError::DuplicateWriter { path: "track/ground-speed".into() };
        assert_eq!(err.to_string(), "Property track/ground-speed already has a writer");
    }
}
