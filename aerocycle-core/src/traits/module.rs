//! The Unit of Computation
//!
//! A module reads input properties, computes, and writes output properties.
//! The processing loop calls every registered module once per tick, in
//! registration order:
//!
//! ```text
//! tick N:  Cycle{serial: N, dt} ──► [navigation] ──► [flight director] ──► [lookahead]
//!                                        │                  ▲
//!                                        └── properties ────┘
//! ```
//!
//! Modules never hold references to each other. Everything they exchange goes
//! through properties obtained from the engine at construction time.

use crate::cycle::Cycle;
use crate::errors::ModuleResult;

/// Trait for modules scheduled by the processing loop
///
/// ## Implementation Guidelines
///
/// 1. **Gate work on observers**: recompute only when inputs changed
/// 2. **Bounded processing time**: no blocking calls inside `process`
/// 3. **Missing inputs are not errors**: write nil and carry on
/// 4. **Errors are per tick**: a returned error skips this module for the
///    current tick only
///
/// ## Example: Scaling Module
///
/// ```rust
/// use aerocycle_core::{Cycle, Engine, Module, ModuleResult, PropertyIn, PropertyOut};
///
/// struct Doubler {
///     input: PropertyIn<f64>,
///     output: PropertyOut<f64>,
/// }
///
/// impl Module for Doubler {
///     fn name(&self) -> &str {
///         "doubler"
///     }
///
///     fn process(&mut self, _cycle: &Cycle) -> ModuleResult<()> {
///         self.output.set(self.input.read().map(|value| value * 2.0));
///         Ok(())
///     }
/// }
///
/// let mut engine = Engine::new();
/// let mut io = engine.io("doubler");
/// let doubler = Doubler {
///     input: io.input("sensors/raw").unwrap(),
///     output: io.output("value").unwrap(),
/// };
/// assert_eq!(doubler.output.path(), "doubler/value");
/// ```
pub trait Module: Send {
    /// Instance name, used in logs and loop statistics
    fn name(&self) -> &str;

    /// Runs one tick
    fn process(&mut self, cycle: &Cycle) -> ModuleResult<()>;

    /// Clears internal state (smoothers, integrators, histories)
    ///
    /// Default implementation does nothing.
    fn reset(&mut self) {}
}
