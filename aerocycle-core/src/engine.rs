//! Property Registry and Module Wiring
//!
//! ## Overview
//!
//! The [`Engine`] owns every property of one flight computer and the bindings
//! that connect module IO names to registry paths. Modules receive it at
//! construction time, declare their inputs and outputs through
//! [`ModuleIo`], and keep the returned handles. After construction the engine
//! is no longer involved in data flow.
//!
//! ## Path Resolution
//!
//! ```text
//! io("nc").input("position/latitude")    → binding, else "position/latitude"
//! io("nc").output("track/ground-speed")  → binding, else "nc/track/ground-speed"
//! io("fd").optional_output("mode-hint")  → only if a binding exists
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use aerocycle_core::Engine;
//! use aerocycle_si::Speed;
//!
//! let mut engine = Engine::new();
//! engine.bind("fd", "measured-vertical-speed", "nc/track/vertical-speed");
//!
//! let mut io = engine.io("fd");
//! let measured = io.input::<Speed>("measured-vertical-speed").unwrap();
//! assert_eq!(measured.path(), "nc/track/vertical-speed");
//! ```

use std::collections::HashMap;

use crate::config::EngineConfig;
use crate::errors::ConfigResult;
use crate::property::{PropertyIn, PropertyOut, PropertyRegistry};

/// Owner of the property registry and the wiring bindings
#[derive(Default)]
pub struct Engine {
    registry: PropertyRegistry,
    // instance -> local IO name -> registry path
    bindings: HashMap<String, HashMap<String, String>>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with the bindings of a configuration document
    pub fn from_config(config: &EngineConfig) -> Self {
        let mut engine = Self::new();
        for (instance, names) in &config.bindings {
            for (name, path) in names {
                engine.bind(instance, name, path);
            }
        }
        engine
    }

    /// Routes IO `name` of module `instance` to registry `path`
    ///
    /// Must be called before the module is constructed.
    pub fn bind(&mut self, instance: &str, name: &str, path: &str) {
        log::debug!("Binding {instance}:{name} -> {path}");
        self.bindings
            .entry(instance.to_owned())
            .or_default()
            .insert(name.to_owned(), path.to_owned());
    }

    /// IO declaration helper for one module instance
    pub fn io(&mut self, instance: &str) -> ModuleIo<'_> {
        ModuleIo { engine: self, instance: instance.to_owned() }
    }

    /// Claims the writer of an externally fed property (sensor adapters)
    pub fn sensor<T: Clone + Send + Sync + 'static>(&mut self, path: &str) -> ConfigResult<PropertyOut<T>> {
        self.registry.writer(path)
    }

    /// Reader for any property (displays, loggers, tests)
    pub fn reader<T: Clone + Send + Sync + 'static>(&mut self, path: &str) -> ConfigResult<PropertyIn<T>> {
        self.registry.reader(path)
    }

    pub fn registry(&self) -> &PropertyRegistry {
        &self.registry
    }

    fn binding(&self, instance: &str, name: &str) -> Option<&str> {
        self.bindings
            .get(instance)
            .and_then(|names| names.get(name))
            .map(String::as_str)
    }
}

/// Declares the inputs and outputs of one module instance
pub struct ModuleIo<'a> {
    engine: &'a mut Engine,
    instance: String,
}

impl ModuleIo<'_> {
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Input `name`: its binding, else `name` as an absolute path
    pub fn input<T: Clone + Send + Sync + 'static>(&mut self, name: &str) -> ConfigResult<PropertyIn<T>> {
        let path = self.engine.binding(&self.instance, name).unwrap_or(name).to_owned();
        self.engine.registry.reader(&path)
    }

    /// Output `name`: its binding, else `"{instance}/{name}"`
    pub fn output<T: Clone + Send + Sync + 'static>(&mut self, name: &str) -> ConfigResult<PropertyOut<T>> {
        let path = match self.engine.binding(&self.instance, name) {
            Some(path) => path.to_owned(),
            None => format!("{}/{}", self.instance, name),
        };
        self.engine.registry.writer(&path)
    }

    /// Output `name` if it was explicitly bound
    pub fn optional_output<T: Clone + Send + Sync + 'static>(
        &mut self,
        name: &str,
    ) -> ConfigResult<Option<PropertyOut<T>>> {
        match self.engine.binding(&self.instance, name).map(str::to_owned) {
            Some(path) => self.engine.registry.writer(&path).map(Some),
            None => Ok(None),
        }
    }
}
