//! Edge-detecting conditions over a single property.
//!
//! Observers answer "did any input change"; prop actions answer narrower
//! questions about one property, such as "did the lateral mode just change"
//! or "did the autopilot engage switch just go true". Each `check()` compares
//! against the state seen by the previous check, so a condition is reported
//! once per edge.

use std::sync::Arc;

use crate::property::{PropertyIn, SerialSource, Watchable};

/// Condition evaluated once per cycle
pub trait PropAction {
    /// Whether the condition was met since the previous check
    fn check(&mut self) -> bool;
}

/// Any write happened, even one that stored the same value
pub struct SerialChanged {
    source: Arc<dyn SerialSource>,
    last_serial: u64,
}

impl SerialChanged {
    pub fn new(property: &impl Watchable) -> Self {
        Self { source: property.serial_source(), last_serial: 0 }
    }
}

impl PropAction for SerialChanged {
    fn check(&mut self) -> bool {
        let serial = self.source.serial();
        if serial != self.last_serial {
            self.last_serial = serial;
            true
        } else {
            false
        }
    }
}

/// The value differs from the previous check; nil and unset count as no value
///
/// The state at construction is the baseline, so a property that already
/// holds a value is not reported as changed on the first check.
pub struct PropChanged<T> {
    property: PropertyIn<T>,
    last_value: Option<T>,
}

impl<T: Clone + PartialEq + Send + 'static> PropChanged<T> {
    pub fn new(property: PropertyIn<T>) -> Self {
        let last_value = current(&property);
        Self { property, last_value }
    }

    pub fn property(&self) -> &PropertyIn<T> {
        &self.property
    }

    /// Value seen by the most recent check
    pub fn last_value(&self) -> Option<&T> {
        self.last_value.as_ref()
    }
}

impl<T: Clone + PartialEq + Send + 'static> PropAction for PropChanged<T> {
    fn check(&mut self) -> bool {
        let value = current(&self.property);
        if value != self.last_value {
            self.last_value = value;
            true
        } else {
            false
        }
    }
}

/// Changed, and now holds `expected`
pub struct PropChangedTo<T> {
    changed: PropChanged<T>,
    expected: T,
}

impl<T: Clone + PartialEq + Send + 'static> PropChangedTo<T> {
    pub fn new(property: PropertyIn<T>, expected: T) -> Self {
        Self { changed: PropChanged::new(property), expected }
    }

    pub fn expected(&self) -> &T {
        &self.expected
    }
}

impl<T: Clone + PartialEq + Send + 'static> PropAction for PropChangedTo<T> {
    fn check(&mut self) -> bool {
        self.changed.check() && self.changed.last_value() == Some(&self.expected)
    }
}

/// Changed, and is now explicitly nil
pub struct ChangedToNil<T> {
    changed: PropChanged<T>,
}

impl<T: Clone + PartialEq + Send + 'static> ChangedToNil<T> {
    pub fn new(property: PropertyIn<T>) -> Self {
        Self { changed: PropChanged::new(property) }
    }
}

impl<T: Clone + PartialEq + Send + 'static> PropAction for ChangedToNil<T> {
    fn check(&mut self) -> bool {
        self.changed.check() && self.changed.property().is_nil()
    }
}

// Fallbacks are ignored: an edge is about what the writer stored
fn current<T: Clone + Send + 'static>(property: &PropertyIn<T>) -> Option<T> {
    property.snapshot().0.as_value().cloned()
}
