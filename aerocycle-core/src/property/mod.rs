//! Typed, Validity-Aware Data Cells
//!
//! ## Overview
//!
//! Modules never call each other. They communicate through properties: named,
//! typed cells that hold a value, an explicit nil, or nothing at all yet.
//! Every write bumps a serial number, which is what observers compare to
//! decide whether a computation must run again.
//!
//! ```text
//!                 ┌─────────────── Property<Angle> "position/latitude" ──┐
//!  PropertyOut ──►│ slot: Unset | Nil | Value(52.2°)   serial: 17        │──► PropertyIn (any number)
//!  (exactly one)  │ fallback: Option<Angle>                              │
//!                 └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//!
//! Each property has exactly one [`PropertyOut`] (not `Clone`) and any number
//! of [`PropertyIn`] readers. Both dereference to the shared [`Property`], so
//! reading is the same through either handle. The single-writer rule is
//! enforced by the registry when handles are handed out.
//!
//! ## Reads Never Fail
//!
//! `read()` yields the value, else the fallback, else `None`. Missing data is
//! an ordinary branch in module code, not an error.
//!
//! ## Thread Safety
//!
//! The slot and serial live under one `parking_lot::Mutex`, so a reader on the
//! cycle thread always sees a value together with the serial it was written
//! with, even when a sensor adapter writes from its own thread.

pub mod registry;

use core::fmt;
use core::ops::Deref;
use std::sync::Arc;

use parking_lot::Mutex;

pub use registry::{PropertyRegistry, PropertySummary};

/// Content of a property
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<T> {
    /// Never written
    Unset,
    /// Explicitly marked absent by its writer
    Nil,
    /// Holds a value
    Value(T),
}

impl<T> Slot<T> {
    pub fn as_value(&self) -> Option<&T> {
        match self {
            Slot::Value(value) => Some(value),
            _ => None,
        }
    }
}

/// Anything with a serial number that changes on every update
///
/// Properties and observers both implement this, so an observer can watch
/// either.
pub trait SerialSource: Send + Sync {
    fn serial(&self) -> u64;
}

/// Type-erased view of a property
pub trait BasicProperty: SerialSource {
    fn path(&self) -> &str;

    /// A value is set (neither unset nor nil)
    fn valid(&self) -> bool;

    /// Explicitly nil, as opposed to never written
    fn is_nil(&self) -> bool;
}

/// Handles that can be put on an observer's watch list
pub trait Watchable {
    fn serial_source(&self) -> Arc<dyn SerialSource>;
}

struct State<T> {
    slot: Slot<T>,
    serial: u64,
    fallback: Option<T>,
}

/// Shared property cell
///
/// Accessed through [`PropertyIn`] or [`PropertyOut`].
pub struct Property<T> {
    path: String,
    state: Mutex<State<T>>,
}

impl<T: Clone + Send + 'static> Property<T> {
    pub(crate) fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            state: Mutex::new(State { slot: Slot::Unset, serial: 0, fallback: None }),
        }
    }

    /// Value, else fallback, else `None`
    pub fn read(&self) -> Option<T> {
        let state = self.state.lock();
        match &state.slot {
            Slot::Value(value) => Some(value.clone()),
            _ => state.fallback.clone(),
        }
    }

    pub fn read_or(&self, default: T) -> T {
        self.read().unwrap_or(default)
    }

    /// Current slot together with its serial, read atomically
    pub fn snapshot(&self) -> (Slot<T>, u64) {
        let state = self.state.lock();
        (state.slot.clone(), state.serial)
    }

    pub fn valid(&self) -> bool {
        matches!(self.state.lock().slot, Slot::Value(_))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self.state.lock().slot, Slot::Nil)
    }

    pub fn serial(&self) -> u64 {
        self.state.lock().serial
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn store_fallback(&self, fallback: Option<T>) {
        self.state.lock().fallback = fallback;
    }

    fn store(&self, slot: Slot<T>) {
        let mut state = self.state.lock();
        state.slot = slot;
        state.serial = state.serial.wrapping_add(1);
    }
}

impl<T: Clone + Send + 'static> SerialSource for Property<T> {
    fn serial(&self) -> u64 {
        Property::serial(self)
    }
}

impl<T: Clone + Send + 'static> BasicProperty for Property<T> {
    fn path(&self) -> &str {
        Property::path(self)
    }

    fn valid(&self) -> bool {
        Property::valid(self)
    }

    fn is_nil(&self) -> bool {
        Property::is_nil(self)
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Property")
            .field("path", &self.path)
            .field("slot", &state.slot)
            .field("serial", &state.serial)
            .finish()
    }
}

/// Reading handle, freely cloneable
pub struct PropertyIn<T> {
    cell: Arc<Property<T>>,
}

impl<T> Clone for PropertyIn<T> {
    fn clone(&self) -> Self {
        Self { cell: Arc::clone(&self.cell) }
    }
}

impl<T> PropertyIn<T> {
    pub(crate) fn from_cell(cell: Arc<Property<T>>) -> Self {
        Self { cell }
    }
}

impl<T> Deref for PropertyIn<T> {
    type Target = Property<T>;

    fn deref(&self) -> &Property<T> {
        &self.cell
    }
}

impl<T: Clone + Send + 'static> Watchable for PropertyIn<T> {
    fn serial_source(&self) -> Arc<dyn SerialSource> {
        self.cell.clone()
    }
}

impl<T: fmt::Debug> fmt::Debug for PropertyIn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropertyIn").field(&*self.cell).finish()
    }
}

/// Writing handle, exactly one per property
pub struct PropertyOut<T> {
    cell: Arc<Property<T>>,
}

impl<T: Clone + Send + 'static> PropertyOut<T> {
    pub(crate) fn from_cell(cell: Arc<Property<T>>) -> Self {
        Self { cell }
    }

    /// Stores a value and bumps the serial, even if the value is unchanged
    pub fn write(&self, value: T) {
        self.cell.store(Slot::Value(value));
    }

    /// Marks the property explicitly absent and bumps the serial
    pub fn write_nil(&self) {
        self.cell.store(Slot::Nil);
    }

    /// `Some` writes the value, `None` writes nil
    pub fn set(&self, value: Option<T>) {
        match value {
            Some(value) => self.write(value),
            None => self.write_nil(),
        }
    }

    /// Value returned by `read()` while the property is unset or nil
    ///
    /// Owned by the writer like the value itself; readers cannot change it.
    pub fn set_fallback(&self, fallback: Option<T>) {
        self.cell.store_fallback(fallback);
    }

    /// A reader for the same property
    pub fn reader(&self) -> PropertyIn<T> {
        PropertyIn::from_cell(Arc::clone(&self.cell))
    }
}

impl<T> Deref for PropertyOut<T> {
    type Target = Property<T>;

    fn deref(&self) -> &Property<T> {
        &self.cell
    }
}

impl<T: Clone + Send + 'static> Watchable for PropertyOut<T> {
    fn serial_source(&self) -> Arc<dyn SerialSource> {
        self.cell.clone()
    }
}

impl<T: fmt::Debug> fmt::Debug for PropertyOut<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropertyOut").field(&*self.cell).finish()
    }
}
