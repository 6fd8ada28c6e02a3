//! Path-keyed property registry.
//!
//! The registry creates each property the first time its path is requested,
//! remembers its value type, and hands out at most one writer. A reader may be
//! requested before or after the writer; both end up on the same cell.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::{ConfigError, ConfigResult};

use super::{BasicProperty, Property, PropertyIn, PropertyOut};

struct Entry {
    cell: Arc<dyn Any + Send + Sync>,
    view: Arc<dyn BasicProperty>,
    type_name: &'static str,
    has_writer: bool,
}

/// Diagnostic view of one registered property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySummary {
    pub path: String,
    pub type_name: &'static str,
    pub has_writer: bool,
    pub valid: bool,
    pub serial: u64,
}

/// All properties of one engine, keyed by path
#[derive(Default)]
pub struct PropertyRegistry {
    entries: HashMap<String, Entry>,
}

impl PropertyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn cell<T: Clone + Send + Sync + 'static>(&mut self, path: &str) -> ConfigResult<(Arc<Property<T>>, &mut Entry)> {
        let entry = self.entries.entry(path.to_owned()).or_insert_with(|| {
            log::trace!("Creating property {path} ({})", type_name::<T>());
            let cell = Arc::new(Property::<T>::new(path));
            Entry {
                cell: cell.clone(),
                view: cell,
                type_name: type_name::<T>(),
                has_writer: false,
            }
        });

        match Arc::clone(&entry.cell).downcast::<Property<T>>() {
            Ok(cell) => Ok((cell, entry)),
            Err(_) => Err(ConfigError::TypeMismatch {
                path: path.to_owned(),
                existing: entry.type_name,
                requested: type_name::<T>(),
            }),
        }
    }

    /// Claims the single writer of `path`
    pub fn writer<T: Clone + Send + Sync + 'static>(&mut self, path: &str) -> ConfigResult<PropertyOut<T>> {
        let (cell, entry) = self.cell::<T>(path)?;
        if entry.has_writer {
            return Err(ConfigError::DuplicateWriter { path: path.to_owned() });
        }
        entry.has_writer = true;
        Ok(PropertyOut::from_cell(cell))
    }

    /// Reader of `path`, creating the property if needed
    pub fn reader<T: Clone + Send + Sync + 'static>(&mut self, path: &str) -> ConfigResult<PropertyIn<T>> {
        let (cell, _) = self.cell::<T>(path)?;
        Ok(PropertyIn::from_cell(cell))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Type-erased access for diagnostics and generic observers
    pub fn get(&self, path: &str) -> Option<Arc<dyn BasicProperty>> {
        self.entries.get(path).map(|entry| Arc::clone(&entry.view))
    }

    /// Properties that are read by someone but have no writer
    pub fn unwritten(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.has_writer)
            .map(|(path, _)| path.as_str())
            .collect();
        paths.sort_unstable();
        paths
    }

    /// Summary of every property, sorted by path
    pub fn summary(&self) -> Vec<PropertySummary> {
        let mut summary: Vec<PropertySummary> = self
            .entries
            .iter()
            .map(|(path, entry)| PropertySummary {
                path: path.clone(),
                type_name: entry.type_name,
                has_writer: entry.has_writer,
                valid: entry.view.valid(),
                serial: entry.view.serial(),
            })
            .collect();
        summary.sort_by(|a, b| a.path.cmp(&b.path));
        summary
    }
}
