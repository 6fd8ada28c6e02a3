//! Dependency-Declared Recomputation Triggers
//!
//! ## Overview
//!
//! A [`PropertyObserver`] watches a set of serial sources and answers one
//! question per cycle: did anything I depend on change since I last fired?
//! Modules gate each computation behind its own observer, so work happens only
//! when inputs move.
//!
//! ```text
//!  cycle N:   lat.serial 4→5   observe(now) ─► true   (records 5)
//!  cycle N+1: no writes        observe(now) ─► false
//!  cycle N+2: lat.serial 5→6   observe(now) ─► false  (minimum interval not elapsed,
//!                                                      change stays pending)
//!  cycle N+3: no writes        observe(now) ─► true   (pending change fires)
//! ```
//!
//! ## Chaining
//!
//! Each observer carries its own fire serial and is itself [`Watchable`], so a
//! computation can depend on another computation having run. The navigation
//! computer recomputes track only after its position computation fired.

use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use aerocycle_si::Time;

use crate::property::{SerialSource, Watchable};

#[derive(Debug, Default)]
struct FireSerial(AtomicU64);

impl SerialSource for FireSerial {
    fn serial(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }
}

struct Watched {
    source: Arc<dyn SerialSource>,
    last_serial: u64,
}

type Callback = Box<dyn FnMut() + Send>;

/// Fires at most once per `observe()` call when a watched serial changed
pub struct PropertyObserver {
    watched: Vec<Watched>,
    callback: Option<Callback>,
    minimum_interval: Time,
    last_fire: Option<Time>,
    previous_fire: Option<Time>,
    touched: bool,
    fire_serial: Arc<FireSerial>,
}

impl PropertyObserver {
    pub fn new() -> Self {
        Self {
            watched: Vec::new(),
            callback: None,
            minimum_interval: Time::from_s(0.0),
            last_fire: None,
            previous_fire: None,
            touched: false,
            fire_serial: Arc::new(FireSerial::default()),
        }
    }

    /// Adds a source to the watch list
    ///
    /// The recorded serial starts at zero, so a source that was already
    /// written counts as changed on the first `observe()`.
    pub fn watch(&mut self, source: &impl Watchable) -> &mut Self {
        self.watched.push(Watched { source: source.serial_source(), last_serial: 0 });
        self
    }

    /// Builder form of [`watch`](Self::watch)
    pub fn watching(mut self, source: &impl Watchable) -> Self {
        self.watch(source);
        self
    }

    pub fn set_callback(&mut self, callback: impl FnMut() + Send + 'static) {
        self.callback = Some(Box::new(callback));
    }

    /// Minimum time between two fires; pending changes wait, they are not lost
    pub fn set_minimum_interval(&mut self, interval: Time) {
        self.minimum_interval = interval;
    }

    pub fn with_minimum_interval(mut self, interval: Time) -> Self {
        self.set_minimum_interval(interval);
        self
    }

    /// Forces the next eligible `observe()` to fire
    pub fn touch(&mut self) {
        self.touched = true;
    }

    /// Checks the watch list and fires if something changed
    pub fn observe(&mut self, now: Time) -> bool {
        let changed = self.touched
            || self
                .watched
                .iter()
                .any(|watched| watched.source.serial() != watched.last_serial);
        if !changed {
            return false;
        }

        if let Some(last_fire) = self.last_fire {
            if now - last_fire < self.minimum_interval {
                return false;
            }
        }

        // Serials are recorded before the callback so writes it makes to its
        // own inputs count for the next call, not this one
        for watched in &mut self.watched {
            watched.last_serial = watched.source.serial();
        }
        self.touched = false;
        self.previous_fire = self.last_fire;
        self.last_fire = Some(now);
        self.fire_serial.0.fetch_add(1, Ordering::AcqRel);

        if let Some(callback) = self.callback.as_mut() {
            callback();
        }
        log::trace!("Observer fired at {now} (serial {})", self.serial());
        true
    }

    /// Time between the two most recent fires, zero before the second fire
    pub fn update_dt(&self) -> Time {
        match (self.previous_fire, self.last_fire) {
            (Some(previous), Some(last)) => last - previous,
            _ => Time::from_s(0.0),
        }
    }

    /// Number of times this observer fired
    pub fn serial(&self) -> u64 {
        self.fire_serial.serial()
    }

    pub fn last_fire(&self) -> Option<Time> {
        self.last_fire
    }

    pub fn watch_count(&self) -> usize {
        self.watched.len()
    }
}

impl Default for PropertyObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Watchable for PropertyObserver {
    fn serial_source(&self) -> Arc<dyn SerialSource> {
        self.fire_serial.clone()
    }
}

impl fmt::Debug for PropertyObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyObserver")
            .field("watched", &self.watched.len())
            .field("minimum_interval", &self.minimum_interval)
            .field("last_fire", &self.last_fire)
            .field("serial", &self.serial())
            .finish()
    }
}
