//! Fixed-Rate Cycle Scheduler
//!
//! ## Overview
//!
//! The processing loop owns every module and calls them once per tick, in
//! registration order, with a fresh [`Cycle`]. It is the only place where
//! module code runs.
//!
//! ```text
//!   Idle ──start(rate)──► Running ──stop()──► Stopped
//!    │                       │
//!    └─ register_module      └─ cycle thread: tick, sleep, tick, ...
//!    └─ tick(timestamp)         (stop flag checked between ticks)
//! ```
//!
//! ## Failure Isolation
//!
//! A module that returns an error or panics is logged, counted, and skipped
//! for the rest of that tick. The remaining modules still run, and the failing
//! module is called again on the next tick.
//!
//! ## Timing
//!
//! `dt` of each cycle is measured from the clock. The first tick has no
//! predecessor and uses the nominal period instead. A tick that takes longer
//! than the period is counted as an overrun; the next tick then starts
//! immediately instead of trying to catch up.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use aerocycle_si::{Frequency, Time};
use parking_lot::Mutex;

use crate::constants::time::{DEFAULT_LOOP_RATE_HZ, OVERRUN_FACTOR};
use crate::cycle::Cycle;
use crate::errors::{LoopError, LoopResult};
use crate::time::{DeltaTracker, MonotonicClock};
use crate::traits::{Clock, Module};

/// Lifecycle of a processing loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopped,
}

impl LoopState {
    pub fn name(self) -> &'static str {
        match self {
            LoopState::Idle => "idle",
            LoopState::Running => "running",
            LoopState::Stopped => "stopped",
        }
    }
}

/// Counters for monitoring a running loop
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Ticks executed
    pub cycles: u64,
    /// Module errors and panics, all modules together
    pub module_failures: u64,
    /// Ticks that took longer than the nominal period
    pub overruns: u64,
    /// Failures per module instance name
    pub failures_by_module: HashMap<String, u64>,
}

/// Ordered set of modules plus the clock that drives them
pub struct ProcessingLoop<C: Clock = MonotonicClock> {
    modules: Vec<Box<dyn Module>>,
    clock: C,
    period: Time,
    delta: DeltaTracker,
    last_cycle: Option<Cycle>,
    state: LoopState,
    stats: Arc<Mutex<LoopStats>>,
}

impl ProcessingLoop<MonotonicClock> {
    /// Loop driven by the system monotonic clock
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }
}

impl Default for ProcessingLoop<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> ProcessingLoop<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            modules: Vec::new(),
            clock,
            period: Frequency::from_hz(DEFAULT_LOOP_RATE_HZ).period(),
            delta: DeltaTracker::new(),
            last_cycle: None,
            state: LoopState::Idle,
            stats: Arc::new(Mutex::new(LoopStats::default())),
        }
    }

    /// Nominal rate, used for the first tick's `dt` and overrun detection
    pub fn set_rate(&mut self, rate: Frequency) -> LoopResult<()> {
        self.period = validated_period(rate)?;
        Ok(())
    }

    /// Appends a module; only legal before the loop was started
    pub fn register_module(&mut self, module: impl Module + 'static) -> LoopResult<()> {
        self.register_boxed(Box::new(module))
    }

    pub fn register_boxed(&mut self, module: Box<dyn Module>) -> LoopResult<()> {
        if self.state != LoopState::Idle {
            return Err(LoopError::InvalidState {
                operation: "register_module",
                state: self.state.name(),
            });
        }
        log::debug!("Registered module {} at position {}", module.name(), self.modules.len());
        self.modules.push(module);
        Ok(())
    }

    /// Runs exactly one cycle at `timestamp`, synchronously
    pub fn tick(&mut self, timestamp: Time) -> LoopResult<Cycle> {
        if self.state == LoopState::Stopped {
            return Err(LoopError::InvalidState { operation: "tick", state: self.state.name() });
        }
        Ok(self.run_cycle(timestamp))
    }

    /// Runs one cycle at the clock's current time
    pub fn tick_now(&mut self) -> LoopResult<Cycle> {
        let now = self.clock.now();
        self.tick(now)
    }

    /// Spawns the cycle thread and returns its handle
    pub fn start(mut self, rate: Frequency) -> LoopResult<LoopHandle<C>>
    where
        C: 'static,
    {
        if self.state != LoopState::Idle {
            return Err(LoopError::InvalidState { operation: "start", state: self.state.name() });
        }
        self.period = validated_period(rate)?;
        self.state = LoopState::Running;

        let stop = Arc::new(AtomicBool::new(false));
        let stats = Arc::clone(&self.stats);
        let thread_stop = Arc::clone(&stop);

        log::info!("Starting processing loop at {rate} with {} modules", self.modules.len());
        let thread = thread::Builder::new()
            .name("aerocycle-cycle".into())
            .spawn(move || {
                self.run(&thread_stop);
                self
            })
            .map_err(|_| LoopError::ThreadFailure)?;

        Ok(LoopHandle { stop, thread: Some(thread), stats })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Snapshot of the loop counters
    pub fn stats(&self) -> LoopStats {
        self.stats.lock().clone()
    }

    pub fn period(&self) -> Time {
        self.period
    }

    pub fn last_cycle(&self) -> Option<Cycle> {
        self.last_cycle
    }

    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|module| module.name()).collect()
    }

    /// Resets every module; not allowed while running
    pub fn reset_modules(&mut self) -> LoopResult<()> {
        if self.state == LoopState::Running {
            return Err(LoopError::InvalidState { operation: "reset", state: self.state.name() });
        }
        for module in &mut self.modules {
            module.reset();
        }
        Ok(())
    }

    fn run(&mut self, stop: &AtomicBool) {
        while !stop.load(Ordering::Acquire) {
            let started = self.clock.now();
            self.run_cycle(started);

            let elapsed = self.clock.now() - started;
            if elapsed < self.period {
                thread::sleep((self.period - elapsed).to_duration());
            }
        }
        self.state = LoopState::Stopped;
        log::info!("Processing loop stopped after {} cycles", self.stats.lock().cycles);
    }

    fn run_cycle(&mut self, timestamp: Time) -> Cycle {
        let dt = self.delta.update(timestamp).unwrap_or(self.period);
        let cycle = match self.last_cycle {
            Some(previous) => previous.next(timestamp, dt),
            None => Cycle::new(1, timestamp, dt),
        };

        let started = self.clock.now();
        let mut failed: Vec<String> = Vec::new();
        for module in &mut self.modules {
            let outcome = catch_unwind(AssertUnwindSafe(|| module.process(&cycle)));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    log::error!("Module {} failed in cycle {}: {error}", module.name(), cycle.serial());
                    failed.push(module.name().to_owned());
                }
                Err(payload) => {
                    log::error!(
                        "Module {} panicked in cycle {}: {}",
                        module.name(),
                        cycle.serial(),
                        panic_message(payload.as_ref())
                    );
                    failed.push(module.name().to_owned());
                }
            }
        }
        let elapsed = self.clock.now() - started;

        let mut stats = self.stats.lock();
        stats.cycles += 1;
        for name in failed {
            stats.module_failures += 1;
            *stats.failures_by_module.entry(name).or_insert(0) += 1;
        }
        if elapsed > self.period * OVERRUN_FACTOR {
            stats.overruns += 1;
            log::warn!("Cycle {} overran: {elapsed} > {}", cycle.serial(), self.period);
        }
        drop(stats);

        self.last_cycle = Some(cycle);
        cycle
    }
}

/// Handle to a running processing loop
///
/// Dropping the handle stops the loop and joins the thread.
pub struct LoopHandle<C: Clock + 'static> {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<ProcessingLoop<C>>>,
    stats: Arc<Mutex<LoopStats>>,
}

impl<C: Clock + 'static> LoopHandle<C> {
    /// Live counters of the running loop
    pub fn stats(&self) -> LoopStats {
        self.stats.lock().clone()
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|thread| !thread.is_finished())
    }

    /// Requests a stop, waits for the in-flight tick, returns the stopped loop
    pub fn stop(mut self) -> LoopResult<ProcessingLoop<C>> {
        self.stop.store(true, Ordering::Release);
        let thread = self.thread.take().ok_or(LoopError::ThreadFailure)?;
        thread.join().map_err(|_| LoopError::ThreadFailure)
    }
}

impl<C: Clock + 'static> Drop for LoopHandle<C> {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            self.stop.store(true, Ordering::Release);
            if thread.join().is_err() {
                log::error!("Cycle thread panicked outside module processing");
            }
        }
    }
}

fn validated_period(rate: Frequency) -> LoopResult<Time> {
    let hz = rate.hz();
    if !hz.is_finite() || hz <= 0.0 {
        return Err(LoopError::InvalidRate);
    }
    Ok(rate.period())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
