//! Processing loop behaviour with several cooperating and misbehaving modules.

mod common;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use aerocycle_core::time::ManualClock;
use aerocycle_core::{
    Cycle, Engine, LoopError, LoopState, Module, ModuleError, ModuleResult, ProcessingLoop, PropertyIn,
    PropertyObserver, PropertyOut,
};
use aerocycle_si::{Frequency, Time};
use parking_lot::Mutex;

/// Appends its name to a shared journal on every call
struct Recorder {
    name: &'static str,
    journal: Arc<Mutex<Vec<(u64, &'static str)>>>,
}

impl Module for Recorder {
    fn name(&self) -> &str {
        self.name
    }

    fn process(&mut self, cycle: &Cycle) -> ModuleResult<()> {
        self.journal.lock().push((cycle.serial(), self.name));
        Ok(())
    }
}

/// Fails on every odd cycle
struct Flaky;

impl Module for Flaky {
    fn name(&self) -> &str {
        "flaky"
    }

    fn process(&mut self, cycle: &Cycle) -> ModuleResult<()> {
        if cycle.serial() % 2 == 1 {
            return Err(ModuleError::Failed("odd cycle".into()));
        }
        Ok(())
    }
}

struct Panicker;

impl Module for Panicker {
    fn name(&self) -> &str {
        "panicker"
    }

    fn process(&mut self, _cycle: &Cycle) -> ModuleResult<()> {
        panic!("sensor driver crashed");
    }
}

/// Copies its input to its output when the observer reports a change
struct Relay {
    name: String,
    input: PropertyIn<f64>,
    output: PropertyOut<f64>,
    observer: PropertyObserver,
    runs: Arc<Mutex<u32>>,
}

impl Relay {
    fn new(engine: &mut Engine, name: &str, input: &str, runs: Arc<Mutex<u32>>) -> Self {
        let mut io = engine.io(name);
        let input = io.input(input).unwrap();
        let output = io.output("value").unwrap();
        let observer = PropertyObserver::new().watching(&input);
        Self { name: name.to_owned(), input, output, observer, runs }
    }
}

impl Module for Relay {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&mut self, cycle: &Cycle) -> ModuleResult<()> {
        if self.observer.observe(cycle.timestamp()) {
            *self.runs.lock() += 1;
            self.output.set(self.input.read());
        }
        Ok(())
    }
}

fn journal() -> Arc<Mutex<Vec<(u64, &'static str)>>> {
    Arc::new(Mutex::new(Vec::new()))
}

#[test]
fn modules_run_in_registration_order() {
    let journal = journal();
    let mut cycles = ProcessingLoop::new();
    for name in ["first", "second", "third"] {
        cycles.register_module(Recorder { name, journal: Arc::clone(&journal) }).unwrap();
    }

    cycles.tick(Time::from_s(0.0)).unwrap();
    cycles.tick(Time::from_s(0.01)).unwrap();

    assert_eq!(
        *journal.lock(),
        vec![(1, "first"), (1, "second"), (1, "third"), (2, "first"), (2, "second"), (2, "third")]
    );
}

#[test]
fn failures_are_isolated_per_module_and_tick() {
    let journal = journal();
    let mut cycles = ProcessingLoop::new();
    cycles.register_module(Flaky).unwrap();
    cycles.register_module(Panicker).unwrap();
    cycles.register_module(Recorder { name: "survivor", journal: Arc::clone(&journal) }).unwrap();

    for step in 0..4 {
        cycles.tick(Time::from_ms(10.0 * step as f64)).unwrap();
    }

    let stats = cycles.stats();
    assert_eq!(stats.cycles, 4);
    assert_eq!(stats.failures_by_module.get("flaky"), Some(&2));
    assert_eq!(stats.failures_by_module.get("panicker"), Some(&4));
    assert_eq!(stats.module_failures, 6);
    assert_eq!(journal.lock().len(), 4);
}

#[test]
fn chained_modules_see_upstream_writes_in_the_same_tick() {
    let mut engine = Engine::new();
    let source = engine.sensor::<f64>("source").unwrap();
    let upstream_runs = Arc::new(Mutex::new(0));
    let downstream_runs = Arc::new(Mutex::new(0));
    let upstream = Relay::new(&mut engine, "a", "source", Arc::clone(&upstream_runs));
    let downstream = Relay::new(&mut engine, "b", "a/value", Arc::clone(&downstream_runs));
    let sink = engine.reader::<f64>("b/value").unwrap();

    let mut cycles = ProcessingLoop::new();
    cycles.register_module(upstream).unwrap();
    cycles.register_module(downstream).unwrap();

    source.write(4.0);
    cycles.tick(Time::from_s(0.0)).unwrap();
    assert_eq!(sink.read(), Some(4.0));

    // Quiet ticks do not wake either module
    cycles.tick(Time::from_s(0.01)).unwrap();
    cycles.tick(Time::from_s(0.02)).unwrap();
    assert_eq!(*upstream_runs.lock(), 1);
    assert_eq!(*downstream_runs.lock(), 1);

    source.write_nil();
    cycles.tick(Time::from_s(0.03)).unwrap();
    assert!(sink.is_nil());
    assert_eq!(*downstream_runs.lock(), 2);
}

#[test]
fn first_tick_uses_nominal_period() {
    let mut cycles = ProcessingLoop::new();
    cycles.set_rate(Frequency::from_hz(50.0)).unwrap();

    let first = cycles.tick(Time::from_s(3.0)).unwrap();
    let second = cycles.tick(Time::from_s(3.5)).unwrap();
    assert_eq!(first.serial(), 1);
    assert_eq!(first.dt(), Time::from_ms(20.0));
    assert_eq!(second.serial(), 2);
    assert_close!(second.dt().s(), 0.5, 1e-12);
}

#[test]
fn threaded_loop_stops_cleanly() {
    let journal = journal();
    let mut cycles = ProcessingLoop::with_clock(ManualClock::new(Time::from_s(0.0)));
    cycles.register_module(Recorder { name: "worker", journal: Arc::clone(&journal) }).unwrap();

    let handle = cycles.start(Frequency::from_hz(1000.0)).unwrap();
    thread::sleep(Duration::from_millis(30));
    assert!(handle.is_running());

    let mut cycles = handle.stop().unwrap();
    assert_eq!(cycles.state(), LoopState::Stopped);
    assert!(!journal.lock().is_empty());
    assert!(matches!(cycles.tick(Time::from_s(1.0)), Err(LoopError::InvalidState { .. })));
    assert!(cycles.register_module(Recorder { name: "late", journal }).is_err());
}

#[test]
fn dropping_the_handle_stops_the_loop() {
    let journal = journal();
    let mut cycles = ProcessingLoop::new();
    cycles.register_module(Recorder { name: "worker", journal: Arc::clone(&journal) }).unwrap();

    let handle = cycles.start(Frequency::from_hz(1000.0)).unwrap();
    while journal.lock().len() < 3 {
        thread::sleep(Duration::from_millis(1));
    }
    drop(handle);

    // The thread was joined, nothing runs after the drop
    let ticks = journal.lock().len();
    thread::sleep(Duration::from_millis(20));
    assert_eq!(journal.lock().len(), ticks);
}
