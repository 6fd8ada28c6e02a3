//! One tick of the processing loop.

use aerocycle_si::Time;

/// Timing of one processing loop tick, shared read-only by every module
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cycle {
    serial: u64,
    timestamp: Time,
    dt: Time,
}

impl Cycle {
    pub const fn new(serial: u64, timestamp: Time, dt: Time) -> Self {
        Self { serial, timestamp, dt }
    }

    /// Sequence number, incremented by one per tick
    pub const fn serial(&self) -> u64 {
        self.serial
    }

    /// Clock reading at the start of the tick
    pub const fn timestamp(&self) -> Time {
        self.timestamp
    }

    /// Time since the previous tick; the nominal period on the first tick
    pub const fn dt(&self) -> Time {
        self.dt
    }

    /// Cycle that follows this one at `timestamp`
    pub fn next(&self, timestamp: Time, dt: Time) -> Self {
        Self::new(self.serial.wrapping_add(1), timestamp, dt)
    }
}
