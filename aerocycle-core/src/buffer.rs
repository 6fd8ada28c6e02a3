//! Fixed-Size Ring Buffers for Sample History
//!
//! ## Overview
//!
//! Derived computations need a short window of recent samples: the navigation
//! computer estimates track from the two newest positions and ground speed from
//! the oldest and newest of a three-entry window. This module provides the
//! fixed-capacity ring buffer they share, plus an admission-gated variant.
//!
//! ## Design
//!
//! ### Overwrite on Full
//!
//! When full, a push discards the oldest entry instead of failing. Recent
//! samples are worth more than old ones.
//!
//! ### Admission Predicates
//!
//! The navigation computer keeps three buffers that differ only in which
//! samples they accept. Instead of three copies of the same container,
//! [`AdmissionBuffer`] pairs one [`CircularBuffer`] with a predicate that sees
//! the last admitted entry and the candidate:
//!
//! ```text
//!   sample ──► primary      (admit all)          [p7, p8, p9]
//!         ├──► 2x-accurate  (moved > 2σ)         [p3, p6, p9]
//!         └──► 9x-accurate  (moved > 9σ)         [p0, p5, p9]
//! ```
//!
//! Storage is a `heapless::Deque`, so the buffers never allocate.
//!
//! ## Usage Example
//!
//! ```rust
//! use aerocycle_core::buffer::CircularBuffer;
//!
//! let mut history: CircularBuffer<f64, 3> = CircularBuffer::new();
//! for sample in [1.0, 2.0, 3.0, 4.0] {
//!     history.push(sample);
//! }
//!
//! assert_eq!(history.first(), Some(&2.0));
//! assert_eq!(history.last(), Some(&4.0));
//! assert!(history.is_full());
//! ```

use core::fmt;

use heapless::Deque;

/// Fixed-size circular buffer, oldest entry first
///
/// ## Internal Invariants
///
/// - `len() <= N`
/// - Iteration is in insertion order (oldest to newest)
#[derive(Clone, Debug)]
pub struct CircularBuffer<T, const N: usize> {
    data: Deque<T, N>,
}

impl<T, const N: usize> CircularBuffer<T, N> {
    /// Creates a new empty buffer
    pub const fn new() -> Self {
        Self { data: Deque::new() }
    }

    /// Adds an entry, overwriting the oldest when full
    pub fn push(&mut self, item: T) {
        if self.data.is_full() {
            self.data.pop_front();
        }
        // Cannot fail: a slot was freed above
        let _ = self.data.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.data.is_full()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Oldest entry
    pub fn first(&self) -> Option<&T> {
        self.data.front()
    }

    /// Newest entry
    pub fn last(&self) -> Option<&T> {
        self.data.back()
    }

    /// Entry by logical index from the newest (0 = newest)
    pub fn nth_newest(&self, index: usize) -> Option<&T> {
        let len = self.len();
        if index >= len {
            return None;
        }
        self.data.iter().nth(len - 1 - index)
    }

    /// Iterate from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}

impl<T, const N: usize> Default for CircularBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Decides whether `candidate` enters a buffer whose newest entry is `last`
pub type Admission<T> = Box<dyn Fn(&T, &T) -> bool + Send>;

/// Circular buffer that only accepts entries passing an admission predicate
///
/// The predicate is consulted only when the buffer already holds an entry;
/// the first sample is always admitted.
pub struct AdmissionBuffer<T, const N: usize> {
    buffer: CircularBuffer<T, N>,
    admit: Admission<T>,
}

impl<T, const N: usize> AdmissionBuffer<T, N> {
    pub fn new(admit: impl Fn(&T, &T) -> bool + Send + 'static) -> Self {
        Self { buffer: CircularBuffer::new(), admit: Box::new(admit) }
    }

    /// Buffer that admits every sample
    pub fn admit_all() -> Self {
        Self::new(|_, _| true)
    }

    /// Offers a sample; returns whether it was admitted
    pub fn offer(&mut self, candidate: T) -> bool {
        let admitted = match self.buffer.last() {
            Some(last) => (self.admit)(last, &candidate),
            None => true,
        };
        if admitted {
            self.buffer.push(candidate);
        }
        admitted
    }

    pub fn entries(&self) -> &CircularBuffer<T, N> {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for AdmissionBuffer<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdmissionBuffer").field("buffer", &self.buffer).finish_non_exhaustive()
    }
}
