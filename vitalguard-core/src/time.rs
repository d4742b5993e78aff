//! Time management for the monitor
//!
//! Provides clock abstraction so the cooperative scheduler can run on:
//! - A hardware tick counter (firmware)
//! - `std::time::Instant` (host builds)
//! - A hand-driven mock clock (tests)
//!
//! All arithmetic on timestamps saturates; a clock that stalls or steps
//! backwards yields zero elapsed time rather than a panic.

use core::cell::Cell;

/// Timestamp in milliseconds since device boot
pub type Timestamp = u64;

/// Source of monotonic time for the scheduler
pub trait TimeSource {
    /// Current timestamp in milliseconds
    fn now(&self) -> Timestamp;
}

/// Milliseconds from `earlier` to `later`, zero if the clock went backwards
#[inline]
pub fn elapsed_ms(earlier: Timestamp, later: Timestamp) -> u64 {
    later.saturating_sub(earlier)
}

/// Whether a deadline has been reached at `now`
#[inline]
pub fn is_due(now: Timestamp, deadline: Timestamp) -> bool {
    now >= deadline
}

/// Monotonic clock backed by `std::time::Instant`
///
/// Starts at 0 on construction.
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    start: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicClock {
    /// Create a clock reading 0 now
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for MonotonicClock {
    fn now(&self) -> Timestamp {
        self.start.elapsed().as_millis() as Timestamp
    }
}

/// Controllable time for testing
///
/// Interior mutability lets a test advance the clock while the code under
/// test holds a shared reference to it.
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    timestamp: Cell<Timestamp>,
}

impl MockClock {
    /// Create a clock frozen at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp: Cell::new(timestamp),
        }
    }

    /// Jump to an absolute time
    pub fn set(&self, timestamp: Timestamp) {
        self.timestamp.set(timestamp);
    }

    /// Move forward by `ms`
    pub fn advance(&self, ms: u64) {
        self.timestamp.set(self.timestamp.get().saturating_add(ms));
    }
}

impl TimeSource for MockClock {
    fn now(&self) -> Timestamp {
        self.timestamp.get()
    }
}
