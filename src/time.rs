//! Injectable access to the current local time.

use std::sync::Arc;

use chrono::{Duration, Local, NaiveDateTime};
use parking_lot::Mutex;

/// Provides the current local wall-clock time.
///
/// Nothing in this crate reads the environment clock directly; the business
/// clock and the circuit breaker both consult an injected `TimeSource`, so
/// tests can pin or advance time deterministically instead of sleeping.
pub trait TimeSource: Send + Sync {
    /// Returns the current local time.
    fn now(&self) -> NaiveDateTime;
}

/// Reads the real system clock in local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A manually-driven time source for tests and demos.
///
/// Clones share the same instant: advancing one handle advances them all,
/// which lets a test move a breaker handle and an assertion handle in step.
#[derive(Clone)]
pub struct FixedTimeSource {
    now: Arc<Mutex<NaiveDateTime>>,
}

impl FixedTimeSource {
    /// Creates a source pinned at the given instant.
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Moves the current instant forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.lock();
        *now = *now + delta;
    }

    /// Re-pins the source at a new instant.
    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock() = now;
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock()
    }
}
