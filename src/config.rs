//! Configuration for circuit breakers.

use std::sync::Arc;
use std::time::Duration;

use crate::breaker::CircuitBreaker;
use crate::time::{SystemTimeSource, TimeSource};

/// Qualifying failures tolerated before the circuit trips.
///
/// A single qualifying failure opens the circuit.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 1;

/// How long the circuit stays open before admitting a recovery probe.
pub const DEFAULT_OPEN_WINDOW: Duration = Duration::from_secs(20);

/// Builder for creating circuit breakers with custom configurations.
///
/// Defaults match the system policy: threshold
/// [`DEFAULT_FAILURE_THRESHOLD`], open window [`DEFAULT_OPEN_WINDOW`], and
/// the real system clock. Tests usually swap in a
/// [`FixedTimeSource`](crate::time::FixedTimeSource) so the open window can
/// be crossed without sleeping.
pub struct BreakerBuilder {
    failure_threshold: u32,
    open_window: Duration,
    time: Arc<dyn TimeSource>,
}

impl Default for BreakerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BreakerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            open_window: DEFAULT_OPEN_WINDOW,
            time: Arc::new(SystemTimeSource),
        }
    }

    /// Sets the number of qualifying failures that trip the circuit.
    ///
    /// Clamped to at least 1.
    pub fn failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold.max(1);
        self
    }

    /// Sets how long the circuit stays open before allowing a probe.
    pub fn open_window(mut self, window: Duration) -> Self {
        self.open_window = window;
        self
    }

    /// Sets the time source consulted for the open-window check.
    pub fn time_source(mut self, time: Arc<dyn TimeSource>) -> Self {
        self.time = time;
        self
    }

    /// Builds a new circuit breaker with the configured settings.
    ///
    /// A window too large for the underlying representation saturates, so
    /// the circuit effectively never re-admits.
    pub fn build(self) -> CircuitBreaker {
        let open_window =
            chrono::Duration::from_std(self.open_window).unwrap_or(chrono::Duration::MAX);

        CircuitBreaker::with_config(self.failure_threshold, open_window, self.time)
    }
}
