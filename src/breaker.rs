//! Core circuit breaker implementation.

use std::future::Future;
use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::config::BreakerBuilder;
use crate::error::{DependencyError, DependencyResult};
use crate::state::BreakerState;
use crate::time::TimeSource;

/// Mutable portion of the breaker.
///
/// Every read-check-transition runs with the mutex held, so two concurrent
/// callers can never act on a stale state. The lock is released before the
/// wrapped call is dispatched and reacquired to record its outcome.
struct BreakerInner {
    state: BreakerState,
    failure_count: u32,
    opened_at: Option<NaiveDateTime>,
    probe_in_flight: bool,
}

/// State shared by every handle to the same breaker.
struct BreakerShared {
    inner: Mutex<BreakerInner>,
    failure_threshold: u32,
    open_window: Duration,
    time: Arc<dyn TimeSource>,
}

/// How a call was admitted, so its outcome is recorded against the right
/// transition rules.
enum Admission {
    /// Admitted through a closed circuit.
    Regular,
    /// Admitted as the single half-open recovery probe.
    Probe,
}

/// Releases the probe reservation if the wrapped call never reports back,
/// e.g. when the caller drops the future mid-flight or the operation panics.
/// Without this a cancelled probe would leave the circuit rejecting calls
/// forever.
struct ProbeReservation<'a> {
    shared: &'a BreakerShared,
    armed: bool,
}

impl ProbeReservation<'_> {
    fn defuse(&mut self) {
        self.armed = false;
    }
}

impl Drop for ProbeReservation<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.shared.inner.lock().probe_in_flight = false;
        }
    }
}

/// A circuit breaker that wraps calls to one remote dependency.
///
/// One breaker instance exists per logical dependency and is shared by all
/// concurrent callers for the lifetime of the process. Handles are cheap to
/// clone; every clone observes and mutates the same underlying state.
///
/// The state machine:
///
/// - `Closed`: calls pass through. A qualifying failure
///   ([`DependencyError::trips_breaker`]) raises the failure count; reaching
///   the threshold trips the circuit open and stamps the opening time.
/// - `Open`: calls are rejected with [`DependencyError::CircuitOpen`] without
///   dispatching anything. No timer runs; the open window is checked lazily
///   on the next call attempt against the injected [`TimeSource`].
/// - `HalfOpen`: entered once the open window has elapsed. Exactly one probe
///   call is admitted; everyone else keeps getting `CircuitOpen`. A
///   successful probe closes the circuit and clears the failure count; a
///   qualifying failure re-opens it with a fresh opening time.
///
/// Non-qualifying outcomes (a 404, any other 4xx) record as successes: the
/// dependency answered, so the circuit has no reason to stay open.
#[derive(Clone)]
pub struct CircuitBreaker {
    shared: Arc<BreakerShared>,
}

impl CircuitBreaker {
    /// Creates a breaker with the system policy defaults and the real clock.
    pub fn new() -> Self {
        BreakerBuilder::new().build()
    }

    /// Creates a builder for customizing a circuit breaker.
    pub fn builder() -> BreakerBuilder {
        BreakerBuilder::new()
    }

    pub(crate) fn with_config(
        failure_threshold: u32,
        open_window: Duration,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        let inner = BreakerInner {
            state: BreakerState::Closed,
            failure_count: 0,
            opened_at: None,
            probe_in_flight: false,
        };

        Self {
            shared: Arc::new(BreakerShared {
                inner: Mutex::new(inner),
                failure_threshold,
                open_window,
                time,
            }),
        }
    }

    /// Gets the current state of the circuit breaker.
    ///
    /// Reported as of the last transition: an elapsed open window shows as
    /// `Open` until a call attempt performs the lazy half-open check.
    pub fn state(&self) -> BreakerState {
        self.shared.inner.lock().state
    }

    /// Gets the number of qualifying failures recorded since the circuit
    /// last closed.
    pub fn failure_count(&self) -> u32 {
        self.shared.inner.lock().failure_count
    }

    /// Executes an async operation wrapped by the circuit breaker.
    ///
    /// Consults the breaker before dispatching and records the outcome after.
    /// When the circuit is open the operation is never constructed into a
    /// running call and [`DependencyError::CircuitOpen`] is returned instead.
    pub async fn call<T, F, Fut>(&self, operation: F) -> DependencyResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = DependencyResult<T>>,
    {
        let admission = self.admit()?;
        let mut reservation = ProbeReservation {
            shared: self.shared.as_ref(),
            armed: matches!(admission, Admission::Probe),
        };
        let result = operation().await;
        reservation.defuse();
        self.record(&admission, &result);
        result
    }

    /// Decides whether a call may proceed, applying the lazy open-window
    /// check and the single-probe rule.
    fn admit(&self) -> Result<Admission, DependencyError> {
        let mut inner = self.shared.inner.lock();
        match inner.state {
            BreakerState::Closed => Ok(Admission::Regular),
            BreakerState::Open => {
                let elapsed = inner.opened_at.is_some_and(|opened_at| {
                    self.shared
                        .time
                        .now()
                        .signed_duration_since(opened_at)
                        >= self.shared.open_window
                });
                if elapsed {
                    inner.state = BreakerState::HalfOpen;
                    inner.probe_in_flight = true;
                    debug!(state = %BreakerState::HalfOpen, "open window elapsed, admitting probe");
                    Ok(Admission::Probe)
                } else {
                    debug!("circuit open, rejecting call");
                    Err(DependencyError::CircuitOpen)
                }
            }
            BreakerState::HalfOpen => {
                if inner.probe_in_flight {
                    debug!("probe already in flight, rejecting call");
                    Err(DependencyError::CircuitOpen)
                } else {
                    inner.probe_in_flight = true;
                    Ok(Admission::Probe)
                }
            }
        }
    }

    /// Records the outcome of an admitted call and applies transitions.
    fn record<T>(&self, admission: &Admission, result: &DependencyResult<T>) {
        let failed = matches!(result, Err(e) if e.trips_breaker());
        let mut inner = self.shared.inner.lock();

        match admission {
            Admission::Probe => {
                inner.probe_in_flight = false;
                if failed {
                    inner.state = BreakerState::Open;
                    inner.opened_at = Some(self.shared.time.now());
                    warn!("recovery probe failed, circuit re-opened");
                } else {
                    inner.state = BreakerState::Closed;
                    inner.failure_count = 0;
                    inner.opened_at = None;
                    debug!("recovery probe succeeded, circuit closed");
                }
            }
            Admission::Regular => {
                if failed {
                    inner.failure_count += 1;
                    if inner.state == BreakerState::Closed
                        && inner.failure_count >= self.shared.failure_threshold
                    {
                        inner.state = BreakerState::Open;
                        inner.opened_at = Some(self.shared.time.now());
                        warn!(
                            failures = inner.failure_count,
                            "failure threshold reached, circuit tripped open"
                        );
                    }
                }
                // A success through a closed circuit changes nothing.
            }
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}
