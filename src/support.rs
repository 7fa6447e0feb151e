//! Support-availability records and the degraded-fallback composition.

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::warn;

use crate::breaker::CircuitBreaker;
use crate::client::ClockApiClient;
use crate::clock::ClockState;
use crate::error::{DependencyError, DependencyResult};
use crate::retry::RetryPolicy;

/// The published support line, returned whenever the dependency answers.
pub const SUPPORT_NUMBER: &str = "(800) 555-5555";

/// Sentinel support line reported while the circuit breaker is open.
pub const SUPPORT_UNAVAILABLE: &str = "Unavailable Now - Sorry";

/// Caller-facing support-availability record.
///
/// The default value is the generic degraded record: empty number, not open,
/// no opening time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportInfo {
    /// The number to call, or a sentinel when availability is unknown.
    pub support_number: String,

    /// Whether support is open right now.
    pub is_open_now: bool,

    /// When support opens next; absent while open or when unknown.
    pub opens_at: Option<NaiveDateTime>,
}

/// A resource payload annotated with support availability at the time it was
/// produced.
#[derive(Debug, Clone, Serialize)]
pub struct WithSupport<T> {
    /// The annotated payload.
    pub payload: T,

    /// Support availability alongside the payload.
    pub support: SupportInfo,
}

/// Builds the caller-facing record from the remote outcome.
///
/// Total: every failure degrades into a usable record, so the caller's own
/// request always completes. An open breaker is reported with the explicit
/// unavailable sentinel; any other failure falls back to the default record.
/// The two degraded shapes stay distinct, so a tripped circuit can be told
/// apart from a generic fetch failure.
pub fn compose(remote: DependencyResult<ClockState>) -> SupportInfo {
    match remote {
        Ok(state) => SupportInfo {
            support_number: SUPPORT_NUMBER.to_owned(),
            is_open_now: state.is_open,
            opens_at: if state.is_open {
                None
            } else {
                state.next_open_time
            },
        },
        Err(DependencyError::CircuitOpen) => {
            warn!("clock dependency short-circuited, reporting support unavailable");
            SupportInfo {
                support_number: SUPPORT_UNAVAILABLE.to_owned(),
                is_open_now: false,
                opens_at: None,
            }
        }
        Err(error) => {
            warn!(error = %error, "clock dependency unavailable, degrading support info");
            SupportInfo::default()
        }
    }
}

/// The resilient path to support availability.
///
/// Wires the pieces the way a caller is expected to: the retry policy wraps
/// the breaker, the breaker wraps the HTTP client, and [`compose`] turns the
/// outcome into a record. The breaker handle passed in stays shared, so one
/// breaker can guard several gateways talking to the same dependency.
#[derive(Clone)]
pub struct SupportGateway {
    client: ClockApiClient,
    breaker: CircuitBreaker,
    retry: RetryPolicy,
}

impl SupportGateway {
    /// Creates a gateway around an existing client and shared breaker, with
    /// the default retry policy.
    pub fn new(client: ClockApiClient, breaker: CircuitBreaker) -> Self {
        Self {
            client,
            breaker,
            retry: RetryPolicy::default(),
        }
    }

    /// Replaces the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The circuit breaker guarding this gateway's dependency.
    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Returns current support availability. Never fails: dependency
    /// problems surface as a degraded record.
    pub async fn support_info(&self) -> SupportInfo {
        let remote = self
            .retry
            .execute(|| self.breaker.call(|| self.client.fetch_clock()))
            .await;
        compose(remote)
    }

    /// Annotates `payload` with current support availability.
    pub async fn annotate<T>(&self, payload: T) -> WithSupport<T> {
        WithSupport {
            payload,
            support: self.support_info().await,
        }
    }
}
