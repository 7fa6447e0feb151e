//! HTTP adapter for the remote clock endpoint.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::clock::ClockState;
use crate::error::{DependencyError, DependencyResult};

/// Network timeout applied to each individual request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the remote business-clock endpoint.
///
/// Issues `GET {base}/clock` and maps every failure into
/// [`DependencyError`]. The client performs no retries and holds no breaker
/// state of its own; compose it with [`RetryPolicy`](crate::RetryPolicy) and
/// [`CircuitBreaker`](crate::CircuitBreaker), or use
/// [`SupportGateway`](crate::SupportGateway) which wires all three.
#[derive(Debug, Clone)]
pub struct ClockApiClient {
    http: Client,
    clock_url: String,
}

impl ClockApiClient {
    /// Creates a client for the dependency at `base_url` with its own HTTP
    /// client and the default request timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(DEFAULT_REQUEST_TIMEOUT).build()?;
        Ok(Self::with_http_client(http, base_url))
    }

    /// Creates a client reusing a caller-tuned HTTP client.
    pub fn with_http_client(http: Client, base_url: impl Into<String>) -> Self {
        let base = base_url.into();
        let clock_url = format!("{}/clock", base.trim_end_matches('/'));
        Self { http, clock_url }
    }

    /// Fetches the dependency's view of the business clock.
    ///
    /// Non-success statuses classify without reading the body; an unreadable
    /// or undecodable success body counts as a network-level fault.
    pub async fn fetch_clock(&self) -> DependencyResult<ClockState> {
        debug!(url = %self.clock_url, "requesting remote clock state");

        let response = self
            .http
            .get(&self.clock_url)
            .send()
            .await
            .map_err(DependencyError::Network)?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, "clock endpoint returned a failure status");
            return Err(DependencyError::from_status(status));
        }

        response
            .json::<ClockState>()
            .await
            .map_err(DependencyError::Network)
    }
}
