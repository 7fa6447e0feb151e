//! Error types for calls to the remote clock dependency.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

use reqwest::StatusCode;

/// Result type for dependency calls.
pub type DependencyResult<T> = Result<T, DependencyError>;

/// Failure of a call to the remote clock dependency.
///
/// Classification drives the resilience pipeline: [`is_transient`] decides
/// whether the retry policy may try again, and [`trips_breaker`] decides
/// whether the failure counts against the circuit breaker's threshold.
///
/// [`is_transient`]: DependencyError::is_transient
/// [`trips_breaker`]: DependencyError::trips_breaker
#[derive(Debug)]
pub enum DependencyError {
    /// Connection-level failure: refused, timed out, or interrupted while
    /// transferring the body.
    Network(reqwest::Error),

    /// The dependency answered with a failing status: any 5xx, or 408.
    Server {
        /// The status the dependency returned.
        status: StatusCode,
    },

    /// The clock endpoint answered 404. Retried like a transient fault under
    /// this system's policy.
    NotFound,

    /// A non-retryable client error (4xx other than 404 and 408).
    Client {
        /// The status the dependency returned.
        status: StatusCode,
    },

    /// The circuit breaker short-circuited the call; nothing was dispatched.
    CircuitOpen,
}

impl DependencyError {
    /// Classifies a non-success HTTP status.
    pub(crate) fn from_status(status: StatusCode) -> Self {
        if status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT {
            DependencyError::Server { status }
        } else if status == StatusCode::NOT_FOUND {
            DependencyError::NotFound
        } else {
            DependencyError::Client { status }
        }
    }

    /// Whether the retry policy is allowed to attempt this call again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DependencyError::Network(_) | DependencyError::Server { .. } | DependencyError::NotFound
        )
    }

    /// Whether this failure counts against the breaker's failure threshold.
    ///
    /// Only connection faults and server-side failures signal an unhealthy
    /// dependency. A 404 is retried, but it proves the service is alive and
    /// answering, so it reports to the breaker as a success.
    pub fn trips_breaker(&self) -> bool {
        matches!(
            self,
            DependencyError::Network(_) | DependencyError::Server { .. }
        )
    }
}

impl Display for DependencyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DependencyError::Network(e) => {
                write!(f, "Network failure reaching the clock endpoint: {}", e)
            }
            DependencyError::Server { status } => {
                write!(f, "Clock endpoint failed with status {}", status)
            }
            DependencyError::NotFound => write!(f, "Clock endpoint answered 404"),
            DependencyError::Client { status } => {
                write!(f, "Clock endpoint rejected the request with status {}", status)
            }
            DependencyError::CircuitOpen => write!(f, "Circuit breaker is open"),
        }
    }
}

impl Error for DependencyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DependencyError::Network(e) => Some(e),
            _ => None,
        }
    }
}
