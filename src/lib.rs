//! # support-clock
//!
//! Business-hours evaluation paired with a fault-tolerant client for asking
//! a remote service the same question, built so the caller always gets an
//! answer even when that service is slow, failing, or gone.
//!
//! The crate has two halves:
//!
//! - **The clock.** [`BusinessClock`] decides whether the business is open
//!   (weekdays 09:00 to 17:00, closed Saturday and Sunday) and computes the
//!   next opening instant. It is a pure function of a timestamp supplied by
//!   an injected [`TimeSource`], so it is fully deterministic under test.
//! - **The resilient client.** [`ClockApiClient`] fetches `GET /clock` from
//!   the service that runs the same evaluation remotely. [`RetryPolicy`]
//!   retries transient faults with exponential backoff, [`CircuitBreaker`]
//!   stops hammering a dependency that just failed, and [`compose`] turns
//!   whatever came back into a [`SupportInfo`] record that never fails the
//!   caller.
//!
//! ## Circuit breaker states
//!
//! - **Closed**: normal operation, calls pass through.
//! - **Open**: calls are rejected immediately without a network attempt.
//! - **Half-Open**: after the open window elapses, a single probe call tests
//!   whether the dependency has recovered.
//!
//! ## Evaluating the clock
//!
//! ```rust
//! use chrono::NaiveDate;
//! use support_clock::BusinessClock;
//!
//! let saturday = NaiveDate::from_ymd_opt(2023, 6, 10)
//!     .and_then(|d| d.and_hms_opt(14, 30, 0))
//!     .expect("valid timestamp");
//!
//! let state = BusinessClock::evaluate(saturday);
//! assert!(!state.is_open);
//! // Closed all weekend; opens Monday at 09:00.
//! assert_eq!(
//!     state.next_open_time,
//!     NaiveDate::from_ymd_opt(2023, 6, 12).and_then(|d| d.and_hms_opt(9, 0, 0))
//! );
//! ```
//!
//! ## Fetching support availability resiliently
//!
//! ```rust,no_run
//! use support_clock::{CircuitBreaker, ClockApiClient, SupportGateway};
//!
//! # async fn demo() -> Result<(), reqwest::Error> {
//! let client = ClockApiClient::new("http://localhost:5002")?;
//! let breaker = CircuitBreaker::new();
//! let gateway = SupportGateway::new(client, breaker.clone());
//!
//! // Never fails: an unreachable dependency degrades the record instead.
//! let info = gateway.support_info().await;
//! println!("support line: {} (breaker {})", info.support_number, breaker.state());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod breaker;
mod client;
mod clock;
mod config;
mod error;
pub mod prelude;
mod retry;
mod state;
mod support;
mod time;

// Re-exports
pub use breaker::CircuitBreaker;
pub use client::{ClockApiClient, DEFAULT_REQUEST_TIMEOUT};
pub use clock::{BusinessClock, ClockState, CLOSING_HOUR, OPENING_HOUR};
pub use config::{BreakerBuilder, DEFAULT_FAILURE_THRESHOLD, DEFAULT_OPEN_WINDOW};
pub use error::{DependencyError, DependencyResult};
pub use retry::{RetryPolicy, DEFAULT_MAX_RETRIES};
pub use state::BreakerState;
pub use support::{
    compose, SupportGateway, SupportInfo, WithSupport, SUPPORT_NUMBER, SUPPORT_UNAVAILABLE,
};
pub use time::{FixedTimeSource, SystemTimeSource, TimeSource};
