//! Re-exports common types for convenient usage.
//!
//! # Example
//! ```rust,no_run
//! use support_clock::prelude::*;
//! ```

pub use crate::breaker::CircuitBreaker;
pub use crate::client::ClockApiClient;
pub use crate::clock::{BusinessClock, ClockState};
pub use crate::config::BreakerBuilder;
pub use crate::error::{DependencyError, DependencyResult};
pub use crate::retry::RetryPolicy;
pub use crate::state::BreakerState;
pub use crate::support::{compose, SupportGateway, SupportInfo, WithSupport};
pub use crate::time::{FixedTimeSource, SystemTimeSource, TimeSource};
