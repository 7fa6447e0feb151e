//! Business-hours evaluation.

use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::time::TimeSource;

/// Hour of day at which the business opens, local time.
pub const OPENING_HOUR: u32 = 9;

/// Hour of day at which the business closes, local time.
///
/// The closing instant itself is already closed: 16:59:59 is open,
/// 17:00:00 is not.
pub const CLOSING_HOUR: u32 = 17;

/// Snapshot of whether the business is open, as served by `GET /clock`.
///
/// `next_open_time` is `None` exactly when the business is open. The
/// constructors maintain that invariant; a fresh value is produced on every
/// evaluation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockState {
    /// Whether the business is open at the evaluated instant.
    pub is_open: bool,

    /// The next opening instant, present only while closed.
    pub next_open_time: Option<NaiveDateTime>,
}

impl ClockState {
    /// State for an open business.
    pub fn open() -> Self {
        Self {
            is_open: true,
            next_open_time: None,
        }
    }

    /// State for a closed business that opens again at `next_open`.
    pub fn closed_until(next_open: NaiveDateTime) -> Self {
        Self {
            is_open: false,
            next_open_time: Some(next_open),
        }
    }
}

/// Decides whether the business is currently open and when it opens next.
///
/// Hours are fixed: weekdays from 09:00 up to (not including) 17:00, closed
/// all day Saturday and Sunday. The evaluation itself is a pure function of
/// the timestamp; the injected [`TimeSource`] only supplies that timestamp.
#[derive(Clone)]
pub struct BusinessClock {
    time: Arc<dyn TimeSource>,
}

impl BusinessClock {
    /// Creates a clock that evaluates instants supplied by `time`.
    pub fn new(time: Arc<dyn TimeSource>) -> Self {
        Self { time }
    }

    /// Evaluates the current instant from the injected time source.
    pub fn current(&self) -> ClockState {
        Self::evaluate(self.time.now())
    }

    /// Evaluates an arbitrary instant.
    ///
    /// When closed, the next opening is found by advancing whole days from
    /// `now` (two from Saturday, one from Sunday or any closed weekday hour)
    /// and pinning the result to 09:00:00. A weekday evaluated before opening
    /// therefore reports the *next* day's opening, not the same day's.
    pub fn evaluate(now: NaiveDateTime) -> ClockState {
        let advance_days = match now.weekday() {
            Weekday::Sat => 2,
            Weekday::Sun => 1,
            _ => {
                let hour = now.hour();
                if hour >= OPENING_HOUR && hour < CLOSING_HOUR {
                    return ClockState::open();
                }
                1
            }
        };

        let next_open = (now + Duration::days(advance_days)).date();
        ClockState::closed_until(opening_on(next_open))
    }
}

/// 09:00:00 on the given date.
fn opening_on(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::hours(i64::from(OPENING_HOUR))
}
