use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use support_clock::{BusinessClock, SystemTimeSource};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, 0))
        .expect("valid demo timestamp")
}

fn main() {
    // Walk one week of representative instants through the schedule.
    let week = [
        ("Monday before opening", at(2023, 6, 12, 8, 30)),
        ("Monday mid-morning", at(2023, 6, 12, 10, 0)),
        ("Monday last open second", at(2023, 6, 12, 16, 59)),
        ("Monday after closing", at(2023, 6, 12, 17, 0)),
        ("Friday evening", at(2023, 6, 16, 18, 0)),
        ("Saturday", at(2023, 6, 17, 11, 0)),
        ("Sunday", at(2023, 6, 18, 11, 0)),
    ];

    for (label, now) in week {
        let state = BusinessClock::evaluate(now);
        match state.next_open_time {
            None => println!("{label:<24} {now}  ->  open"),
            Some(next) => println!("{label:<24} {now}  ->  closed, opens {next}"),
        }
    }

    // The same evaluation against the actual wall clock.
    let clock = BusinessClock::new(Arc::new(SystemTimeSource));
    let state = clock.current();
    if state.is_open {
        println!("\nThe desk is open right now.");
    } else if let Some(next) = state.next_open_time {
        println!("\nThe desk is closed right now; it opens {next}.");
    }
}
