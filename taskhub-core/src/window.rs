//! Date windows for named filter periods.
//!
//! A window is a half-open UTC interval `[start, end)`. The inclusive
//! week/month ranges of the query API are expressed as half-open intervals
//! ending at the following midnight, which covers every instant of the
//! last day. Weeks are ISO weeks: Monday 00:00 through the next Monday.
//!
//! Tasks without a due date are outside the scope of this module — the
//! query layer always includes them regardless of the active window.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// A named filter period from the `filter` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// The reference instant's calendar day.
    Today,
    /// The reference instant's ISO week (Monday start).
    Week,
    /// The reference instant's calendar month.
    Month,
}

impl Period {
    /// Parses a filter token.
    ///
    /// Unrecognized tokens return `None`, which the query layer treats as
    /// "no date filtering" rather than an error.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "today" => Some(Self::Today),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            _ => None,
        }
    }
}

/// A half-open UTC interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    /// First instant inside the window.
    pub start: DateTime<Utc>,
    /// First instant past the window.
    pub end: DateTime<Utc>,
}

impl DateWindow {
    /// Returns `true` if the instant falls inside the window.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// Computes the date window for a period relative to a reference instant.
#[must_use]
pub fn window_for(period: Period, reference: DateTime<Utc>) -> DateWindow {
    let date = reference.date_naive();
    match period {
        Period::Today => {
            let start = midnight(date);
            DateWindow {
                start,
                end: start + Duration::days(1),
            }
        }
        Period::Week => {
            let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
            let start = midnight(monday);
            DateWindow {
                start,
                end: start + Duration::days(7),
            }
        }
        Period::Month => {
            let start = midnight(first_of_month(date));
            DateWindow {
                start,
                end: midnight(first_of_next_month(date)),
            }
        }
    }
}

/// Midnight UTC at the start of the given date.
fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    // Day 1 always exists; fall back to the input to stay total.
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}
