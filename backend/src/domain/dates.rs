//! Day-granular date handling.
//!
//! Drive dates and birth dates are day-granular throughout the system.
//! Input is accepted as `YYYY-MM-DD` or full RFC 3339 and normalized to
//! the former, so "same calendar day" is plain equality downstream.

use chrono::{DateTime, NaiveDate, Utc};

/// Parse a date, accepting `YYYY-MM-DD` or RFC 3339 input
pub fn parse_day(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(input)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Render a date in the canonical `YYYY-MM-DD` form
pub fn format_day(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Today's calendar day in UTC
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
