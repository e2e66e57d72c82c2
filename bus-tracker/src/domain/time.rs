//! Time-of-day handling for timetable and live feed payloads.
//!
//! Both the timetable and the live feed send times as "HH:MM" strings in
//! local time. Dates are supplied separately by the caller.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Parse a time of day from "HH:MM" format.
///
/// # Examples
///
/// ```
/// use bus_tracker::domain::parse_time_of_day;
///
/// assert!(parse_time_of_day("00:00").is_ok());
/// assert!(parse_time_of_day("23:59").is_ok());
///
/// assert!(parse_time_of_day("1430").is_err());
/// assert!(parse_time_of_day("14:3").is_err());
/// assert!(parse_time_of_day("25:00").is_err());
/// ```
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime, TimeError> {
    if s.len() != 5 {
        return Err(TimeError::new("expected HH:MM format"));
    }

    let bytes = s.as_bytes();

    if bytes[2] != b':' {
        return Err(TimeError::new("expected colon at position 2"));
    }

    let hour =
        parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
    if hour > 23 {
        return Err(TimeError::new("hour must be 0-23"));
    }

    let minute =
        parse_two_digits(&bytes[3..5]).ok_or_else(|| TimeError::new("invalid minute digits"))?;
    if minute > 59 {
        return Err(TimeError::new("minute must be 0-59"));
    }

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| TimeError::new("invalid time"))
}

/// Parse an "HH:MM" time and attach it to a service date.
pub fn parse_time_on(s: &str, date: NaiveDate) -> Result<NaiveDateTime, TimeError> {
    parse_time_of_day(s).map(|time| date.and_time(time))
}

/// Format a time of day as "HH:MM".
pub fn format_time_of_day(time: NaiveTime) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}
