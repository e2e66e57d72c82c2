//! Scheduled arrivals at a stop.

use chrono::{Duration, NaiveDateTime, NaiveTime};

use super::line::{Line, LineId};

/// An arrival of a bus line at a stop.
///
/// `scheduled_time` is always the timetabled time. When live data has been
/// merged in, `live_delay_minutes` carries the reported delay and
/// [`Arrival::arrival_time`] returns the adjusted time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrival {
    pub line: Line,
    pub scheduled_time: NaiveDateTime,
    pub direction: String,
    pub live_delay_minutes: Option<i32>,
}

impl Arrival {
    /// Create an arrival without live data.
    pub fn new(line: Line, scheduled_time: NaiveDateTime, direction: impl Into<String>) -> Self {
        Self {
            line,
            scheduled_time,
            direction: direction.into(),
            live_delay_minutes: None,
        }
    }

    /// The effective arrival time, including any live delay.
    pub fn arrival_time(&self) -> NaiveDateTime {
        match self.live_delay_minutes {
            Some(delay) => self.scheduled_time + Duration::minutes(i64::from(delay)),
            None => self.scheduled_time,
        }
    }

    /// The timetabled time of day, ignoring the date.
    pub fn scheduled_time_of_day(&self) -> NaiveTime {
        self.scheduled_time.time()
    }

    /// Returns a copy carrying the given live delay.
    pub fn with_live_delay(&self, delay_minutes: i32) -> Self {
        Self {
            live_delay_minutes: Some(delay_minutes),
            ..self.clone()
        }
    }

    /// Shorthand for the line id.
    pub fn line_id(&self) -> LineId {
        self.line.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn line(id: u32) -> Line {
        Line::new(LineId(id), id.to_string(), None)
    }

    #[test]
    fn arrival_time_without_delay() {
        let arrival = Arrival::new(line(2), at(10, 20), "Centre");
        assert_eq!(arrival.arrival_time(), at(10, 20));
    }

    #[test]
    fn arrival_time_with_delay() {
        let late = Arrival::new(line(2), at(10, 20), "Centre").with_live_delay(4);
        assert_eq!(late.arrival_time(), at(10, 24));

        let early = Arrival::new(line(6), at(11, 0), "Harbour").with_live_delay(-2);
        assert_eq!(early.arrival_time(), at(10, 58));
    }

    #[test]
    fn delay_crosses_midnight() {
        let arrival = Arrival::new(line(2), at(23, 55), "Depot").with_live_delay(10);
        let expected = NaiveDate::from_ymd_opt(2024, 3, 16)
            .unwrap()
            .and_hms_opt(0, 5, 0)
            .unwrap();
        assert_eq!(arrival.arrival_time(), expected);
    }

    #[test]
    fn live_delay_changes_identity() {
        let original = Arrival::new(line(2), at(10, 20), "Centre");
        let delayed = original.with_live_delay(7);

        assert_eq!(delayed.line_id(), original.line_id());
        assert_eq!(delayed.scheduled_time, original.scheduled_time);
        assert_ne!(original, delayed);
    }
}
