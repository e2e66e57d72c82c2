//! Live delay records from the real-time feed.

use chrono::NaiveTime;

use super::line::LineId;

/// A single point of live data for a stop.
///
/// The feed identifies a run by line and timetabled time of day; it only
/// reports same-day runs, so no date is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveDelayRecord {
    pub line_id: LineId,
    pub scheduled_time: NaiveTime,
    /// Minutes late (negative when early). `None` when the feed knows about
    /// the run but has no estimate.
    pub delay_minutes: Option<i32>,
}

impl LiveDelayRecord {
    /// Create a new record.
    pub fn new(line_id: LineId, scheduled_time: NaiveTime, delay_minutes: Option<i32>) -> Self {
        Self {
            line_id,
            scheduled_time,
            delay_minutes,
        }
    }
}
