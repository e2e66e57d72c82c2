//! Pure cutoff and live-merge rules.

use std::collections::HashMap;

use chrono::{NaiveDateTime, NaiveTime};

use crate::domain::{Arrival, LineId, LiveDelayRecord};

/// Drop arrivals timetabled before `cutoff`.
pub fn apply_cutoff(arrivals: &[Arrival], cutoff: NaiveDateTime) -> Vec<Arrival> {
    arrivals
        .iter()
        .filter(|a| a.scheduled_time >= cutoff)
        .cloned()
        .collect()
}

/// Merge live delay records into a static arrival list.
///
/// An arrival matches a record when the line and the timetabled time of
/// day are equal. Matched arrivals are always kept, shifted by the
/// record's delay when it has one. Unmatched arrivals are kept only from
/// `cutoff` onwards. The result is sorted by effective arrival time;
/// arrivals with equal times keep their original order.
pub fn merge_live(
    original: &[Arrival],
    records: &[LiveDelayRecord],
    cutoff: NaiveDateTime,
) -> Vec<Arrival> {
    let mut by_run: HashMap<(LineId, NaiveTime), Option<i32>> = HashMap::with_capacity(records.len());
    for record in records {
        // First record wins when the feed repeats a run.
        by_run
            .entry((record.line_id, record.scheduled_time))
            .or_insert(record.delay_minutes);
    }

    let mut merged: Vec<Arrival> = original
        .iter()
        .filter_map(|arrival| {
            match by_run.get(&(arrival.line_id(), arrival.scheduled_time_of_day())) {
                Some(Some(delay)) => Some(arrival.with_live_delay(*delay)),
                Some(None) => Some(arrival.clone()),
                None if arrival.scheduled_time >= cutoff => Some(arrival.clone()),
                None => None,
            }
        })
        .collect();

    merged.sort_by_key(Arrival::arrival_time);
    merged
}
