//! Conversion from bus API DTOs to domain types.
//!
//! Single malformed entries are logged and skipped rather than failing the
//! whole response: one bad row should not hide a stop's entire timetable.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::warn;

use crate::domain::{
    Arrival, Line, LineColor, LineId, LiveDelayRecord, parse_time_of_day, parse_time_on,
};

use super::types::{ArrivalDto, LineDto, LiveRecordDto};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// Failed to parse a time string
    #[error("invalid time: {0}")]
    InvalidTime(String),

    /// Arrival refers to a line that the API did not list
    #[error("unknown line id: {0}")]
    UnknownLine(u32),
}

/// Convert a line DTO.
///
/// An unparseable colour is dropped, the line itself is kept.
pub fn convert_line(dto: &LineDto) -> Line {
    let color = dto.color.as_deref().and_then(|raw| match LineColor::parse_hex(raw) {
        Ok(color) => Some(color),
        Err(e) => {
            warn!(line = dto.id, color = raw, error = %e, "Ignoring invalid line colour");
            None
        }
    });

    Line::new(LineId(dto.id), dto.label.clone(), color)
}

/// Convert all lines from a `/lines` response.
pub fn convert_lines(dtos: &[LineDto]) -> Vec<Line> {
    dtos.iter().map(convert_line).collect()
}

/// Convert a single timetabled arrival.
pub fn convert_arrival(
    dto: &ArrivalDto,
    lines: &HashMap<LineId, Line>,
    date: NaiveDate,
) -> Result<Arrival, ConversionError> {
    let line = lines
        .get(&LineId(dto.line_id))
        .cloned()
        .ok_or(ConversionError::UnknownLine(dto.line_id))?;

    let scheduled =
        parse_time_on(&dto.time, date).map_err(|_| ConversionError::InvalidTime(dto.time.clone()))?;

    Ok(Arrival::new(line, scheduled, dto.direction.clone()))
}

/// Convert a stop's timetable, skipping malformed rows.
pub fn convert_arrivals(dtos: &[ArrivalDto], lines: &[Line], date: NaiveDate) -> Vec<Arrival> {
    let by_id: HashMap<LineId, Line> = lines.iter().map(|l| (l.id, l.clone())).collect();

    dtos.iter()
        .filter_map(|dto| match convert_arrival(dto, &by_id, date) {
            Ok(arrival) => Some(arrival),
            Err(e) => {
                warn!(line = dto.line_id, time = %dto.time, error = %e, "Skipping arrival");
                None
            }
        })
        .collect()
}

/// Convert a single live delay record.
pub fn convert_live_record(dto: &LiveRecordDto) -> Result<LiveDelayRecord, ConversionError> {
    let scheduled_time = parse_time_of_day(&dto.scheduled_time)
        .map_err(|_| ConversionError::InvalidTime(dto.scheduled_time.clone()))?;

    Ok(LiveDelayRecord::new(
        LineId(dto.line_id),
        scheduled_time,
        dto.delay_minutes,
    ))
}

/// Convert a live feed response, skipping malformed records.
pub fn convert_live_records(dtos: &[LiveRecordDto]) -> Vec<LiveDelayRecord> {
    dtos.iter()
        .filter_map(|dto| match convert_live_record(dto) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(line = dto.line_id, error = %e, "Skipping live record");
                None
            }
        })
        .collect()
}
