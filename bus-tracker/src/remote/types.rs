//! Bus API response DTOs.
//!
//! These types map directly to the JSON payloads of the bus API. Optional
//! fields use `Option` because the API omits them rather than sending null.

use serde::{Deserialize, Serialize};

/// Response from `GET /lines`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LinesResponse {
    pub lines: Vec<LineDto>,
}

/// A line as sent by the API.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineDto {
    pub id: u32,
    pub label: String,
    /// `#RRGGBB` or `#AARRGGBB`.
    pub color: Option<String>,
}

/// Response from `GET /stops/{stop}/arrivals`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArrivalsResponse {
    pub arrivals: Vec<ArrivalDto>,
}

/// A timetabled arrival.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrivalDto {
    pub line_id: u32,
    /// "HH:MM", local time on the requested date.
    pub time: String,
    pub direction: String,
}

/// Response from `GET /stops/{stop}/live`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LiveResponse {
    pub records: Vec<LiveRecordDto>,
}

/// A live delay record.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveRecordDto {
    pub line_id: u32,
    /// "HH:MM" timetabled time of the run.
    pub scheduled_time: String,
    pub delay_minutes: Option<i32>,
}
