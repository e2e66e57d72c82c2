//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::cache::LinesResource;
use crate::domain::{Arrival, Line, StopId, format_time_of_day};

/// A bus line.
#[derive(Debug, Serialize)]
pub struct LineResult {
    pub id: u32,

    /// Display label (e.g., "2", "N7")
    pub label: String,

    /// Line colour as `#AARRGGBB`
    pub color: Option<String>,
}

impl LineResult {
    pub fn from_line(line: &Line) -> Self {
        Self {
            id: line.id.0,
            label: line.label.clone(),
            color: line.color.map(|c| c.to_string()),
        }
    }
}

/// Refresh state of the line list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinesStatus {
    Progress,
    Success,
    Error,
}

/// Response for the line list.
///
/// Lines are always present; when the last refresh failed they are the
/// stale cached lines and `error` says why.
#[derive(Debug, Serialize)]
pub struct LineListResponse {
    pub status: LinesStatus,
    pub error: Option<String>,
    pub lines: Vec<LineResult>,
}

impl LineListResponse {
    pub fn from_resource(resource: &LinesResource) -> Self {
        let status = if resource.is_progress() {
            LinesStatus::Progress
        } else if resource.is_success() {
            LinesStatus::Success
        } else {
            LinesStatus::Error
        };

        Self {
            status,
            error: resource.error().map(|e| e.to_string()),
            lines: resource.data().iter().map(LineResult::from_line).collect(),
        }
    }
}

/// An arrival at a stop.
#[derive(Debug, Serialize)]
pub struct ArrivalResult {
    pub line_id: u32,
    pub line_label: String,
    pub line_color: Option<String>,

    /// Where the bus is heading
    pub direction: String,

    /// Timetabled time (HH:MM)
    pub scheduled_time: String,

    /// Expected time including any live delay (HH:MM)
    pub arrival_time: String,

    /// Live delay in minutes, when the live feed reported one
    pub live_delay_minutes: Option<i32>,
}

impl ArrivalResult {
    pub fn from_arrival(arrival: &Arrival) -> Self {
        Self {
            line_id: arrival.line.id.0,
            line_label: arrival.line.label.clone(),
            line_color: arrival.line.color.map(|c| c.to_string()),
            direction: arrival.direction.clone(),
            scheduled_time: format_time_of_day(arrival.scheduled_time_of_day()),
            arrival_time: format_time_of_day(arrival.arrival_time().time()),
            live_delay_minutes: arrival.live_delay_minutes,
        }
    }
}

/// Arrivals at one stop.
#[derive(Debug, Serialize)]
pub struct StopArrivalsResponse {
    pub stop_id: String,
    pub arrivals: Vec<ArrivalResult>,
}

impl StopArrivalsResponse {
    pub fn new(stop: &StopId, arrivals: &[Arrival]) -> Self {
        Self {
            stop_id: stop.to_string(),
            arrivals: arrivals.iter().map(ArrivalResult::from_arrival).collect(),
        }
    }
}

/// Foreground/background report from the host shell.
#[derive(Debug, Deserialize)]
pub struct PresenceRequest {
    pub present: bool,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
