//! Web layer for the bus tracker.
//!
//! Exposes lines, stop arrivals and live arrivals over HTTP, and accepts
//! foreground/background reports from the host shell.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, HostLineCache, HostSchedule};
