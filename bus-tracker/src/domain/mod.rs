//! Domain types for the bus tracker.
//!
//! All types enforce their invariants at construction time, so code that
//! receives these types can trust their validity.

mod arrival;
mod line;
mod live;
mod stop;
mod time;

pub use arrival::Arrival;
pub use line::{InvalidLineColor, Line, LineColor, LineId};
pub use live::LiveDelayRecord;
pub use stop::{InvalidStopId, StopId};
pub use time::{TimeError, format_time_of_day, parse_time_of_day, parse_time_on};
