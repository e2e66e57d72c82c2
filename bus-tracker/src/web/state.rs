//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::LineCache;
use crate::clock::SystemClock;
use crate::presence::Presence;
use crate::remote::BusApi;
use crate::schedule::ScheduleRepository;
use crate::store::FileLineStore;

/// Line cache as wired up by the host.
pub type HostLineCache = LineCache<BusApi, FileLineStore, SystemClock>;

/// Schedule repository as wired up by the host.
pub type HostSchedule = ScheduleRepository<BusApi, SystemClock>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Cached bus lines
    pub lines: HostLineCache,

    /// Timetables and live arrivals
    pub schedule: Arc<HostSchedule>,

    /// Foreground state reported by the host shell
    pub presence: Presence,
}

impl AppState {
    /// Create a new app state.
    pub fn new(lines: HostLineCache, schedule: HostSchedule, presence: Presence) -> Self {
        Self {
            lines,
            schedule: Arc::new(schedule),
            presence,
        }
    }
}
