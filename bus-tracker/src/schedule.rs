//! Static arrivals per stop, cached, with live observation on top.
//!
//! Timetables change at most daily, so each `(stop, date)` board is cached
//! for a few minutes to absorb repeated requests from the host. Live delays
//! are never cached; each observation polls them through the
//! [`LiveArrivalMerger`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use futures::Stream;
use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::arrivals::{LiveArrivalMerger, LiveError, apply_cutoff};
use crate::clock::Clock;
use crate::domain::{Arrival, StopId};
use crate::remote::{RemoteError, RemoteSource};

/// Cache key for a stop's timetable on a service date.
type ScheduleKey = (StopId, NaiveDate);

/// Cached timetable, sorted by scheduled time.
type ScheduleEntry = Arc<Vec<Arrival>>;

/// Configuration for the schedule repository.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// TTL for cached timetables.
    pub ttl: Duration,

    /// Maximum number of cached timetables.
    pub max_capacity: u64,

    /// How far before now arrivals are still shown (minutes).
    /// Zero hides everything timetabled before the current time.
    pub cutoff_grace_mins: i64,
}

impl ScheduleConfig {
    /// Set the cache TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the cutoff grace period in minutes.
    pub fn with_cutoff_grace_mins(mut self, mins: i64) -> Self {
        self.cutoff_grace_mins = mins;
        self
    }

    /// Returns the cutoff grace period as a Duration.
    pub fn cutoff_grace(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.cutoff_grace_mins)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(10 * 60),
            max_capacity: 256,
            cutoff_grace_mins: 0,
        }
    }
}

/// Timetables and live arrivals for stops.
pub struct ScheduleRepository<R, C> {
    remote: Arc<R>,
    clock: Arc<C>,
    merger: LiveArrivalMerger<R>,
    boards: MokaCache<ScheduleKey, ScheduleEntry>,
    cutoff_grace: chrono::Duration,
}

impl<R, C> ScheduleRepository<R, C>
where
    R: RemoteSource,
    C: Clock,
{
    /// Create a new repository.
    pub fn new(
        remote: Arc<R>,
        clock: Arc<C>,
        merger: LiveArrivalMerger<R>,
        config: &ScheduleConfig,
    ) -> Self {
        let boards = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            remote,
            clock,
            merger,
            boards,
            cutoff_grace: config.cutoff_grace(),
        }
    }

    /// Timetabled arrivals at `stop` on `date`, using the cache if available.
    pub async fn arrivals(
        &self,
        stop: &StopId,
        date: NaiveDate,
    ) -> Result<Arc<Vec<Arrival>>, RemoteError> {
        let key = (stop.clone(), date);

        if let Some(cached) = self.boards.get(&key).await {
            return Ok(cached);
        }

        let mut arrivals = self.remote.fetch_arrivals(stop, date).await?;
        arrivals.sort_by_key(|a| a.scheduled_time);
        debug!(stop = %stop, %date, count = arrivals.len(), "Fetched timetable");

        let entry = Arc::new(arrivals);
        self.boards.insert(key, entry.clone()).await;

        Ok(entry)
    }

    /// The earliest timetabled time still shown.
    pub fn cutoff(&self) -> NaiveDateTime {
        self.clock.now_local() - self.cutoff_grace
    }

    /// Today's remaining timetabled arrivals at `stop`, without live data.
    pub async fn upcoming(&self, stop: &StopId) -> Result<Vec<Arrival>, RemoteError> {
        let now = self.clock.now_local();
        let cutoff = now - self.cutoff_grace;
        let today = self.arrivals(stop, now.date()).await?;
        Ok(apply_cutoff(&today, cutoff))
    }

    /// Observe today's arrivals at `stop` with live delays merged in.
    ///
    /// Fails up front if the timetable cannot be loaded; afterwards the
    /// stream behaves as [`LiveArrivalMerger::observe_with_live_data`].
    pub async fn observe_stop(
        &self,
        stop: StopId,
    ) -> Result<impl Stream<Item = Result<Vec<Arrival>, LiveError>> + Send + use<R, C>, RemoteError>
    {
        let now = self.clock.now_local();
        let cutoff = now - self.cutoff_grace;
        let today = self.arrivals(&stop, now.date()).await?;
        Ok(self.merger.observe_with_live_data(stop, today, cutoff))
    }
}
