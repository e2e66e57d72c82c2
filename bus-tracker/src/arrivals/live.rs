//! Live delay polling merged into static arrivals.

use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use chrono::NaiveDateTime;
use futures::Stream;
use tracing::{debug, warn};

use crate::domain::{Arrival, StopId};
use crate::presence::Presence;
use crate::remote::{RemoteError, RemoteSource};

use super::merge::{apply_cutoff, merge_live};

/// Configuration for live polling.
#[derive(Debug, Clone)]
pub struct LiveConfig {
    /// Time between polls while the user is present.
    pub poll_interval: Duration,

    /// How long a single poll may take before it is abandoned for this tick.
    pub poll_timeout: Duration,
}

impl LiveConfig {
    /// Create a new configuration.
    pub fn new(poll_interval: Duration, poll_timeout: Duration) -> Self {
        Self {
            poll_interval,
            poll_timeout,
        }
    }

    /// Set the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the per-poll timeout.
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            poll_timeout: Duration::from_secs(5),
        }
    }
}

/// Errors that end a live observation.
#[derive(Debug, thiserror::Error)]
pub enum LiveError {
    /// The live feed failed with something other than a network outage
    #[error("live delay feed failed: {0}")]
    Remote(#[from] RemoteError),
}

/// Polls live delays for a stop and merges them into its timetable.
pub struct LiveArrivalMerger<R> {
    remote: Arc<R>,
    presence: Presence,
    config: LiveConfig,
}

impl<R> Clone for LiveArrivalMerger<R> {
    fn clone(&self) -> Self {
        Self {
            remote: self.remote.clone(),
            presence: self.presence.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R: RemoteSource> LiveArrivalMerger<R> {
    /// Create a merger polling `remote` while `presence` reports the user.
    pub fn new(remote: Arc<R>, presence: Presence, config: LiveConfig) -> Self {
        Self {
            remote,
            presence,
            config,
        }
    }

    /// Observe `original` with live delays merged in.
    ///
    /// The cutoff-filtered timetable is emitted straight away, before any
    /// poll. After that the feed is polled on a presence-gated ticker and
    /// each poll emits a freshly merged list. A poll that times out or
    /// finds no network emits the cutoff-filtered timetable instead. Any
    /// other failure is emitted as an error and ends the stream.
    pub fn observe_with_live_data(
        &self,
        stop: StopId,
        original: Arc<Vec<Arrival>>,
        cutoff: NaiveDateTime,
    ) -> impl Stream<Item = Result<Vec<Arrival>, LiveError>> + Send + use<R> {
        let remote = self.remote.clone();
        let presence = self.presence.clone();
        let config = self.config.clone();

        stream! {
            let fallback = apply_cutoff(&original, cutoff);
            yield Ok(fallback.clone());

            let mut ticker = presence.ticker(config.poll_interval);
            while ticker.tick().await.is_some() {
                let poll = tokio::time::timeout(config.poll_timeout, remote.fetch_live_delays(&stop));

                match poll.await {
                    Ok(Ok(records)) => {
                        debug!(stop = %stop, records = records.len(), "Merging live delays");
                        yield Ok(merge_live(&original, &records, cutoff));
                    }
                    Ok(Err(e)) if e.is_no_network() => {
                        debug!(stop = %stop, error = %e, "No network for live delays, showing timetable");
                        yield Ok(fallback.clone());
                    }
                    Ok(Err(e)) => {
                        warn!(stop = %stop, error = %e, "Live delay poll failed");
                        yield Err(LiveError::from(e));
                        return;
                    }
                    Err(_) => {
                        debug!(stop = %stop, timeout = ?config.poll_timeout, "Live delay poll timed out");
                        yield Ok(fallback.clone());
                    }
                }
            }
        }
    }
}
