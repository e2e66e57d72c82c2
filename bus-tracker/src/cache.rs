//! Cached set of bus lines.
//!
//! Lines change rarely, so they are kept in a [`LineStore`] and refreshed
//! from the remote at most once per cache window (48 hours by default).
//! Refreshes go through a [`SingleFlight`] coordinator: however many
//! subscribers check the cache at once, at most one remote fetch runs.
//!
//! Subscribers see a stream of [`Resource`] values combining the stored
//! lines with the refresh status. A failed refresh never discards what is
//! already stored; it is reported as an error paired with the stale lines.

use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use futures::{Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::domain::Line;
use crate::remote::{RemoteError, RemoteSource};
use crate::resource::Resource;
use crate::single_flight::SingleFlight;
use crate::store::{LineStore, StoreError};

/// Configuration for the line cache.
#[derive(Debug, Clone)]
pub struct LineCacheConfig {
    /// How long fetched lines stay fresh.
    pub cache_duration: chrono::Duration,

    /// How often the host forces a background refresh.
    pub refresh_interval: Duration,
}

impl LineCacheConfig {
    /// Set how long fetched lines stay fresh.
    pub fn with_cache_duration(mut self, duration: chrono::Duration) -> Self {
        self.cache_duration = duration;
        self
    }

    /// Set the background refresh interval.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }
}

impl Default for LineCacheConfig {
    fn default() -> Self {
        Self {
            cache_duration: chrono::Duration::hours(48),
            refresh_interval: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Why a refresh failed. Cloneable so that every waiter on a shared
/// refresh receives the same error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LineCacheError {
    /// Fetching lines from the remote failed
    #[error("failed to fetch lines: {0}")]
    Remote(Arc<RemoteError>),

    /// Reading or writing the store failed
    #[error("line store failed: {0}")]
    Store(Arc<StoreError>),
}

impl From<RemoteError> for LineCacheError {
    fn from(e: RemoteError) -> Self {
        LineCacheError::Remote(Arc::new(e))
    }
}

impl From<StoreError> for LineCacheError {
    fn from(e: StoreError) -> Self {
        LineCacheError::Store(Arc::new(e))
    }
}

/// What subscribers of [`LineCache::observe_lines`] receive.
pub type LinesResource = Resource<Arc<Vec<Line>>, LineCacheError>;

/// Refresh status of one subscription.
#[derive(Debug, Clone)]
enum RefreshStatus {
    Progress,
    Success,
    Error(LineCacheError),
}

impl RefreshStatus {
    fn with_data(&self, lines: Arc<Vec<Line>>) -> LinesResource {
        match self {
            RefreshStatus::Progress => Resource::Progress(lines),
            RefreshStatus::Success => Resource::Success(lines),
            RefreshStatus::Error(error) => Resource::Error {
                error: error.clone(),
                data: lines,
            },
        }
    }
}

type RefreshOutcome = Result<(), LineCacheError>;

struct Inner<R, S, C> {
    remote: Arc<R>,
    store: Arc<S>,
    clock: Arc<C>,
    config: LineCacheConfig,
    flight: SingleFlight<RefreshOutcome>,
}

/// Line cache backed by a [`LineStore`] and refreshed from a [`RemoteSource`].
pub struct LineCache<R, S, C> {
    inner: Arc<Inner<R, S, C>>,
}

impl<R, S, C> Clone for LineCache<R, S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<R, S, C> LineCache<R, S, C>
where
    R: RemoteSource,
    S: LineStore,
    C: Clock,
{
    /// Create a new line cache.
    pub fn new(remote: Arc<R>, store: Arc<S>, clock: Arc<C>, config: LineCacheConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                remote,
                store,
                clock,
                config,
                flight: SingleFlight::new(),
            }),
        }
    }

    /// Whether a refresh is currently running.
    pub fn is_refreshing(&self) -> bool {
        self.inner.flight.is_in_flight()
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<S> {
        &self.inner.store
    }

    /// Refresh from the remote regardless of expiry.
    ///
    /// Joins a refresh that is already running instead of starting another.
    pub async fn refresh_now(&self) -> Result<(), LineCacheError> {
        let inner = self.inner.clone();
        self.inner.flight.run(move || inner.refresh(true)).await
    }

    /// Observe the cached lines.
    ///
    /// Each subscription checks whether the cache is due for a refresh and
    /// refreshes it if so, sharing any refresh already in flight. The
    /// stream then re-emits whenever the stored lines change. It never
    /// ends on its own; drop it to unsubscribe.
    pub fn observe_lines(&self) -> impl Stream<Item = LinesResource> + Send + use<R, S, C> {
        let inner = self.inner.clone();

        stream! {
            let mut lines = inner.store.subscribe();
            let status = inner.clone().refresh_status();
            futures::pin_mut!(status);

            let mut current: Option<RefreshStatus> = None;
            let mut status_done = false;

            loop {
                tokio::select! {
                    next = status.next(), if !status_done => match next {
                        Some(s) => current = Some(s),
                        None => {
                            status_done = true;
                            continue;
                        }
                    },
                    changed = lines.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }

                if let Some(status) = &current {
                    let snapshot = lines.borrow_and_update().clone();
                    yield status.with_data(snapshot);
                }
            }
        }
    }
}

impl<R, S, C> Inner<R, S, C>
where
    R: RemoteSource,
    S: LineStore,
    C: Clock,
{
    /// Whether the cache window has elapsed since the last refresh.
    fn is_due(&self) -> Result<bool, LineCacheError> {
        let Some(last) = self.store.last_refreshed_at()? else {
            return Ok(true);
        };

        let due = match last.checked_add_signed(self.config.cache_duration) {
            Some(expiry) => self.clock.now() >= expiry,
            None => false,
        };
        Ok(due)
    }

    /// The refresh status sequence for one subscription.
    fn refresh_status(self: Arc<Self>) -> impl Stream<Item = RefreshStatus> + Send + 'static {
        stream! {
            if self.flight.is_in_flight() {
                yield RefreshStatus::Progress;
            } else {
                match self.is_due() {
                    Ok(false) => {
                        yield RefreshStatus::Success;
                        return;
                    }
                    Ok(true) => {
                        yield RefreshStatus::Progress;
                    }
                    Err(e) => {
                        yield RefreshStatus::Error(e);
                        return;
                    }
                }
            }

            let inner = self.clone();
            let outcome = self.flight.run(move || inner.refresh(false)).await;

            yield match outcome {
                Ok(()) => RefreshStatus::Success,
                Err(e) => RefreshStatus::Error(e),
            };
        }
    }

    /// Fetch and store lines. Runs inside the single-flight coordinator.
    ///
    /// Expiry is checked again here: a caller that saw a due cache may
    /// only get here after another refresh has completed.
    async fn refresh(self: Arc<Self>, force: bool) -> RefreshOutcome {
        if !force && !self.is_due()? {
            debug!("Lines already fresh, skipping refresh");
            return Ok(());
        }

        info!(force, "Refreshing lines");

        let lines = match self.remote.fetch_lines().await {
            Ok(lines) => lines,
            Err(e) => {
                warn!(error = %e, "Failed to refresh lines, keeping cached lines");
                return Err(e.into());
            }
        };

        let count = lines.len();
        let now = self.clock.now();

        self.store.replace_all_lines(lines, now)?;

        info!(count, "Refreshed lines");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::domain::LineId;
    use crate::store::{FileLineStore, MemoryLineStore};
    use crate::test_support::{FakeRemote, Failure, line};
    use chrono::{TimeZone, Utc};

    type TestCache = LineCache<FakeRemote, MemoryLineStore, ManualClock>;

    fn start() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap()
    }

    fn setup(remote: FakeRemote, store: MemoryLineStore) -> (TestCache, Arc<FakeRemote>, Arc<ManualClock>) {
        let remote = Arc::new(remote);
        let clock = Arc::new(ManualClock::new(start()));
        let cache = LineCache::new(
            remote.clone(),
            Arc::new(store),
            clock.clone(),
            LineCacheConfig::default(),
        );
        (cache, remote, clock)
    }

    /// Take items until the first one that is not `Progress`.
    async fn settle<St: Stream<Item = LinesResource>>(stream: St) -> (Vec<LinesResource>, LinesResource) {
        futures::pin_mut!(stream);
        let mut progress = Vec::new();
        loop {
            let item = stream.next().await.expect("line stream ended");
            if item.is_progress() {
                progress.push(item);
            } else {
                return (progress, item);
            }
        }
    }

    fn ids(lines: &[Line]) -> Vec<u32> {
        lines.iter().map(|l| l.id.0).collect()
    }

    #[test]
    fn default_config() {
        let config = LineCacheConfig::default();
        assert_eq!(config.cache_duration, chrono::Duration::hours(48));
        assert_eq!(config.refresh_interval, Duration::from_secs(86_400));
    }

    #[tokio::test]
    async fn first_observation_fetches_and_stores() {
        let (cache, remote, clock) = setup(
            FakeRemote::with_lines(vec![line(2), line(6)]),
            MemoryLineStore::new(),
        );

        let (progress, settled) = settle(cache.observe_lines()).await;

        assert!(!progress.is_empty());
        assert!(settled.is_success());
        assert_eq!(ids(settled.data()), vec![2, 6]);
        assert_eq!(remote.line_fetches(), 1);
        assert_eq!(cache.store().replacement_count(), 1);
        assert_eq!(cache.store().last_refreshed_at().unwrap(), Some(clock.now()));
    }

    #[tokio::test]
    async fn observations_within_window_fetch_once() {
        let (cache, remote, clock) = setup(
            FakeRemote::with_lines(vec![line(2)]),
            MemoryLineStore::new(),
        );

        settle(cache.observe_lines()).await;
        clock.advance(chrono::Duration::hours(47) + chrono::Duration::minutes(59));
        let (progress, settled) = settle(cache.observe_lines()).await;

        assert!(progress.is_empty());
        assert!(settled.is_success());
        assert_eq!(ids(settled.data()), vec![2]);
        assert_eq!(remote.line_fetches(), 1);
    }

    #[tokio::test]
    async fn observation_after_window_fetches_again() {
        let (cache, remote, clock) = setup(
            FakeRemote::with_lines(vec![line(2)]),
            MemoryLineStore::new(),
        );

        settle(cache.observe_lines()).await;
        remote.set_lines(vec![line(2), line(9)]);
        clock.advance(chrono::Duration::hours(48));

        let (_, settled) = settle(cache.observe_lines()).await;
        assert!(settled.is_success());
        assert_eq!(ids(settled.data()), vec![2, 9]);
        assert_eq!(remote.line_fetches(), 2);
        assert_eq!(cache.store().last_refreshed_at().unwrap(), Some(clock.now()));
    }

    #[tokio::test]
    async fn fresh_store_is_served_without_fetching() {
        let store = MemoryLineStore::with_lines(vec![line(4)], Some(start()));
        let (cache, remote, _clock) = setup(FakeRemote::with_lines(vec![line(2)]), store);

        let (progress, settled) = settle(cache.observe_lines()).await;

        assert!(progress.is_empty());
        assert!(settled.is_success());
        assert_eq!(ids(settled.data()), vec![4]);
        assert_eq!(remote.line_fetches(), 0);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_stale_lines() {
        let stale_at = start() - chrono::Duration::hours(49);
        let store = MemoryLineStore::with_lines(vec![line(1), line(3)], Some(stale_at));
        let remote = FakeRemote::with_lines(vec![line(2)]);
        remote.fail_lines(Some(Failure::NoNetwork));
        let (cache, remote, _clock) = setup(remote, store);

        let (progress, settled) = settle(cache.observe_lines()).await;

        assert!(progress.iter().all(|p| ids(p.data()) == vec![1, 3]));
        assert!(settled.is_error());
        assert!(matches!(settled.error(), Some(LineCacheError::Remote(e)) if e.is_no_network()));
        assert_eq!(ids(settled.data()), vec![1, 3]);
        assert_eq!(remote.line_fetches(), 1);
        assert_eq!(cache.store().replacement_count(), 0);
        assert_eq!(cache.store().last_refreshed_at().unwrap(), Some(stale_at));
    }

    #[tokio::test]
    async fn failure_is_not_retried_until_next_subscription() {
        let remote = FakeRemote::with_lines(vec![line(2)]);
        remote.fail_lines(Some(Failure::Unexpected));
        let (cache, remote, _clock) = setup(remote, MemoryLineStore::new());

        let stream = cache.observe_lines();
        futures::pin_mut!(stream);
        loop {
            let item = stream.next().await.unwrap();
            if item.is_error() {
                break;
            }
        }

        // The failed subscription stays quiet.
        let quiet = tokio::time::timeout(Duration::from_millis(50), stream.next()).await;
        assert!(quiet.is_err());
        assert_eq!(remote.line_fetches(), 1);

        remote.fail_lines(None);
        let (_, settled) = settle(cache.observe_lines()).await;
        assert!(settled.is_success());
        assert_eq!(remote.line_fetches(), 2);
    }

    #[tokio::test]
    async fn concurrent_subscribers_share_one_fetch() {
        let (remote, gate) = FakeRemote::with_lines(vec![line(2), line(6)]).gate_lines();
        let (cache, remote, _clock) = setup(remote, MemoryLineStore::new());

        let first = {
            let cache = cache.clone();
            tokio::spawn(async move { settle(cache.observe_lines()).await })
        };

        while !cache.is_refreshing() {
            tokio::task::yield_now().await;
        }

        // A late subscriber sees the refresh in progress straight away.
        let late = cache.observe_lines();
        futures::pin_mut!(late);
        let first_item = late.next().await.unwrap();
        assert!(first_item.is_progress());
        assert!(first_item.data().is_empty());

        let second = {
            let cache = cache.clone();
            tokio::spawn(async move { settle(cache.observe_lines()).await })
        };
        tokio::task::yield_now().await;

        gate.add_permits(1);

        let (_, first_settled) = first.await.unwrap();
        let (_, second_settled) = second.await.unwrap();
        let (_, late_settled) = settle(late).await;

        for settled in [&first_settled, &second_settled, &late_settled] {
            assert!(settled.is_success());
            assert_eq!(ids(settled.data()), vec![2, 6]);
        }
        assert_eq!(remote.line_fetches(), 1);
        assert_eq!(cache.store().replacement_count(), 1);
    }

    #[tokio::test]
    async fn refresh_now_ignores_expiry() {
        let store = MemoryLineStore::with_lines(vec![line(4)], Some(start()));
        let (cache, remote, _clock) = setup(FakeRemote::with_lines(vec![line(2)]), store);

        cache.refresh_now().await.unwrap();

        assert_eq!(remote.line_fetches(), 1);
        assert_eq!(ids(&cache.store().lines()), vec![2]);
    }

    #[tokio::test]
    async fn subscribers_see_later_refreshes() {
        let (cache, remote, _clock) = setup(
            FakeRemote::with_lines(vec![line(2)]),
            MemoryLineStore::new(),
        );

        let stream = cache.observe_lines();
        futures::pin_mut!(stream);
        loop {
            if stream.next().await.unwrap().is_success() {
                break;
            }
        }

        remote.set_lines(vec![line(2), line(7)]);
        cache.refresh_now().await.unwrap();

        let updated = stream.next().await.unwrap();
        assert!(updated.is_success());
        assert_eq!(ids(updated.data()), vec![2, 7]);
        assert_eq!(updated.data()[1].id, LineId(7));
    }

    #[tokio::test]
    async fn failed_store_write_is_reported_and_keeps_expiry() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the write fail.
        let path = dir.path().join("lines.json");
        std::fs::create_dir_all(path.join("occupied")).unwrap();

        let remote = Arc::new(FakeRemote::with_lines(vec![line(2)]));
        let cache = LineCache::new(
            remote.clone(),
            Arc::new(FileLineStore::open(&path)),
            Arc::new(ManualClock::new(start())),
            LineCacheConfig::default(),
        );

        let (_, settled) = settle(cache.observe_lines()).await;

        assert!(matches!(settled.error(), Some(LineCacheError::Store(_))));
        assert!(settled.data().is_empty());
        assert!(cache.store().lines().is_empty());
        assert_eq!(cache.store().last_refreshed_at().unwrap(), None);
        assert_eq!(remote.line_fetches(), 1);
    }

    #[tokio::test]
    async fn observed_lines_outlive_cache_handle() {
        let (cache, _remote, _clock) = setup(
            FakeRemote::with_lines(vec![line(2)]),
            MemoryLineStore::new(),
        );

        let stream = cache.observe_lines();
        drop(cache);

        let (_, settled) = settle(stream).await;
        assert_eq!(ids(settled.data()), vec![2]);
    }
}
