//! Durable storage for the line cache.
//!
//! A [`LineStore`] holds the cached lines together with the time of the last
//! successful refresh, and notifies subscribers whenever the lines change.
//! Replacement is all-or-nothing: subscribers never observe a partially
//! written list.

mod file;
mod memory;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::domain::Line;

pub use file::FileLineStore;
pub use memory::MemoryLineStore;

/// Errors from a line store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file could not be encoded or decoded
    #[error("store encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage backing the line cache.
pub trait LineStore: Send + Sync + 'static {
    /// Subscribe to the stored lines. The receiver starts with the current
    /// contents and is notified after every replacement.
    fn subscribe(&self) -> watch::Receiver<Arc<Vec<Line>>>;

    /// The current contents.
    fn lines(&self) -> Arc<Vec<Line>> {
        self.subscribe().borrow().clone()
    }

    /// Replace every stored line and record the refresh time, in one
    /// transaction. On error neither the lines nor the time change.
    fn replace_all_lines(
        &self,
        lines: Vec<Line>,
        refreshed_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// When the lines were last refreshed from the remote, if ever.
    fn last_refreshed_at(&self) -> Result<Option<DateTime<Utc>>, StoreError>;
}
