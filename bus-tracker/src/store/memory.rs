//! In-memory line store.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::domain::Line;

use super::{LineStore, StoreError};

/// A line store that lives only as long as the process.
#[derive(Debug)]
pub struct MemoryLineStore {
    lines: watch::Sender<Arc<Vec<Line>>>,
    last_refreshed_at: Mutex<Option<DateTime<Utc>>>,
    replacements: AtomicUsize,
}

impl MemoryLineStore {
    /// Create an empty store that has never been refreshed.
    pub fn new() -> Self {
        Self::with_lines(Vec::new(), None)
    }

    /// Create a store with existing contents.
    pub fn with_lines(lines: Vec<Line>, last_refreshed_at: Option<DateTime<Utc>>) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(lines));
        Self {
            lines: tx,
            last_refreshed_at: Mutex::new(last_refreshed_at),
            replacements: AtomicUsize::new(0),
        }
    }

    /// Number of completed `replace_all_lines` calls.
    pub fn replacement_count(&self) -> usize {
        self.replacements.load(Ordering::SeqCst)
    }
}

impl Default for MemoryLineStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LineStore for MemoryLineStore {
    fn subscribe(&self) -> watch::Receiver<Arc<Vec<Line>>> {
        self.lines.subscribe()
    }

    fn replace_all_lines(
        &self,
        lines: Vec<Line>,
        refreshed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut last = self.last_refreshed_at.lock().unwrap_or_else(|e| e.into_inner());
        *last = Some(refreshed_at);
        self.lines.send_replace(Arc::new(lines));
        self.replacements.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn last_refreshed_at(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(*self.last_refreshed_at.lock().unwrap_or_else(|e| e.into_inner()))
    }
}
