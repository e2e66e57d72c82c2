//! JSON file-backed line store.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::warn;

use crate::domain::{Line, LineColor, LineId};

use super::{LineStore, StoreError};

/// On-disk representation of the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PersistedLines {
    /// Unix timestamp of the last successful refresh.
    last_refreshed_at_secs: Option<i64>,
    lines: Vec<StoredLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredLine {
    id: u32,
    label: String,
    color: Option<u32>,
}

impl From<&Line> for StoredLine {
    fn from(line: &Line) -> Self {
        Self {
            id: line.id.0,
            label: line.label.clone(),
            color: line.color.map(|c| c.argb()),
        }
    }
}

impl From<StoredLine> for Line {
    fn from(stored: StoredLine) -> Self {
        Line::new(
            LineId(stored.id),
            stored.label,
            stored.color.map(LineColor::from_argb),
        )
    }
}

/// A line store persisted to a JSON file.
///
/// Every write rewrites the whole file through a temporary file and a
/// rename, so a crash mid-write leaves the previous contents intact.
#[derive(Debug)]
pub struct FileLineStore {
    path: PathBuf,
    state: Mutex<PersistedLines>,
    lines: watch::Sender<Arc<Vec<Line>>>,
}

impl FileLineStore {
    /// Open the store at `path`.
    ///
    /// A missing or unreadable file starts the store empty; it will be
    /// written on the first refresh.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = match load(&path) {
            Ok(Some(state)) => state,
            Ok(None) => PersistedLines::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Discarding unreadable line cache");
                PersistedLines::default()
            }
        };

        let lines: Vec<Line> = state.lines.iter().cloned().map(Line::from).collect();
        let (tx, _rx) = watch::channel(Arc::new(lines));

        Self {
            path,
            state: Mutex::new(state),
            lines: tx,
        }
    }

    fn persist(&self, state: &PersistedLines) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn load(path: &Path) -> Result<Option<PersistedLines>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&contents)?))
}

impl LineStore for FileLineStore {
    fn subscribe(&self) -> watch::Receiver<Arc<Vec<Line>>> {
        self.lines.subscribe()
    }

    fn replace_all_lines(
        &self,
        lines: Vec<Line>,
        refreshed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let next = PersistedLines {
            last_refreshed_at_secs: Some(refreshed_at.timestamp()),
            lines: lines.iter().map(StoredLine::from).collect(),
        };
        self.persist(&next)?;
        *state = next;

        // Notify while still holding the state lock so writers are ordered.
        self.lines.send_replace(Arc::new(lines));
        Ok(())
    }

    fn last_refreshed_at(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        Ok(state
            .last_refreshed_at_secs
            .and_then(|secs| DateTime::from_timestamp(secs, 0)))
    }
}
