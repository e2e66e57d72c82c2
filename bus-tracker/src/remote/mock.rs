//! Mock bus API for development without API access.
//!
//! Serves lines, timetables and live data from JSON files laid out as:
//!
//! ```text
//! {data_dir}/lines.json            -> LinesResponse
//! {data_dir}/arrivals/{stop}.json  -> ArrivalsResponse
//! {data_dir}/live/{stop}.json      -> LiveResponse
//! ```
//!
//! Files are read on every request, so editing `live/*.json` while the
//! server runs simulates a changing live feed.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;

use crate::domain::{Arrival, Line, LiveDelayRecord, StopId};

use super::convert::{convert_arrivals, convert_lines, convert_live_records};
use super::error::RemoteError;
use super::types::{ArrivalsResponse, LinesResponse, LiveResponse};

/// Mock bus API that serves data from JSON files.
#[derive(Debug, Clone)]
pub struct MockBusApi {
    data_dir: PathBuf,
}

impl MockBusApi {
    /// Create a mock client rooted at `data_dir`.
    ///
    /// Fails if the directory has no `lines.json`.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, RemoteError> {
        let data_dir = data_dir.as_ref().to_path_buf();

        if !data_dir.join("lines.json").is_file() {
            return Err(RemoteError::Api {
                status: 0,
                message: format!("No lines.json found in {:?}", data_dir),
            });
        }

        Ok(Self { data_dir })
    }

    /// Lines from `lines.json`.
    pub async fn fetch_lines(&self) -> Result<Vec<Line>, RemoteError> {
        let response: LinesResponse = self.read_json(&self.data_dir.join("lines.json"))?;
        Ok(convert_lines(&response.lines))
    }

    /// Timetable from `arrivals/{stop}.json`. The date only stamps the times.
    pub async fn fetch_arrivals(
        &self,
        stop: &StopId,
        date: NaiveDate,
    ) -> Result<Vec<Arrival>, RemoteError> {
        let lines = self.fetch_lines().await?;
        let path = self.stop_file("arrivals", stop);
        let response: ArrivalsResponse = self.read_json(&path)?;
        Ok(convert_arrivals(&response.arrivals, &lines, date))
    }

    /// Live records from `live/{stop}.json`; a stop without a file has no live data.
    pub async fn fetch_live_delays(
        &self,
        stop: &StopId,
    ) -> Result<Vec<LiveDelayRecord>, RemoteError> {
        let path = self.stop_file("live", stop);
        if !path.is_file() {
            return Ok(Vec::new());
        }
        let response: LiveResponse = self.read_json(&path)?;
        Ok(convert_live_records(&response.records))
    }

    fn stop_file(&self, kind: &str, stop: &StopId) -> PathBuf {
        self.data_dir
            .join(kind)
            .join(format!("{}.json", stop.as_str()))
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T, RemoteError> {
        let json = std::fs::read_to_string(path)
            .map_err(|_| RemoteError::NotFound(format!("{}", path.display())))?;

        serde_json::from_str(&json).map_err(|e| RemoteError::Json {
            message: format!("Failed to parse {:?}: {}", path, e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LineId;
    use tempfile::tempdir;

    fn write(dir: &Path, rel: &str, contents: &str) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "lines.json",
            r##"{"lines":[{"id":2,"label":"2","color":"#0055AA"},{"id":6,"label":"6"}]}"##,
        );
        write(
            dir.path(),
            "arrivals/1042.json",
            r#"{"arrivals":[
                {"lineId":2,"time":"10:00","direction":"Centre"},
                {"lineId":6,"time":"11:00","direction":"Harbour"}
            ]}"#,
        );
        write(
            dir.path(),
            "live/1042.json",
            r#"{"records":[{"lineId":2,"scheduledTime":"10:00","delayMinutes":3}]}"#,
        );
        dir
    }

    #[test]
    fn requires_lines_file() {
        let dir = tempdir().unwrap();
        assert!(MockBusApi::new(dir.path()).is_err());
    }

    #[tokio::test]
    async fn serves_lines() {
        let dir = fixture();
        let api = MockBusApi::new(dir.path()).unwrap();

        let lines = api.fetch_lines().await.unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].id, LineId(2));
    }

    #[tokio::test]
    async fn serves_arrivals_and_live() {
        let dir = fixture();
        let api = MockBusApi::new(dir.path()).unwrap();
        let stop = StopId::parse("1042").unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 1, 3).unwrap();

        let arrivals = api.fetch_arrivals(&stop, date).await.unwrap();
        assert_eq!(arrivals.len(), 2);
        assert_eq!(arrivals[0].scheduled_time.date(), date);

        let live = api.fetch_live_delays(&stop).await.unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].delay_minutes, Some(3));
    }

    #[tokio::test]
    async fn unknown_stop() {
        let dir = fixture();
        let api = MockBusApi::new(dir.path()).unwrap();
        let stop = StopId::parse("9999").unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 1, 3).unwrap();

        let err = api.fetch_arrivals(&stop, date).await.unwrap_err();
        assert!(matches!(err, RemoteError::NotFound(_)));

        // No live file just means no live data
        assert!(api.fetch_live_delays(&stop).await.unwrap().is_empty());
    }
}
