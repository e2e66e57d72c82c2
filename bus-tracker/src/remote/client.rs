//! Bus API HTTP client.
//!
//! Provides async methods for querying lines, stop timetables and the live
//! delay feed. Handles authentication, concurrency limiting and conversion
//! to domain types.

use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;

use crate::domain::{Arrival, Line, LiveDelayRecord, StopId};

use super::convert::{convert_arrivals, convert_lines, convert_live_records};
use super::error::RemoteError;
use super::types::{ArrivalsResponse, LinesResponse, LiveResponse};

/// Default base URL for the bus API.
const DEFAULT_BASE_URL: &str = "https://api.example-transit.net/v1";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Configuration for the bus API client.
#[derive(Debug, Clone)]
pub struct BusApiConfig {
    /// API key for x-apikey header authentication
    pub api_key: String,
    /// Base URL for the API
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl BusApiConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Bus API client.
///
/// Uses a semaphore to limit concurrent requests and avoid rate limiting.
#[derive(Debug, Clone)]
pub struct BusApiClient {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl BusApiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: BusApiConfig) -> Result<Self, RemoteError> {
        let mut headers = HeaderMap::new();

        let api_key =
            HeaderValue::from_str(&config.api_key).map_err(|_| RemoteError::Api {
                status: 0,
                message: "Invalid API key format".to_string(),
            })?;
        headers.insert("x-apikey", api_key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(RemoteError::Http)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// Fetch all lines served by the network.
    pub async fn fetch_lines(&self) -> Result<Vec<Line>, RemoteError> {
        let url = format!("{}/lines", self.base_url);
        let response: LinesResponse = self.get_json(&url, &[]).await?;
        Ok(convert_lines(&response.lines))
    }

    /// Fetch the timetable for a stop on a service date.
    ///
    /// Arrivals reference lines by id, so the line list is fetched as well
    /// to resolve them.
    pub async fn fetch_arrivals(
        &self,
        stop: &StopId,
        date: NaiveDate,
    ) -> Result<Vec<Arrival>, RemoteError> {
        let lines = self.fetch_lines().await?;

        let url = format!("{}/stops/{}/arrivals", self.base_url, stop.as_str());
        let date_param = date.format("%Y-%m-%d").to_string();
        let response: ArrivalsResponse = self.get_json(&url, &[("date", date_param)]).await?;

        Ok(convert_arrivals(&response.arrivals, &lines, date))
    }

    /// Fetch the live delay records for a stop.
    pub async fn fetch_live_delays(
        &self,
        stop: &StopId,
    ) -> Result<Vec<LiveDelayRecord>, RemoteError> {
        let url = format!("{}/stops/{}/live", self.base_url, stop.as_str());
        let response: LiveResponse = self.get_json(&url, &[]).await?;
        Ok(convert_live_records(&response.records))
    }

    /// Issue a GET request and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, RemoteError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| RemoteError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(RemoteError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(RemoteError::RateLimited);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound(url.to_string()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| RemoteError::Json {
            message: e.to_string(),
        })
    }
}
