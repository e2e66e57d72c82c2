//! The remote data source abstraction.

use std::future::Future;

use chrono::NaiveDate;

use crate::domain::{Arrival, Line, LiveDelayRecord, StopId};

use super::client::BusApiClient;
use super::error::RemoteError;
use super::mock::MockBusApi;

/// Source of lines, timetables and live delays.
///
/// This abstraction lets the caches and the live merger be driven by the
/// real API, the file-backed mock, or a test double.
pub trait RemoteSource: Send + Sync + 'static {
    /// Fetch all lines served by the network.
    fn fetch_lines(&self) -> impl Future<Output = Result<Vec<Line>, RemoteError>> + Send;

    /// Fetch the live delay records currently known for a stop.
    fn fetch_live_delays(
        &self,
        stop: &StopId,
    ) -> impl Future<Output = Result<Vec<LiveDelayRecord>, RemoteError>> + Send;

    /// Fetch the timetabled arrivals at a stop on a service date.
    fn fetch_arrivals(
        &self,
        stop: &StopId,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<Arrival>, RemoteError>> + Send;
}

impl RemoteSource for BusApiClient {
    async fn fetch_lines(&self) -> Result<Vec<Line>, RemoteError> {
        BusApiClient::fetch_lines(self).await
    }

    async fn fetch_live_delays(&self, stop: &StopId) -> Result<Vec<LiveDelayRecord>, RemoteError> {
        BusApiClient::fetch_live_delays(self, stop).await
    }

    async fn fetch_arrivals(
        &self,
        stop: &StopId,
        date: NaiveDate,
    ) -> Result<Vec<Arrival>, RemoteError> {
        BusApiClient::fetch_arrivals(self, stop, date).await
    }
}

impl RemoteSource for MockBusApi {
    async fn fetch_lines(&self) -> Result<Vec<Line>, RemoteError> {
        MockBusApi::fetch_lines(self).await
    }

    async fn fetch_live_delays(&self, stop: &StopId) -> Result<Vec<LiveDelayRecord>, RemoteError> {
        MockBusApi::fetch_live_delays(self, stop).await
    }

    async fn fetch_arrivals(
        &self,
        stop: &StopId,
        date: NaiveDate,
    ) -> Result<Vec<Arrival>, RemoteError> {
        MockBusApi::fetch_arrivals(self, stop, date).await
    }
}

/// Either the real API or the mock, chosen at start-up.
#[derive(Debug, Clone)]
pub enum BusApi {
    Http(BusApiClient),
    Mock(MockBusApi),
}

impl RemoteSource for BusApi {
    async fn fetch_lines(&self) -> Result<Vec<Line>, RemoteError> {
        match self {
            BusApi::Http(client) => client.fetch_lines().await,
            BusApi::Mock(mock) => mock.fetch_lines().await,
        }
    }

    async fn fetch_live_delays(&self, stop: &StopId) -> Result<Vec<LiveDelayRecord>, RemoteError> {
        match self {
            BusApi::Http(client) => client.fetch_live_delays(stop).await,
            BusApi::Mock(mock) => mock.fetch_live_delays(stop).await,
        }
    }

    async fn fetch_arrivals(
        &self,
        stop: &StopId,
        date: NaiveDate,
    ) -> Result<Vec<Arrival>, RemoteError> {
        match self {
            BusApi::Http(client) => client.fetch_arrivals(stop, date).await,
            BusApi::Mock(mock) => mock.fetch_arrivals(stop, date).await,
        }
    }
}
