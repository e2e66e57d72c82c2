//! Bus API access.
//!
//! This module provides the HTTP client for the bus network's API, a
//! file-backed mock for development, and the [`RemoteSource`] trait the rest
//! of the crate is written against.
//!
//! Errors are split into the transient "no network" kind, which pollers
//! swallow, and everything else, which is surfaced to the caller.

mod client;
mod convert;
mod error;
mod mock;
mod source;
mod types;

pub use client::{BusApiClient, BusApiConfig};
pub use convert::{
    ConversionError, convert_arrival, convert_arrivals, convert_line, convert_lines,
    convert_live_record, convert_live_records,
};
pub use error::RemoteError;
pub use mock::MockBusApi;
pub use source::{BusApi, RemoteSource};
pub use types::{ArrivalDto, ArrivalsResponse, LineDto, LinesResponse, LiveRecordDto, LiveResponse};
