//! Bus tracker core.
//!
//! Keeps a durable, periodically refreshed cache of a bus network's lines,
//! and merges a polled live-delay feed into stop timetables, pausing the
//! polling while nobody is looking.

pub mod arrivals;
pub mod cache;
pub mod clock;
pub mod config;
pub mod domain;
pub mod presence;
pub mod remote;
pub mod resource;
pub mod schedule;
pub mod single_flight;
pub mod store;
pub mod web;

#[cfg(test)]
pub(crate) mod test_support;
