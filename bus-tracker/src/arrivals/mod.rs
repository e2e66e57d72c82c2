//! Arrivals at a stop, with live delays merged in.
//!
//! The merge rules themselves are the pure functions [`apply_cutoff`] and
//! [`merge_live`]; the [`LiveArrivalMerger`] drives them from a polled
//! live feed.

mod live;
mod merge;

pub use live::{LiveArrivalMerger, LiveConfig, LiveError};
pub use merge::{apply_cutoff, merge_live};
