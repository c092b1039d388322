//! Run orchestration for the arxivcode pipeline.
//!
//! Ties the feed, lookup, store, and digest crates together into the two
//! end-to-end run modes (backfill and daily).

pub mod pipeline;
pub mod schedule;

pub use pipeline::{Pipeline, ProgressReporter, RunSummary, SilentProgress};
pub use schedule::{RunMode, backfill_dates, yesterday};
