//! # reporter-sync
//!
//! rclone adapters and the report pipeline.
//!
//! Build a [`Pipeline`] from a [`reporter_core::ReporterConfig`] and a
//! [`reporter_core::ToolRunner`], then call [`Pipeline::run`] for a full
//! pass or [`Pipeline::detect`] to only look for new reports.

pub mod diff;
pub mod error;
pub mod listing;
pub mod pipeline;
pub mod remote;

pub use diff::new_files;
pub use error::SyncError;
pub use listing::{list_local, list_remote};
pub use pipeline::{Detection, Pipeline, RunOutcome, RunSummary};
pub use remote::{publish, sync_mirror};
