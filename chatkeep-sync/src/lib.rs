//! # chatkeep-sync
//!
//! Backup-guarded transfer of transcripts between GlobalRoot and project
//! archives.
//!
//! Build an [`Orchestrator`] from a resolved [`chatkeep_core::Layout`], a
//! version-control seam, and a confirmation seam, then call
//! [`Orchestrator::save`], [`Orchestrator::load`], [`Orchestrator::switch`],
//! [`Orchestrator::reset`], or [`Orchestrator::status`]. Every operation
//! returns a plain report; the caller decides how to print it.

pub mod backup;
pub mod error;
pub mod orchestrator;
pub mod prompt;
pub mod records;
pub mod report;

pub use error::SyncError;
pub use orchestrator::{LoadOptions, Orchestrator, SaveOptions, SwitchScope};
pub use prompt::{AlwaysDecline, Confirm};
pub use report::{
    LoadReport, Owner, ProjectOutcome, ProjectStatus, ProjectSummary, ResetOutcome, SaveReport,
    StatusReport, SwitchReport,
};
