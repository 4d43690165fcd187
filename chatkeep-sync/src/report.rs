//! Operation reports returned to the CLI.
//!
//! Reports are plain data: soft failures (a missing project directory, a
//! failed commit) live here as values and warnings, never as errors.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use chatkeep_core::types::{CommitOutcome, ProjectRoot, RootState};

/// What happened to one project inside a Save or SwitchAll batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ProjectStatus {
    Saved {
        project: ProjectRoot,
        archive: PathBuf,
        copied: usize,
        commit: CommitOutcome,
    },
    Failed {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectOutcome {
    /// The path as the caller supplied it (or as the registry lists it).
    pub input: PathBuf,
    pub status: ProjectStatus,
}

impl ProjectOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self.status, ProjectStatus::Saved { .. })
    }
}

/// Outcome of a backup-then-clear of GlobalRoot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ResetOutcome {
    Cleared {
        backup: Option<PathBuf>,
        removed: usize,
    },
    /// GlobalRoot was missing or held no tracked files.
    NothingToReset,
    /// The user said no; GlobalRoot is untouched.
    Declined,
    /// Policy prevented the reset (e.g. no project was saved first).
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    /// GlobalRoot as found before the save.
    pub global: RootState,
    pub projects: Vec<ProjectOutcome>,
    /// `None` unless a reset was requested.
    pub reset: Option<ResetOutcome>,
    pub warnings: Vec<String>,
}

impl SaveReport {
    pub fn nothing_to_save(&self) -> bool {
        !self.global.is_populated()
    }

    pub fn succeeded(&self) -> usize {
        self.projects.iter().filter(|p| p.is_saved()).count()
    }

    pub fn failed(&self) -> usize {
        self.projects.len() - self.succeeded()
    }

    pub fn declined(&self) -> bool {
        matches!(self.reset, Some(ResetOutcome::Declined))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub project: ProjectRoot,
    pub archive: PathBuf,
    pub loaded: usize,
    /// Best-effort, from the archive's save-record.
    pub last_saved: Option<DateTime<Utc>>,
    /// Snapshot of GlobalRoot taken before it was cleared.
    pub backup: Option<PathBuf>,
    pub cleared: usize,
    /// `true` when existing GlobalRoot content was kept and layered over.
    pub merged: bool,
    /// `None` when the load-record could not be written.
    pub record: Option<PathBuf>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchReport {
    pub global: RootState,
    pub projects: Vec<ProjectOutcome>,
    pub reset: Option<ResetOutcome>,
    pub warnings: Vec<String>,
}

impl SwitchReport {
    pub fn processed(&self) -> usize {
        self.projects.iter().filter(|p| p.is_saved()).count()
    }

    pub fn failed(&self) -> usize {
        self.projects.len() - self.processed()
    }
}

/// The registered project whose load-record carries the newest load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Owner {
    pub project: PathBuf,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub project: ProjectRoot,
    pub archive: PathBuf,
    pub archived: RootState,
    pub last_saved: Option<DateTime<Utc>>,
    pub last_loaded: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub global_root: PathBuf,
    pub global: RootState,
    pub snapshots: usize,
    pub latest_snapshot: Option<PathBuf>,
    /// `None` when the registry does not exist yet.
    pub registered: Option<usize>,
    pub project: Option<ProjectSummary>,
    pub owner: Option<Owner>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(input: &str) -> ProjectOutcome {
        ProjectOutcome {
            input: PathBuf::from(input),
            status: ProjectStatus::Failed {
                reason: "missing".to_string(),
            },
        }
    }

    fn saved(input: &str) -> ProjectOutcome {
        ProjectOutcome {
            input: PathBuf::from(input),
            status: ProjectStatus::Saved {
                project: ProjectRoot(PathBuf::from(input)),
                archive: PathBuf::from(input).join(".chatkeep"),
                copied: 2,
                commit: CommitOutcome::Skipped,
            },
        }
    }

    #[test]
    fn save_report_tallies() {
        let report = SaveReport {
            global: RootState::Populated(2),
            projects: vec![saved("/a"), failed("/b"), saved("/c")],
            reset: Some(ResetOutcome::Declined),
            warnings: vec![],
        };
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert!(report.declined());
        assert!(!report.nothing_to_save());
    }

    #[test]
    fn switch_report_serializes_status_tags() {
        let report = SwitchReport {
            global: RootState::Populated(1),
            projects: vec![failed("/gone")],
            reset: None,
            warnings: vec![],
        };
        let json = serde_json::to_string(&report).expect("serialize");
        assert!(json.contains(r#""status":"failed""#), "got: {json}");
        assert_eq!(report.processed(), 0);
    }
}
