//! Record payloads: what the save-record and load-record templates see.

use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use chatkeep_core::types::{ProjectName, ProjectRoot};

use crate::error::RenderError;

/// Written to the archive after every save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRecord {
    pub project_name: ProjectName,
    pub project_path: PathBuf,
    pub saved_at: DateTime<Utc>,
    pub file_count: usize,
}

impl SaveRecord {
    pub fn new(project: &ProjectRoot, saved_at: DateTime<Utc>, file_count: usize) -> Self {
        SaveRecord {
            project_name: project.name(),
            project_path: project.path().to_path_buf(),
            saved_at,
            file_count,
        }
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        let ctx = SaveCtx {
            project_name: self.project_name.0.clone(),
            project_path: self.project_path.display().to_string(),
            saved_at: timestamp(self.saved_at),
            file_count: self.file_count,
        };
        tera::Context::from_serialize(ctx).map_err(RenderError::from)
    }
}

/// Regenerated in the archive after every load.
///
/// `focus` and `notes` carry user-written sections over from the previous
/// document so regeneration never discards them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRecord {
    pub project_name: ProjectName,
    pub project_path: PathBuf,
    pub last_saved: Option<DateTime<Utc>>,
    pub loaded_at: DateTime<Utc>,
    pub loaded_count: usize,
    pub focus: Option<String>,
    pub notes: Option<String>,
}

impl LoadRecord {
    pub fn new(project: &ProjectRoot, loaded_at: DateTime<Utc>, loaded_count: usize) -> Self {
        LoadRecord {
            project_name: project.name(),
            project_path: project.path().to_path_buf(),
            last_saved: None,
            loaded_at,
            loaded_count,
            focus: None,
            notes: None,
        }
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        let ctx = LoadCtx {
            project_name: self.project_name.0.clone(),
            project_path: self.project_path.display().to_string(),
            last_saved: self.last_saved.map(timestamp),
            loaded_at: timestamp(self.loaded_at),
            loaded_count: self.loaded_count,
            focus: self.focus.clone(),
            notes: self.notes.clone(),
        };
        tera::Context::from_serialize(ctx).map_err(RenderError::from)
    }
}

#[derive(Serialize)]
struct SaveCtx {
    project_name: String,
    project_path: String,
    saved_at: String,
    file_count: usize,
}

#[derive(Serialize)]
struct LoadCtx {
    project_name: String,
    project_path: String,
    last_saved: Option<String>,
    loaded_at: String,
    loaded_count: usize,
    focus: Option<String>,
    notes: Option<String>,
}

/// Second-resolution RFC 3339, the form [`crate::fields`] parses back.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
