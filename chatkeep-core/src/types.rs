//! Domain types shared by every chatkeep crate.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! The one exception is the registry line key, which is compared as text.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Display name of a project (the last component of its root).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectName(pub String);

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ProjectName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProjectName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A canonical project root: absolute, symlink-free, and lifted to the
/// version-control top-level when the input lies inside a working tree.
///
/// Construct through [`crate::project::resolve_project_root`]; the registry
/// and the archive location are both keyed on this value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectRoot(pub PathBuf);

impl ProjectRoot {
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Final path component, or the whole path for `/`.
    pub fn name(&self) -> ProjectName {
        ProjectName::from(
            self.0
                .file_name()
                .unwrap_or(self.0.as_os_str())
                .to_string_lossy()
                .into_owned(),
        )
    }

    /// The exact text written to (and matched against) a registry line.
    pub fn registry_key(&self) -> String {
        self.0.to_string_lossy().into_owned()
    }
}

impl fmt::Display for ProjectRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.display().fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Transcript roots
// ---------------------------------------------------------------------------

/// A single tracked transcript file found under a root.
///
/// The payload is never parsed; only the location is carried around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptFile {
    /// Path relative to the root it was listed from. Preserved across copies.
    pub relative: PathBuf,
    /// Absolute path on disk.
    pub path: PathBuf,
}

/// Presence signal for a transcript root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "files")]
pub enum RootState {
    /// The directory does not exist.
    Missing,
    /// The directory exists but holds no tracked files.
    Empty,
    /// The directory holds this many tracked files.
    Populated(usize),
}

impl RootState {
    pub fn file_count(&self) -> usize {
        match self {
            RootState::Populated(n) => *n,
            RootState::Missing | RootState::Empty => 0,
        }
    }

    pub fn is_populated(&self) -> bool {
        matches!(self, RootState::Populated(_))
    }
}

impl fmt::Display for RootState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RootState::Missing => write!(f, "missing"),
            RootState::Empty => write!(f, "empty"),
            RootState::Populated(n) => write!(f, "{n} transcript(s)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// One parsed registry line, annotated with what is on disk right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub path: PathBuf,
    pub exists: bool,
    /// Tracked files in the entry's archive; `0` when the directory is gone.
    pub tracked_files: usize,
}

/// Result of [`crate::registry::init_at`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    Created { path: PathBuf },
    /// The registry was already there; its contents are returned untouched.
    AlreadyExists { path: PathBuf, contents: String },
}

/// Result of [`crate::registry::add_at`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added(ProjectRoot),
    AlreadyPresent(ProjectRoot),
}

/// Result of [`crate::registry::remove_at`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed { key: String, count: usize },
    NotFound { key: String },
}

// ---------------------------------------------------------------------------
// Version control
// ---------------------------------------------------------------------------

/// Outcome of committing archive paths. Failures are values, not errors:
/// the copy they follow has already succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "detail")]
pub enum CommitOutcome {
    Committed,
    NothingToCommit,
    /// The project is not under version control, or git was disabled.
    Skipped,
    Failed(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
