//! Error types for chatkeep-sync.

use std::path::PathBuf;

use thiserror::Error;

use chatkeep_core::CoreError;
use chatkeep_renderer::RenderError;

/// All errors that can abort a sync operation.
///
/// Per-project failures inside a batch and version-control failures are not
/// errors; they are reported as values in the operation's report.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from the store, registry, or layout.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An error from the record renderer.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The project archive is missing or holds no tracked files.
    #[error("no saved transcripts in {archive}")]
    NoSavedTranscripts { archive: PathBuf },

    /// The user declined a confirmation; nothing was changed.
    #[error("declined; nothing was changed")]
    Declined,

    /// The snapshot does not match the directory it was taken from.
    #[error("backup at {snapshot} is incomplete: expected {expected} file(s), verified {verified}")]
    BackupIncomplete {
        snapshot: PathBuf,
        expected: usize,
        verified: usize,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
