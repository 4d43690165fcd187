//! Error types for chatkeep-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from store, registry, and layout operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Underlying I/O failure, annotated with the path that caused it.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The optional YAML config file exists but could not be parsed.
    #[error("failed to parse config at {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`; cannot locate `~/.chatkeep/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// The project registry file does not exist yet.
    #[error("registry not found at {path}; run `chatkeep switch --init` first")]
    RegistryNotFound { path: PathBuf },

    /// A project path did not resolve to an existing directory.
    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// A project archive would overlap the global transcript directory.
    #[error("archive {archive} overlaps the global transcript directory {global}")]
    SameRoot { archive: PathBuf, global: PathBuf },

    /// An external version-control command could not be run at all.
    #[error("`{command}` failed: {stderr}")]
    Vcs { command: String, stderr: String },
}

/// Convenience constructor for [`CoreError::Io`].
pub fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CoreError {
    CoreError::Io {
        path: path.into(),
        source,
    }
}
