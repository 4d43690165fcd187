//! Resolved filesystem layout and the optional YAML config that shapes it.
//!
//! # Storage layout
//!
//! ```text
//! ~/.claude/conversations/          GlobalRoot (active transcripts)
//! ~/.claude/conversations.backup-*  BackupSnapshot siblings
//! ~/.chatkeep/
//!   config.yaml                     optional overrides
//!   projects                        registry, one path per line
//!   templates/                      optional *.tera overrides
//! <project>/.chatkeep/              ProjectArchiveRoot
//!   SAVED.md                        save-record
//!   CONTEXT.md                      load-record
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{io_err, CoreError};
use crate::types::ProjectRoot;

pub const DEFAULT_ARCHIVE_DIR: &str = ".chatkeep";
pub const SAVE_RECORD_FILE: &str = "SAVED.md";
pub const LOAD_RECORD_FILE: &str = "CONTEXT.md";

/// On-disk `~/.chatkeep/config.yaml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub global_root: Option<PathBuf>,
    pub archive_dir: Option<String>,
    pub registry: Option<PathBuf>,
}

/// Every location chatkeep reads or writes, resolved once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub home: PathBuf,
    pub global_root: PathBuf,
    /// Directory name created inside each project root.
    pub archive_dir: String,
    pub registry: PathBuf,
    pub template_dir: PathBuf,
}

impl Layout {
    /// Defaults rooted at `home`, ignoring any config file.
    pub fn defaults_at(home: &Path) -> Self {
        Layout {
            home: home.to_path_buf(),
            global_root: home.join(".claude").join("conversations"),
            archive_dir: DEFAULT_ARCHIVE_DIR.to_string(),
            registry: chatkeep_dir(home).join("projects"),
            template_dir: chatkeep_dir(home).join("templates"),
        }
    }

    /// Defaults rooted at `home`, overridden by `~/.chatkeep/config.yaml`
    /// when it exists.
    pub fn resolve_at(home: &Path) -> Result<Self, CoreError> {
        let config = load_config_at(home)?;
        Ok(Self::from_config(home, config))
    }

    /// `resolve_at` convenience wrapper.
    pub fn resolve() -> Result<Self, CoreError> {
        Self::resolve_at(&home()?)
    }

    pub fn from_config(home: &Path, config: FileConfig) -> Self {
        let mut layout = Self::defaults_at(home);
        if let Some(global) = config.global_root {
            layout.global_root = expand(home, &global);
        }
        if let Some(dir) = config.archive_dir.filter(|d| !d.trim().is_empty()) {
            layout.archive_dir = dir;
        }
        if let Some(registry) = config.registry {
            layout.registry = expand(home, &registry);
        }
        layout
    }

    /// `<project>/<archive_dir>` (pure, no I/O).
    pub fn archive_root(&self, project: &ProjectRoot) -> PathBuf {
        project.path().join(&self.archive_dir)
    }

    /// Rejects archives that would nest with GlobalRoot in either direction.
    /// Both sides are compared with symlinks resolved.
    pub fn check_disjoint(&self, archive: &Path) -> Result<(), CoreError> {
        let archive_real = resolve_existing(archive);
        let global_real = resolve_existing(&self.global_root);
        if archive_real.starts_with(&global_real) || global_real.starts_with(&archive_real) {
            return Err(CoreError::SameRoot {
                archive: archive.to_path_buf(),
                global: self.global_root.clone(),
            });
        }
        Ok(())
    }
}

/// `<home>/.chatkeep/`
pub fn chatkeep_dir(home: &Path) -> PathBuf {
    home.join(".chatkeep")
}

/// `<home>/.chatkeep/config.yaml` (pure, no I/O).
pub fn config_path_at(home: &Path) -> PathBuf {
    chatkeep_dir(home).join("config.yaml")
}

/// Load the config file, or defaults when it is absent.
pub fn load_config_at(home: &Path) -> Result<FileConfig, CoreError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    if contents.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| CoreError::Config { path, source })
}

pub fn home() -> Result<PathBuf, CoreError> {
    dirs::home_dir().ok_or(CoreError::HomeNotFound)
}

/// Canonicalize the deepest existing ancestor of `path` and re-attach the
/// components that do not exist yet.
fn resolve_existing(path: &Path) -> PathBuf {
    let mut missing = Vec::new();
    let mut current = path;
    loop {
        if let Ok(real) = current.canonicalize() {
            return missing.iter().rev().fold(real, |acc, part| acc.join(part));
        }
        match (current.parent(), current.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                current = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}

fn expand(home: &Path, path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        return home.join(rest);
    }
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        home.join(path)
    }
}
