//! Timestamped snapshots taken before a root is cleared.
//!
//! ## `snapshot` protocol
//!
//! 1. Inspect the root; missing or empty ⇒ `None`, no I/O.
//! 2. Reserve a fresh sibling `<name>.backup-YYYYMMDD-HHMMSS[-N]` with
//!    `create_dir` (never reuses an existing directory).
//! 3. Copy the whole tree, tracked or not.
//! 4. Verify every tracked file by SHA-256 against its source.
//! 5. Return the snapshot path. Only now may the caller clear the root.

use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use sha2::{Digest, Sha256};

use chatkeep_core::store;

use crate::error::{io_err, SyncError};

pub const BACKUP_MARKER: &str = ".backup-";

const MAX_SAME_SECOND: u32 = 100;

/// Snapshot `root` next to itself. `None` when there was nothing to protect.
pub fn snapshot(root: &Path, now: DateTime<Utc>) -> Result<Option<PathBuf>, SyncError> {
    let expected = store::list(root)?;
    if expected.is_empty() {
        tracing::debug!("nothing to back up in {}", root.display());
        return Ok(None);
    }

    let dest = reserve(root, now)?;
    copy_tree(root, &dest)?;

    let mut verified = 0;
    for file in &expected {
        let copy = dest.join(&file.relative);
        if copy.is_file() && digest(&copy)? == digest(&file.path)? {
            verified += 1;
        }
    }
    if verified != expected.len() {
        return Err(SyncError::BackupIncomplete {
            snapshot: dest,
            expected: expected.len(),
            verified,
        });
    }

    tracing::info!("backed up {} transcript(s) to {}", verified, dest.display());
    Ok(Some(dest))
}

/// Every snapshot ever taken of `root`, oldest first.
pub fn list_snapshots(root: &Path) -> Result<Vec<PathBuf>, SyncError> {
    let (Some(parent), Some(prefix)) = (root.parent(), snapshot_prefix(root)) else {
        return Ok(vec![]);
    };
    if !parent.is_dir() {
        return Ok(vec![]);
    }
    let mut found: Vec<((String, u32), PathBuf)> = std::fs::read_dir(parent)
        .map_err(|e| io_err(parent, e))?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            let key = snapshot_order(name.strip_prefix(&prefix)?);
            Some((key, e.path()))
        })
        .collect();
    found.sort();
    Ok(found.into_iter().map(|(_, path)| path).collect())
}

/// `(stamp, n)` for `YYYYMMDD-HHMMSS[-n]`; the unsuffixed name is `n = 1`.
fn snapshot_order(suffix: &str) -> (String, u32) {
    if let Some((stamp, n)) = suffix.rsplit_once('-') {
        if stamp.contains('-') {
            if let Ok(n) = n.parse() {
                return (stamp.to_string(), n);
            }
        }
    }
    (suffix.to_string(), 1)
}

fn snapshot_prefix(root: &Path) -> Option<String> {
    let name = root.file_name()?.to_string_lossy();
    Some(format!("{name}{BACKUP_MARKER}"))
}

/// Local-time, second-resolution directory name for `now`.
pub fn snapshot_name(root: &Path, now: DateTime<Utc>) -> Option<String> {
    let stamp = now.with_timezone(&Local).format("%Y%m%d-%H%M%S");
    Some(format!("{}{stamp}", snapshot_prefix(root)?))
}

fn reserve(root: &Path, now: DateTime<Utc>) -> Result<PathBuf, SyncError> {
    let invalid = || io_err(root, std::io::Error::other("root has no parent directory"));
    let parent = root.parent().ok_or_else(invalid)?;
    let base = snapshot_name(root, now).ok_or_else(invalid)?;

    for attempt in 1..=MAX_SAME_SECOND {
        let name = if attempt == 1 {
            base.clone()
        } else {
            format!("{base}-{attempt}")
        };
        let candidate = parent.join(name);
        match std::fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(io_err(&candidate, e)),
        }
    }
    Err(io_err(
        parent.join(base),
        std::io::Error::new(ErrorKind::AlreadyExists, "too many snapshots in one second"),
    ))
}

fn copy_tree(src: &Path, dst: &Path) -> Result<(), SyncError> {
    let entries = std::fs::read_dir(src).map_err(|e| io_err(src, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(src, e))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| io_err(&from, e))?;
        if file_type.is_dir() {
            std::fs::create_dir_all(&to).map_err(|e| io_err(&to, e))?;
            copy_tree(&from, &to)?;
        } else if from.is_file() {
            std::fs::copy(&from, &to).map_err(|e| io_err(&from, e))?;
        }
    }
    Ok(())
}

fn digest(path: &Path) -> Result<String, SyncError> {
    let mut file = File::open(path).map_err(|e| io_err(path, e))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).map_err(|e| io_err(path, e))?;
    Ok(hex::encode(hasher.finalize()))
}
