//! Transcript Store: enumerate, copy, and delete tracked `.json` files.
//!
//! A root is any directory tree. Only tracked files take part in copy and
//! clear; generated documents and other files are left where they are.
//!
//! ## Per-file copy protocol
//!
//! 1. Create the destination parent directories.
//! 2. Copy the source bytes to `<dest>.chatkeep.tmp`.
//! 3. Rename onto `<dest>` (atomic on POSIX), replacing any existing file.
//!
//! A killed process can leave a partially copied *set*, never a torn file.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::error::{io_err, CoreError};
use crate::types::{RootState, TranscriptFile};

pub const TRACKED_EXTENSION: &str = "json";

const TMP_SUFFIX: &str = ".chatkeep.tmp";

/// `true` for files the store manages.
pub fn is_tracked(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case(TRACKED_EXTENSION))
}

/// Every tracked file under `root`, sorted by relative path.
///
/// A missing root yields an empty list. Symlinked directories are not
/// followed.
pub fn list(root: &Path) -> Result<Vec<TranscriptFile>, CoreError> {
    if !root.is_dir() {
        return Ok(vec![]);
    }
    let mut files = Vec::new();
    collect(root, root, &mut files)?;
    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(files)
}

fn collect(root: &Path, dir: &Path, out: &mut Vec<TranscriptFile>) -> Result<(), CoreError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| io_err(&path, e))?;
        if file_type.is_dir() {
            collect(root, &path, out)?;
        } else if is_tracked(&path) && path.is_file() {
            let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
            out.push(TranscriptFile { relative, path });
        }
    }
    Ok(())
}

/// Number of tracked files under `root`.
pub fn count(root: &Path) -> Result<usize, CoreError> {
    Ok(list(root)?.len())
}

/// Distinguish "missing" from "exists but empty" from "populated".
pub fn inspect(root: &Path) -> Result<RootState, CoreError> {
    if !root.exists() {
        return Ok(RootState::Missing);
    }
    match count(root)? {
        0 => Ok(RootState::Empty),
        n => Ok(RootState::Populated(n)),
    }
}

/// Copy every tracked file from `src` to the same relative path under `dst`.
///
/// Existing destination files are overwritten; nothing is ever removed from
/// `src`. Returns the number of files copied.
pub fn copy_all(src: &Path, dst: &Path) -> Result<usize, CoreError> {
    if src == dst {
        return Err(CoreError::SameRoot {
            archive: dst.to_path_buf(),
            global: src.to_path_buf(),
        });
    }
    let files = list(src)?;
    std::fs::create_dir_all(dst).map_err(|e| io_err(dst, e))?;
    for file in &files {
        copy_one(&file.path, &dst.join(&file.relative))?;
    }
    tracing::info!(
        "copied {} transcript(s) {} -> {}",
        files.len(),
        src.display(),
        dst.display()
    );
    Ok(files.len())
}

fn copy_one(from: &Path, to: &Path) -> Result<(), CoreError> {
    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let tmp = PathBuf::from(format!("{}{TMP_SUFFIX}", to.display()));
    std::fs::copy(from, &tmp).map_err(|e| io_err(from, e))?;
    if let Err(e) = std::fs::rename(&tmp, to) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(to, e));
    }
    tracing::debug!("copied {}", to.display());
    Ok(())
}

/// Delete every tracked file under `root`. Directories and untracked files
/// stay. Returns the number of files removed.
///
/// Callers that clear by policy must snapshot `root` first.
pub fn clear(root: &Path) -> Result<usize, CoreError> {
    let files = list(root)?;
    for file in &files {
        std::fs::remove_file(&file.path).map_err(|e| io_err(&file.path, e))?;
    }
    tracing::info!("cleared {} transcript(s) from {}", files.len(), root.display());
    Ok(files.len())
}
