//! Flat project registry.
//!
//! # Storage format
//!
//! ```text
//! # chatkeep project registry
//! /home/me/code/webshop
//! /home/me/code/tooling
//! ```
//!
//! UTF-8, one canonical absolute path per line. Blank lines and lines whose
//! first non-whitespace character is `#` are ignored. No quoting or escaping:
//! paths containing newlines are unsupported.
//!
//! Every operation takes the resolved [`Layout`] explicitly so tests can point
//! it at a `TempDir`.

use std::path::{Path, PathBuf};

use crate::config::Layout;
use crate::error::{io_err, CoreError};
use crate::project::resolve_project_root;
use crate::store;
use crate::types::{AddOutcome, InitOutcome, ProjectRoot, RegistryEntry, RemoveOutcome};
use crate::vcs::Vcs;

pub const REGISTRY_HEADER: &str = "\
# chatkeep project registry
# One absolute project path per line. Lines starting with '#' are ignored.
";

// ---------------------------------------------------------------------------
// 1. Parsing
// ---------------------------------------------------------------------------

/// `true` for lines that carry no entry.
pub fn is_ignorable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// The entry lines of a registry document, trimmed, in file order.
pub fn parse_entries(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter(|line| !is_ignorable(line))
        .map(|line| line.trim().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// 2. Init
// ---------------------------------------------------------------------------

/// Create the registry with its header comment if absent.
///
/// Idempotent: an existing registry is returned unchanged inside
/// [`InitOutcome::AlreadyExists`].
pub fn init_at(layout: &Layout) -> Result<InitOutcome, CoreError> {
    let path = layout.registry.clone();
    if path.exists() {
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        return Ok(InitOutcome::AlreadyExists { path, contents });
    }
    write_atomic(&path, REGISTRY_HEADER)?;
    tracing::info!("created registry at {}", path.display());
    Ok(InitOutcome::Created { path })
}

// ---------------------------------------------------------------------------
// 3. Add / remove
// ---------------------------------------------------------------------------

/// Register `input` (resolved against `cwd`).
///
/// Fails with [`CoreError::NotADirectory`], leaving the registry untouched, unless the
/// path is an existing directory. An absent registry is created with its
/// header first.
pub fn add_at(
    layout: &Layout,
    input: &Path,
    cwd: &Path,
    vcs: &dyn Vcs,
) -> Result<AddOutcome, CoreError> {
    let root = resolve_project_root(input, cwd, vcs)?;
    let key = root.registry_key();

    let mut contents = read_or_header(&layout.registry)?;
    if parse_entries(&contents).iter().any(|entry| *entry == key) {
        return Ok(AddOutcome::AlreadyPresent(root));
    }

    if !contents.is_empty() && !contents.ends_with('\n') {
        contents.push('\n');
    }
    contents.push_str(&key);
    contents.push('\n');
    write_atomic(&layout.registry, &contents)?;
    tracing::info!("registered {key}");
    Ok(AddOutcome::Added(root))
}

/// Remove every line matching `input`.
///
/// An existing directory is canonicalized the same way `add_at` does; a
/// vanished one is matched by its literal text so stale entries can still be
/// dropped. Comments and unrelated lines are preserved byte-for-byte.
pub fn remove_at(
    layout: &Layout,
    input: &Path,
    cwd: &Path,
    vcs: &dyn Vcs,
) -> Result<RemoveOutcome, CoreError> {
    let contents = read_existing(&layout.registry)?;

    let key = match resolve_project_root(input, cwd, vcs) {
        Ok(root) => root.registry_key(),
        Err(CoreError::NotADirectory { .. }) => input.to_string_lossy().trim().to_string(),
        Err(e) => return Err(e),
    };

    let mut kept = String::with_capacity(contents.len());
    let mut count = 0;
    for line in contents.split_inclusive('\n') {
        if !is_ignorable(line) && line.trim() == key {
            count += 1;
        } else {
            kept.push_str(line);
        }
    }

    if count == 0 {
        return Ok(RemoveOutcome::NotFound { key });
    }
    write_atomic(&layout.registry, &kept)?;
    tracing::info!("unregistered {key} ({count} line(s))");
    Ok(RemoveOutcome::Removed { key, count })
}

// ---------------------------------------------------------------------------
// 4. List
// ---------------------------------------------------------------------------

/// Raw registered paths in file order.
pub fn entries_at(layout: &Layout) -> Result<Vec<PathBuf>, CoreError> {
    let contents = read_existing(&layout.registry)?;
    Ok(parse_entries(&contents).into_iter().map(PathBuf::from).collect())
}

/// Registered paths annotated with existence and archived transcript count.
///
/// Entries whose directory disappeared are reported, never pruned.
pub fn list_at(layout: &Layout) -> Result<Vec<RegistryEntry>, CoreError> {
    entries_at(layout)?
        .into_iter()
        .map(|path| {
            let exists = path.is_dir();
            let tracked_files = if exists {
                store::count(&layout.archive_root(&ProjectRoot(path.clone())))?
            } else {
                0
            };
            Ok(RegistryEntry {
                path,
                exists,
                tracked_files,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn read_existing(path: &Path) -> Result<String, CoreError> {
    if !path.exists() {
        return Err(CoreError::RegistryNotFound {
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|e| io_err(path, e))
}

fn read_or_header(path: &Path) -> Result<String, CoreError> {
    if path.exists() {
        std::fs::read_to_string(path).map_err(|e| io_err(path, e))
    } else {
        Ok(REGISTRY_HEADER.to_string())
    }
}

/// Write flow: `.tmp` sibling → `chmod 0600` → `rename`.
fn write_atomic(path: &Path, contents: &str) -> Result<(), CoreError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, contents).map_err(|e| io_err(&tmp, e))?;
    set_file_permissions(&tmp)?;
    std::fs::rename(&tmp, path).map_err(|e| io_err(path, e))?;
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), CoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), CoreError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
