//! Save-record and load-record persistence inside a project archive.
//!
//! Writes use the same `.tmp` + rename pattern as the transcript copies.
//! Reads are best-effort: a missing or hand-mangled record yields `None`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use chatkeep_core::types::ProjectRoot;
use chatkeep_renderer::{fields, LoadRecord, RecordKind, Renderer, SaveRecord};

use crate::error::{io_err, SyncError};

/// Write `<archive>/SAVED.md`, replacing any previous one.
pub fn write_save_record(
    renderer: &Renderer,
    archive: &Path,
    project: &ProjectRoot,
    saved_at: DateTime<Utc>,
    file_count: usize,
) -> Result<PathBuf, SyncError> {
    let record = SaveRecord::new(project, saved_at, file_count);
    let path = RecordKind::Saved.output_path(archive);
    write_atomic(&path, &renderer.render_saved(&record)?)?;
    Ok(path)
}

/// Regenerate `<archive>/CONTEXT.md`.
///
/// The last save date comes from `SAVED.md`; user-written sections of the
/// previous `CONTEXT.md` are carried over.
pub fn write_load_record(
    renderer: &Renderer,
    archive: &Path,
    project: &ProjectRoot,
    loaded_at: DateTime<Utc>,
    loaded_count: usize,
) -> Result<(PathBuf, LoadRecord), SyncError> {
    let mut record = LoadRecord::new(project, loaded_at, loaded_count);
    record.last_saved = last_saved(archive);
    if let Some(previous) = read_record(archive, RecordKind::Context) {
        record.focus = fields::section(&previous, "Current focus");
        record.notes = fields::section(&previous, "Notes");
    }

    let path = RecordKind::Context.output_path(archive);
    write_atomic(&path, &renderer.render_context(&record)?)?;
    Ok((path, record))
}

/// Save timestamp recorded in `<archive>/SAVED.md`, if recoverable.
pub fn last_saved(archive: &Path) -> Option<DateTime<Utc>> {
    fields::saved_at(&read_record(archive, RecordKind::Saved)?)
}

/// Load timestamp recorded in `<archive>/CONTEXT.md`, if recoverable.
pub fn last_loaded(archive: &Path) -> Option<DateTime<Utc>> {
    fields::loaded_at(&read_record(archive, RecordKind::Context)?)
}

fn read_record(archive: &Path, kind: RecordKind) -> Option<String> {
    std::fs::read_to_string(kind.output_path(archive)).ok()
}

fn write_atomic(path: &Path, content: &str) -> Result<(), SyncError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let tmp = PathBuf::from(format!("{}.chatkeep.tmp", path.display()));
    std::fs::write(&tmp, content).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    tracing::debug!("wrote: {}", path.display());
    Ok(())
}
