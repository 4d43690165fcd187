//! Save, Load, Switch, Reset, and Status over GlobalRoot and project archives.
//!
//! Every operation is a single stateless pass over the filesystem. The
//! invariant that ties them together: GlobalRoot is only ever cleared
//! through `backup_and_clear`, which refuses to delete
//! anything until a verified snapshot exists.
//!
//! Which project currently "owns" GlobalRoot is never stored; [`Orchestrator::status`]
//! derives it from the newest load-record among registered projects.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use chatkeep_core::{
    project::resolve_project_root,
    registry, store,
    types::{CommitOutcome, ProjectRoot, RootState},
    CoreError, Layout, Vcs,
};
use chatkeep_renderer::Renderer;

use crate::backup;
use crate::error::{io_err, SyncError};
use crate::prompt::Confirm;
use crate::records;
use crate::report::{
    LoadReport, Owner, ProjectOutcome, ProjectStatus, ProjectSummary, ResetOutcome, SaveReport,
    StatusReport, SwitchReport,
};

/// Flags for [`Orchestrator::save`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveOptions {
    /// Backup and clear GlobalRoot after saving.
    pub reset: bool,
    /// Never stage or commit the archive.
    pub no_git: bool,
    /// Skip the reset confirmation.
    pub force: bool,
}

/// Flags for [`Orchestrator::load`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Keep existing GlobalRoot content and layer the archive over it.
    pub no_clear: bool,
    /// Skip the clear confirmation.
    pub force: bool,
}

/// Which projects a switch copies GlobalRoot into before the shared reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchScope {
    /// Every registry entry.
    All,
    /// One path, registered or not.
    Single(PathBuf),
}

pub struct Orchestrator {
    layout: Layout,
    vcs: Box<dyn Vcs>,
    confirm: Box<dyn Confirm>,
    renderer: Renderer,
}

impl Orchestrator {
    /// Build an orchestrator around resolved collaborators. User template
    /// overrides are picked up from the layout's template directory.
    pub fn new(
        layout: Layout,
        vcs: Box<dyn Vcs>,
        confirm: Box<dyn Confirm>,
    ) -> Result<Self, SyncError> {
        let renderer = Renderer::with_overrides(Some(&layout.template_dir))?;
        Ok(Orchestrator {
            layout,
            vcs,
            confirm,
            renderer,
        })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn vcs(&self) -> &dyn Vcs {
        self.vcs.as_ref()
    }

    // -----------------------------------------------------------------------
    // Save
    // -----------------------------------------------------------------------

    /// Copy GlobalRoot into the archive of every input project (default:
    /// `cwd`), then optionally reset GlobalRoot.
    ///
    /// A failing project is recorded and skipped. Nothing to save is a
    /// successful no-op.
    pub fn save(
        &self,
        inputs: &[PathBuf],
        cwd: &Path,
        opts: SaveOptions,
    ) -> Result<SaveReport, SyncError> {
        let global = store::inspect(&self.layout.global_root)?;
        let mut report = SaveReport {
            global,
            projects: Vec::new(),
            reset: None,
            warnings: Vec::new(),
        };
        if !global.is_populated() {
            report.warnings.push(format!(
                "nothing to save: {} is {global}",
                self.layout.global_root.display()
            ));
            return Ok(report);
        }

        let defaults = [cwd.to_path_buf()];
        let inputs = if inputs.is_empty() { &defaults[..] } else { inputs };
        let saved_at = Utc::now();

        for input in inputs {
            let outcome = resolve_project_root(input, cwd, self.vcs())
                .map_err(SyncError::from)
                .and_then(|project| self.save_one(project, saved_at, !opts.no_git));
            report.projects.push(self.record_outcome(input, outcome, &mut report.warnings));
        }

        if opts.reset {
            report.reset = Some(if report.succeeded() == 0 {
                let reason = "no project was saved; GlobalRoot left in place".to_string();
                report.warnings.push(format!("reset skipped: {reason}"));
                ResetOutcome::Skipped { reason }
            } else {
                self.reset(opts.force)?
            });
        }
        Ok(report)
    }

    /// One Save-like copy step: GlobalRoot → archive, save-record, optional commit.
    fn save_one(
        &self,
        project: ProjectRoot,
        saved_at: DateTime<Utc>,
        commit: bool,
    ) -> Result<ProjectStatus, SyncError> {
        let archive = self.layout.archive_root(&project);
        self.layout.check_disjoint(&archive)?;
        std::fs::create_dir_all(&archive).map_err(|e| io_err(&archive, e))?;

        let copied = store::copy_all(&self.layout.global_root, &archive)?;
        records::write_save_record(&self.renderer, &archive, &project, saved_at, copied)?;

        let commit = if commit && self.vcs.toplevel(project.path()).is_some() {
            let message = format!(
                "chatkeep: save {copied} transcript(s) for {}",
                project.name()
            );
            self.vcs
                .commit_paths(project.path(), std::slice::from_ref(&archive), &message)
        } else {
            CommitOutcome::Skipped
        };

        Ok(ProjectStatus::Saved {
            project,
            archive,
            copied,
            commit,
        })
    }

    fn record_outcome(
        &self,
        input: &Path,
        outcome: Result<ProjectStatus, SyncError>,
        warnings: &mut Vec<String>,
    ) -> ProjectOutcome {
        let status = match outcome {
            Ok(status) => {
                if let ProjectStatus::Saved {
                    project,
                    commit: CommitOutcome::Failed(reason),
                    ..
                } = &status
                {
                    warnings.push(format!("{project}: commit failed: {reason}"));
                }
                status
            }
            Err(err) => {
                tracing::warn!("{}: {err}", input.display());
                warnings.push(format!("{}: {err}", input.display()));
                ProjectStatus::Failed {
                    reason: err.to_string(),
                }
            }
        };
        ProjectOutcome {
            input: input.to_path_buf(),
            status,
        }
    }

    // -----------------------------------------------------------------------
    // Load
    // -----------------------------------------------------------------------

    /// Restore a project's archive into GlobalRoot.
    ///
    /// Fails with [`SyncError::NoSavedTranscripts`] when the archive holds no
    /// tracked files; GlobalRoot is left untouched. Unless `no_clear`, a
    /// non-empty GlobalRoot is confirmed, snapshotted, and cleared first.
    pub fn load(
        &self,
        input: Option<&Path>,
        cwd: &Path,
        opts: LoadOptions,
    ) -> Result<LoadReport, SyncError> {
        let project = resolve_project_root(input.unwrap_or(cwd), cwd, self.vcs())?;
        let archive = self.layout.archive_root(&project);
        self.layout.check_disjoint(&archive)?;
        if !store::inspect(&archive)?.is_populated() {
            return Err(SyncError::NoSavedTranscripts { archive });
        }

        let mut backup = None;
        let mut cleared = 0;
        if !opts.no_clear {
            let global = store::inspect(&self.layout.global_root)?;
            if global.is_populated() {
                let prompt = format!(
                    "Replace {} in {} with the transcripts saved for {}?",
                    global,
                    self.layout.global_root.display(),
                    project.name()
                );
                if !opts.force && !self.confirm.confirm(&prompt) {
                    return Err(SyncError::Declined);
                }
                if let ResetOutcome::Cleared {
                    backup: snapshot,
                    removed,
                } = self.backup_and_clear()?
                {
                    backup = snapshot;
                    cleared = removed;
                }
            }
        }

        let loaded = store::copy_all(&archive, &self.layout.global_root)?;

        // GlobalRoot is already restored; a missing load-record is only a warning.
        let mut warnings = Vec::new();
        let record =
            match records::write_load_record(&self.renderer, &archive, &project, Utc::now(), loaded)
            {
                Ok((path, _)) => Some(path),
                Err(err) => {
                    tracing::warn!("{project}: load-record not written: {err}");
                    warnings.push(format!("{project}: load-record not written: {err}"));
                    None
                }
            };

        Ok(LoadReport {
            last_saved: records::last_saved(&archive),
            project,
            archive,
            loaded,
            backup,
            cleared,
            merged: opts.no_clear,
            record,
            warnings,
        })
    }

    // -----------------------------------------------------------------------
    // Switch
    // -----------------------------------------------------------------------

    /// Copy GlobalRoot into every targeted archive without touching version
    /// control, then give all of them one shared clean slate.
    ///
    /// Missing directories are counted as failed and skipped. The reset only
    /// happens when at least one project succeeded.
    pub fn switch(&self, scope: SwitchScope, cwd: &Path) -> Result<SwitchReport, SyncError> {
        let (targets, registered) = match scope {
            SwitchScope::All => (registry::entries_at(&self.layout)?, true),
            SwitchScope::Single(path) => (vec![path], false),
        };

        let global = store::inspect(&self.layout.global_root)?;
        let mut report = SwitchReport {
            global,
            projects: Vec::new(),
            reset: None,
            warnings: Vec::new(),
        };
        if !global.is_populated() {
            report.warnings.push(format!(
                "nothing to switch: {} is {global}",
                self.layout.global_root.display()
            ));
            return Ok(report);
        }

        let saved_at = Utc::now();
        for target in &targets {
            let outcome = self
                .switch_target(target, registered, cwd)
                .and_then(|project| self.save_one(project, saved_at, false));
            report
                .projects
                .push(self.record_outcome(target, outcome, &mut report.warnings));
        }

        if report.processed() > 0 {
            report.reset = Some(self.backup_and_clear()?);
        } else {
            report
                .warnings
                .push("no project was saved; GlobalRoot left in place".to_string());
        }
        Ok(report)
    }

    /// Registry entries already are canonical project roots and are used
    /// as-is; a single path is resolved like any other input.
    fn switch_target(
        &self,
        target: &Path,
        registered: bool,
        cwd: &Path,
    ) -> Result<ProjectRoot, SyncError> {
        if !registered {
            return Ok(resolve_project_root(target, cwd, self.vcs())?);
        }
        if !target.is_dir() {
            return Err(CoreError::NotADirectory {
                path: target.to_path_buf(),
            }
            .into());
        }
        Ok(ProjectRoot(target.to_path_buf()))
    }

    // -----------------------------------------------------------------------
    // Reset
    // -----------------------------------------------------------------------

    /// Confirm (unless `force`), snapshot, then clear GlobalRoot.
    pub fn reset(&self, force: bool) -> Result<ResetOutcome, SyncError> {
        let global = store::inspect(&self.layout.global_root)?;
        if !global.is_populated() {
            return Ok(ResetOutcome::NothingToReset);
        }
        let prompt = format!(
            "Clear {} from {}? A backup is taken first.",
            global,
            self.layout.global_root.display()
        );
        if !force && !self.confirm.confirm(&prompt) {
            return Ok(ResetOutcome::Declined);
        }
        self.backup_and_clear()
    }

    /// The only path that deletes from GlobalRoot.
    fn backup_and_clear(&self) -> Result<ResetOutcome, SyncError> {
        let root = &self.layout.global_root;
        let Some(snapshot) = backup::snapshot(root, Utc::now())? else {
            return Ok(ResetOutcome::NothingToReset);
        };
        let removed = store::clear(root)?;
        Ok(ResetOutcome::Cleared {
            backup: Some(snapshot),
            removed,
        })
    }

    // -----------------------------------------------------------------------
    // Status
    // -----------------------------------------------------------------------

    /// Read-only overview: GlobalRoot, snapshots, the selected project's
    /// archive, and the derived current owner.
    pub fn status(&self, input: Option<&Path>, cwd: &Path) -> Result<StatusReport, SyncError> {
        let root = &self.layout.global_root;
        let snapshots = backup::list_snapshots(root)?;

        let project = match input {
            Some(path) => Some(resolve_project_root(path, cwd, self.vcs())?),
            None => resolve_project_root(cwd, cwd, self.vcs()).ok(),
        };
        let project = project.map(|p| self.summarize(p)).transpose()?;

        let registered = match registry::entries_at(&self.layout) {
            Ok(entries) => Some(entries),
            Err(CoreError::RegistryNotFound { .. }) => None,
            Err(e) => return Err(e.into()),
        };

        let mut candidates: Vec<PathBuf> = registered.clone().unwrap_or_default();
        if let Some(summary) = &project {
            candidates.push(summary.project.path().to_path_buf());
        }
        let owner = candidates
            .into_iter()
            .filter(|p| p.is_dir())
            .filter_map(|p| {
                let archive = self.layout.archive_root(&ProjectRoot(p.clone()));
                records::last_loaded(&archive).map(|loaded_at| Owner {
                    project: p,
                    loaded_at,
                })
            })
            .max_by_key(|o| o.loaded_at);

        Ok(StatusReport {
            global_root: root.clone(),
            global: store::inspect(root)?,
            snapshots: snapshots.len(),
            latest_snapshot: snapshots.last().cloned(),
            registered: registered.map(|r| r.len()),
            project,
            owner,
        })
    }

    fn summarize(&self, project: ProjectRoot) -> Result<ProjectSummary, SyncError> {
        let archive = self.layout.archive_root(&project);
        let archived: RootState = store::inspect(&archive)?;
        Ok(ProjectSummary {
            last_saved: records::last_saved(&archive),
            last_loaded: records::last_loaded(&archive),
            project,
            archive,
            archived,
        })
    }
}
