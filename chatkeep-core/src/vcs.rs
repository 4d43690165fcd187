//! Version-control seam.
//!
//! The orchestrator never shells out directly: it is handed a `Box<dyn Vcs>`
//! once, at construction. [`GitCli`] is the production implementation,
//! [`NoVcs`] treats every directory as unversioned.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::error::CoreError;
use crate::types::CommitOutcome;

pub trait Vcs {
    /// Top-level directory of the working tree containing `path`, if any.
    fn toplevel(&self, path: &Path) -> Option<PathBuf>;

    /// Stage and commit exactly `paths` inside `repo`. Never stages anything
    /// else in the working tree.
    fn commit_paths(&self, repo: &Path, paths: &[PathBuf], message: &str) -> CommitOutcome;
}

/// No version control: nothing is a working tree, nothing is committed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVcs;

impl Vcs for NoVcs {
    fn toplevel(&self, _path: &Path) -> Option<PathBuf> {
        None
    }

    fn commit_paths(&self, _repo: &Path, _paths: &[PathBuf], _message: &str) -> CommitOutcome {
        CommitOutcome::Skipped
    }
}

/// Shells out to the `git` executable found on `PATH`.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
}

impl Default for GitCli {
    fn default() -> Self {
        GitCli {
            program: PathBuf::from("git"),
        }
    }
}

impl GitCli {
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        GitCli {
            program: program.into(),
        }
    }

    fn run(&self, repo: &Path, args: &[&str], paths: &[PathBuf]) -> Result<Output, CoreError> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-C").arg(repo).args(args);
        if !paths.is_empty() {
            cmd.arg("--").args(paths);
        }
        cmd.output().map_err(|e| CoreError::Vcs {
            command: format!("git {}", args.join(" ")),
            stderr: e.to_string(),
        })
    }

    fn run_checked(&self, repo: &Path, args: &[&str], paths: &[PathBuf]) -> Result<Output, CoreError> {
        let output = self.run(repo, args, paths)?;
        if output.status.success() {
            return Ok(output);
        }
        Err(CoreError::Vcs {
            command: format!("git {}", args.join(" ")),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }

    fn try_commit(&self, repo: &Path, paths: &[PathBuf], message: &str) -> Result<CommitOutcome, CoreError> {
        self.run_checked(repo, &["add"], paths)?;

        // Exit status 0 means nothing under `paths` is staged.
        let staged = self.run(repo, &["diff", "--cached", "--quiet"], paths)?;
        if staged.status.success() {
            return Ok(CommitOutcome::NothingToCommit);
        }

        self.run_checked(repo, &["commit", "--quiet", "-m", message], paths)?;
        Ok(CommitOutcome::Committed)
    }
}

impl Vcs for GitCli {
    fn toplevel(&self, path: &Path) -> Option<PathBuf> {
        let output = self.run(path, &["rev-parse", "--show-toplevel"], &[]).ok()?;
        if !output.status.success() {
            return None;
        }
        let top = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if top.is_empty() {
            None
        } else {
            Some(PathBuf::from(top))
        }
    }

    fn commit_paths(&self, repo: &Path, paths: &[PathBuf], message: &str) -> CommitOutcome {
        match self.try_commit(repo, paths, message) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!("commit in {} failed: {err}", repo.display());
                CommitOutcome::Failed(err.to_string())
            }
        }
    }
}
