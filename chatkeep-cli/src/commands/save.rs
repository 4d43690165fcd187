//! `chatkeep save`: copy the active transcripts into project archives.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use chatkeep_core::CommitOutcome;
use chatkeep_sync::{ProjectStatus, ResetOutcome, SaveOptions};

use crate::output::{self, plural};
use crate::EXIT_DECLINED;

/// Arguments for `chatkeep save`.
#[derive(Args, Debug)]
pub struct SaveArgs {
    /// Project directories to save into. Defaults to the current directory.
    pub paths: Vec<PathBuf>,

    /// Back up and clear the active transcripts afterwards.
    #[arg(long)]
    pub reset: bool,

    /// Do not commit the archive, even inside a git repository.
    #[arg(long)]
    pub no_git: bool,

    /// Do not ask before resetting.
    #[arg(short = 'y', long)]
    pub force: bool,

    /// Only print warnings, errors, and the summary line.
    #[arg(short, long)]
    pub quiet: bool,
}

impl SaveArgs {
    pub fn run(self) -> Result<ExitCode> {
        let orchestrator = super::orchestrator()?;
        let cwd = super::cwd()?;
        let opts = SaveOptions {
            reset: self.reset,
            no_git: self.no_git,
            force: self.force,
        };
        let report = orchestrator
            .save(&self.paths, &cwd, opts)
            .context("save failed")?;

        output::warnings(&report.warnings);
        if report.nothing_to_save() {
            output::success("nothing to save");
            return Ok(ExitCode::SUCCESS);
        }

        for outcome in &report.projects {
            if let ProjectStatus::Saved {
                project,
                archive,
                copied,
                commit,
            } = &outcome.status
            {
                output::progress(
                    self.quiet,
                    &format!(
                        "  {project}: {} → {}{}",
                        plural(*copied, "transcript"),
                        archive.display(),
                        commit_note(commit)
                    ),
                );
            }
        }

        let mut declined = false;
        match &report.reset {
            Some(ResetOutcome::Cleared { backup, removed }) => {
                if let Some(backup) = backup {
                    output::progress(self.quiet, &format!("  backup: {}", backup.display()));
                }
                output::progress(
                    self.quiet,
                    &format!("  cleared {} from the active set", plural(*removed, "transcript")),
                );
            }
            Some(ResetOutcome::Declined) => declined = true,
            _ => {}
        }

        if report.succeeded() == 0 {
            output::failure(&format!(
                "nothing saved ({} failed)",
                plural(report.failed(), "project")
            ));
            return Ok(ExitCode::FAILURE);
        }

        let mut summary = format!("saved to {}", plural(report.succeeded(), "project"));
        if report.failed() > 0 {
            summary.push_str(&format!(", {} failed", report.failed()));
        }
        output::success(&summary);

        if declined {
            output::failure("reset declined; active transcripts kept");
            return Ok(ExitCode::from(EXIT_DECLINED));
        }
        Ok(ExitCode::SUCCESS)
    }
}

fn commit_note(commit: &CommitOutcome) -> &'static str {
    match commit {
        CommitOutcome::Committed => " (committed)",
        CommitOutcome::NothingToCommit => " (no changes to commit)",
        CommitOutcome::Failed(_) => " (commit failed)",
        CommitOutcome::Skipped => "",
    }
}
