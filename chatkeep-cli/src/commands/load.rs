//! `chatkeep load`: restore a project's archive as the active transcripts.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use chatkeep_sync::LoadOptions;

use crate::output::{self, plural};

/// Arguments for `chatkeep load`.
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Project directory to restore from. Defaults to the current directory.
    pub path: Option<PathBuf>,

    /// Keep the active transcripts and copy the archive over them.
    #[arg(long)]
    pub no_clear: bool,

    /// Do not ask before clearing the active transcripts.
    #[arg(short = 'y', long)]
    pub force: bool,

    /// Only print warnings, errors, and the summary line.
    #[arg(short, long)]
    pub quiet: bool,
}

impl LoadArgs {
    pub fn run(self) -> Result<ExitCode> {
        let orchestrator = super::orchestrator()?;
        let cwd = super::cwd()?;
        let opts = LoadOptions {
            no_clear: self.no_clear,
            force: self.force,
        };
        let report = orchestrator
            .load(self.path.as_deref(), &cwd, opts)
            .context("load failed")?;

        if let Some(backup) = &report.backup {
            output::progress(
                self.quiet,
                &format!(
                    "  backed up {} to {}",
                    plural(report.cleared, "transcript"),
                    backup.display()
                ),
            );
        }
        if report.merged {
            output::progress(self.quiet, "  merged into the existing active transcripts");
        }
        let last_saved = report
            .last_saved
            .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        output::progress(self.quiet, &format!("  last saved: {last_saved}"));
        if let Some(record) = &report.record {
            output::progress(self.quiet, &format!("  context: {}", record.display()));
        }
        output::warnings(&report.warnings);

        output::success(&format!(
            "loaded {} for {}",
            plural(report.loaded, "transcript"),
            report.project.name()
        ));
        Ok(ExitCode::SUCCESS)
    }
}
