//! `chatkeep reset`: back up and clear the active transcripts.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use chatkeep_sync::ResetOutcome;

use crate::output::{self, plural};
use crate::EXIT_DECLINED;

#[derive(Args, Debug)]
pub struct ResetArgs {
    /// Do not ask first.
    #[arg(short = 'y', long)]
    pub force: bool,
}

impl ResetArgs {
    pub fn run(self) -> Result<ExitCode> {
        let orchestrator = super::orchestrator()?;
        let outcome = orchestrator.reset(self.force).context("reset failed")?;
        Ok(report(&outcome))
    }
}

/// Print the summary for a reset and pick the exit status.
pub fn report(outcome: &ResetOutcome) -> ExitCode {
    match outcome {
        ResetOutcome::Cleared { backup, removed } => {
            let mut summary = format!("cleared {}", plural(*removed, "transcript"));
            if let Some(backup) = backup {
                summary.push_str(&format!(" (backup: {})", backup.display()));
            }
            output::success(&summary);
            ExitCode::SUCCESS
        }
        ResetOutcome::NothingToReset => {
            output::success("nothing to reset");
            ExitCode::SUCCESS
        }
        ResetOutcome::Declined => {
            output::failure("declined; nothing was changed");
            ExitCode::from(EXIT_DECLINED)
        }
        ResetOutcome::Skipped { reason } => {
            output::warning(reason);
            output::success("reset skipped");
            ExitCode::SUCCESS
        }
    }
}
