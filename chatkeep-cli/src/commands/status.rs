//! `chatkeep status`: read-only overview of the active set and the archives.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;

use chatkeep_sync::StatusReport;

/// Arguments for `chatkeep status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Project to summarize. Defaults to the current directory.
    pub path: Option<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self) -> Result<ExitCode> {
        let orchestrator = super::orchestrator()?;
        let cwd = super::cwd()?;
        let report = orchestrator
            .status(self.path.as_deref(), &cwd)
            .context("status failed")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize status JSON")?
            );
        } else {
            print_human(&report);
        }
        Ok(ExitCode::SUCCESS)
    }
}

fn print_human(report: &StatusReport) {
    println!("chatkeep v{}", env!("CARGO_PKG_VERSION"));
    row(
        "active",
        format!("{} ({})", report.global_root.display(), report.global),
    );

    let backups = match &report.latest_snapshot {
        Some(latest) => format!("{} (latest: {})", report.snapshots, latest.display()),
        None => "none".to_string(),
    };
    row("backups", backups);

    let registry = match report.registered {
        Some(n) => format!("{n} project(s)"),
        None => "not initialized (chatkeep switch --init)".to_string(),
    };
    row("registry", registry);

    let owner = match &report.owner {
        Some(owner) => format!(
            "{} (loaded {})",
            owner.project.display(),
            when(Some(owner.loaded_at))
        ),
        None => "unknown".to_string(),
    };
    row("owner", owner);

    match &report.project {
        Some(summary) => {
            println!();
            println!("{}", summary.project.name().to_string().bold());
            row("archive", format!("{} ({})", summary.archive.display(), summary.archived));
            row("saved", when(summary.last_saved));
            row("loaded", when(summary.last_loaded));
        }
        None => {
            println!();
            println!("{}", "not inside a project directory".bright_black());
        }
    }
}

fn row(label: &str, value: String) {
    let label = format!("{:<10}", format!("{label}:"));
    println!("{} {value}", label.bright_black());
}

fn when(at: Option<DateTime<Utc>>) -> String {
    at.map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "never".to_string())
}
