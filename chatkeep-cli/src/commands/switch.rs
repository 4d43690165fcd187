//! `chatkeep switch`: registry management and the save-everywhere reset.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgGroup, Args};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use chatkeep_core::{registry, AddOutcome, InitOutcome, RegistryEntry, RemoveOutcome};
use chatkeep_sync::{Orchestrator, ProjectStatus, ResetOutcome, SwitchScope};

use crate::output::{self, plural};

/// Arguments for `chatkeep switch`. Exactly one action flag is required.
#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("action")
        .required(true)
        .args(["init", "add", "remove", "list", "all", "single", "reset"]),
))]
pub struct SwitchArgs {
    /// Create the project registry.
    #[arg(long)]
    pub init: bool,

    /// Register a project directory.
    #[arg(long, value_name = "PATH")]
    pub add: Option<PathBuf>,

    /// Unregister a project directory (it may no longer exist).
    #[arg(long, value_name = "PATH")]
    pub remove: Option<PathBuf>,

    /// List registered projects.
    #[arg(long)]
    pub list: bool,

    /// Save into every registered project, then back up and clear.
    #[arg(long)]
    pub all: bool,

    /// Save into one project, then back up and clear.
    #[arg(long, value_name = "PATH")]
    pub single: Option<PathBuf>,

    /// Back up and clear the active transcripts.
    #[arg(long)]
    pub reset: bool,

    /// Do not ask before `--reset`.
    #[arg(short = 'y', long)]
    pub force: bool,
}

impl SwitchArgs {
    pub fn run(self) -> Result<ExitCode> {
        let orchestrator = super::orchestrator()?;
        let cwd = super::cwd()?;
        let layout = orchestrator.layout();

        if self.init {
            match registry::init_at(layout).context("failed to create registry")? {
                InitOutcome::Created { path } => {
                    output::success(&format!("created registry at {}", path.display()));
                }
                InitOutcome::AlreadyExists { path, contents } => {
                    print!("{contents}");
                    output::success(&format!("registry already exists at {}", path.display()));
                }
            }
        } else if let Some(path) = self.add {
            match registry::add_at(layout, &path, &cwd, orchestrator.vcs())
                .with_context(|| format!("failed to register {}", path.display()))?
            {
                AddOutcome::Added(root) => output::success(&format!("registered {root}")),
                AddOutcome::AlreadyPresent(root) => {
                    output::warning(&format!("{root} is already registered"));
                    output::success("registry unchanged");
                }
            }
        } else if let Some(path) = self.remove {
            match registry::remove_at(layout, &path, &cwd, orchestrator.vcs())
                .with_context(|| format!("failed to unregister {}", path.display()))?
            {
                RemoveOutcome::Removed { key, count } => {
                    output::success(&format!("unregistered {key} ({})", plural(count, "line")));
                }
                RemoveOutcome::NotFound { key } => {
                    output::warning(&format!("{key} is not registered"));
                    output::success("registry unchanged");
                }
            }
        } else if self.list {
            let entries = registry::list_at(layout)
                .context("failed to read registry; run `chatkeep switch --init` first")?;
            print_list(&entries);
        } else if self.all {
            return switch(&orchestrator, SwitchScope::All, &cwd);
        } else if let Some(path) = self.single {
            return switch(&orchestrator, SwitchScope::Single(path), &cwd);
        } else if self.reset {
            let outcome = orchestrator.reset(self.force).context("reset failed")?;
            return Ok(super::reset::report(&outcome));
        }
        Ok(ExitCode::SUCCESS)
    }
}

fn switch(orchestrator: &Orchestrator, scope: SwitchScope, cwd: &Path) -> Result<ExitCode> {
    let report = orchestrator.switch(scope, cwd).context("switch failed")?;

    for outcome in &report.projects {
        match &outcome.status {
            ProjectStatus::Saved {
                project, copied, ..
            } => println!(
                "  {} {project}: {}",
                "✓".green(),
                plural(*copied, "transcript")
            ),
            ProjectStatus::Failed { .. } => {
                println!("  {} {}", "✗".red(), outcome.input.display())
            }
        }
    }
    output::warnings(&report.warnings);

    if report.projects.is_empty() {
        output::success("nothing to switch");
        return Ok(ExitCode::SUCCESS);
    }
    if let Some(ResetOutcome::Cleared {
        backup: Some(backup),
        ..
    }) = &report.reset
    {
        println!("  backup: {}", backup.display());
    }

    let summary = format!(
        "{} processed, {} failed",
        plural(report.processed(), "project"),
        report.failed()
    );
    if report.processed() == 0 {
        output::failure(&summary);
        return Ok(ExitCode::FAILURE);
    }
    output::success(&summary);
    Ok(ExitCode::SUCCESS)
}

#[derive(Tabled)]
struct RegistryRow {
    #[tabled(rename = "project")]
    path: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "archived")]
    archived: usize,
}

fn print_list(entries: &[RegistryEntry]) {
    if entries.is_empty() {
        println!("No projects registered.");
        println!("Run: chatkeep switch --add <path>");
        return;
    }

    let rows: Vec<RegistryRow> = entries
        .iter()
        .map(|entry| RegistryRow {
            path: entry.path.display().to_string(),
            status: if entry.exists { "ok" } else { "missing" }.to_string(),
            archived: entry.tracked_files,
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    let missing = entries.iter().filter(|e| !e.exists).count();
    if missing > 0 {
        output::warning(&format!(
            "{missing} registered path(s) no longer exist; remove with `chatkeep switch --remove <path>`"
        ));
    }
}
