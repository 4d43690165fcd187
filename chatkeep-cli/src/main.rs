//! chatkeep: save, restore, and switch conversation transcripts per project.
//!
//! # Usage
//!
//! ```text
//! chatkeep save [PATH]... [--reset] [--no-git] [-y|--force] [-q|--quiet]
//! chatkeep load [PATH] [--no-clear] [-y|--force] [-q|--quiet]
//! chatkeep switch --init | --add <PATH> | --remove <PATH> | --list | --all | --single <PATH> | --reset
//! chatkeep reset [-y|--force]
//! chatkeep status [PATH] [--json]
//! ```
//!
//! Exit codes: 0 success, 1 error, 2 a confirmation was declined.

mod commands;
mod output;
mod prompt;

use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use chatkeep_sync::SyncError;
use commands::{
    load::LoadArgs, reset::ResetArgs, save::SaveArgs, status::StatusArgs, switch::SwitchArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "chatkeep",
    version,
    about = "Keep conversation transcripts with the project they belong to",
    long_about = None,
)]
struct Cli {
    /// Log more (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Copy the active transcripts into one or more project archives.
    Save(SaveArgs),

    /// Restore a project's archived transcripts as the active set.
    Load(LoadArgs),

    /// Manage the project registry, or save everywhere and start fresh.
    Switch(SwitchArgs),

    /// Back up and clear the active transcripts.
    Reset(ResetArgs),

    /// Show active transcripts, backups, and the current project's archive.
    Status(StatusArgs),
}

/// Exit status for a declined confirmation.
pub const EXIT_DECLINED: u8 = 2;

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Usage errors exit 1; 2 is reserved for declined prompts.
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_logging(cli.verbose);

    let result: Result<ExitCode> = match cli.command {
        Commands::Save(args) => args.run(),
        Commands::Load(args) => args.run(),
        Commands::Switch(args) => args.run(),
        Commands::Reset(args) => args.run(),
        Commands::Status(args) => args.run(),
    };

    match result {
        Ok(code) => code,
        Err(err) if matches!(err.downcast_ref::<SyncError>(), Some(SyncError::Declined)) => {
            output::failure("declined; nothing was changed");
            ExitCode::from(EXIT_DECLINED)
        }
        Err(err) => {
            output::error(&err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "error",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
