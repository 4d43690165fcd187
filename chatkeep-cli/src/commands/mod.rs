pub mod load;
pub mod reset;
pub mod save;
pub mod status;
pub mod switch;

use std::path::PathBuf;

use anyhow::{Context, Result};

use chatkeep_core::{GitCli, Layout};
use chatkeep_sync::Orchestrator;

use crate::prompt::TerminalConfirm;

/// Resolve the layout from `$HOME` and build an orchestrator wired to git and
/// the terminal.
pub fn orchestrator() -> Result<Orchestrator> {
    let layout = Layout::resolve().context("failed to resolve chatkeep layout")?;
    Orchestrator::new(layout, Box::new(GitCli::default()), Box::new(TerminalConfirm))
        .context("failed to load record templates")
}

pub fn cwd() -> Result<PathBuf> {
    std::env::current_dir().context("could not determine current directory")
}
