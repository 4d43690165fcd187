//! Terminal answers for confirmation prompts.

use std::io::{BufRead, IsTerminal, Write};

use chatkeep_sync::Confirm;

/// Asks on stderr and reads a y/N answer from stdin. Without a terminal on
/// stdin the answer is always no; pass `--force` in scripts.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        let stdin = std::io::stdin();
        if !stdin.is_terminal() {
            crate::output::warning(&format!("{prompt} (no terminal; pass --force to proceed)"));
            return false;
        }

        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "{prompt} [y/N] ");
        let _ = stderr.flush();

        let mut answer = String::new();
        if stdin.lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
