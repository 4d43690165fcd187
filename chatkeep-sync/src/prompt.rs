//! Confirmation seam for destructive steps.
//!
//! The orchestrator asks before clearing GlobalRoot unless the caller passed
//! `force`. The CLI answers from the terminal; tests answer with closures.

/// Answers a yes/no question about a destructive step.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Declines everything. The safe default when no terminal is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysDecline;

impl Confirm for AlwaysDecline {
    fn confirm(&self, prompt: &str) -> bool {
        tracing::info!("declined without asking: {prompt}");
        false
    }
}
