//! Shared console output: progress on stdout, warnings and errors on stderr.

use colored::Colorize;

pub fn progress(quiet: bool, message: &str) {
    if !quiet {
        println!("{message}");
    }
}

pub fn warning(message: &str) {
    eprintln!("{} {message}", "warning:".yellow().bold());
}

pub fn warnings(messages: &[String]) {
    for message in messages {
        warning(message);
    }
}

/// Final line of a successful command.
pub fn success(message: &str) {
    println!("{} {message}", "✓".green().bold());
}

/// Final line of a command that did not do what was asked.
pub fn failure(message: &str) {
    eprintln!("{} {message}", "✗".red().bold());
}

pub fn error(err: &anyhow::Error) {
    eprintln!("{} {err:#}", "error:".red().bold());
}

/// `n thing` / `n things`.
pub fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}
