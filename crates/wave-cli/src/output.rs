//! Terminal output formatting utilities.

use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use wave_core::OperationKind;

static QUIET_MODE: AtomicBool = AtomicBool::new(false);

/// Set quiet mode globally. Call once at startup.
pub fn set_quiet(quiet: bool) {
    QUIET_MODE.store(quiet, Ordering::Relaxed);
}

fn is_quiet() -> bool {
    QUIET_MODE.load(Ordering::Relaxed)
}

/// Print a success message (suppressed in quiet mode).
pub fn success(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "✓".green(), msg);
    }
}

/// Print an error message (always prints to stderr).
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a warning message (always prints to stderr).
pub fn warn(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print an info message (suppressed in quiet mode).
pub fn info(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "→".blue(), msg);
    }
}

/// Print a detail line without prefix (suppressed in quiet mode).
///
/// Use for indented detail lines that accompany info or warn messages.
pub fn detail(msg: &str) {
    if !is_quiet() {
        println!("{msg}");
    }
}

/// Print essential machine-readable output (always prints).
///
/// Use for results that should be available for piping, like PR URLs.
pub fn essential(msg: &str) {
    println!("{msg}");
}

/// Marker shown in front of a planned operation.
#[must_use]
pub fn operation_marker(kind: OperationKind) -> String {
    match kind {
        OperationKind::Create => "+".green().to_string(),
        OperationKind::Update => "~".yellow().to_string(),
        OperationKind::Delete => "-".red().to_string(),
    }
}

/// Print one planned operation, indented under its repository.
pub fn planned(kind: OperationKind, description: &str) {
    detail(&format!("    {} {description}", operation_marker(kind)));
}

/// Print a horizontal line (suppressed in quiet mode).
pub fn hr() {
    if !is_quiet() {
        println!("{}", "─".repeat(50).dimmed());
    }
}
