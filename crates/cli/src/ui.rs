//! UI helpers for the sentinel CLI.
//!
//! Provides consistent formatting for console output during watches.

use colored::Colorize;
use sentinel::{FinalState, PollResult, PollState, WaitOutcome};

/// Print a section header.
pub fn print_section(title: &str) {
    println!();
    println!("{}", "═".repeat(70).bright_black());
    println!("{}", title.cyan().bold());
    println!("{}", "═".repeat(70).bright_black());
    println!();
}

/// Print a progress step with step number.
pub fn print_progress_step(current: u8, total: u8, message: &str) {
    println!(
        "{} {} {}",
        format!("[{current}/{total}]").bright_black(),
        "▶".cyan(),
        message.bold()
    );
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message.yellow());
}

/// Print an error message.
pub fn print_error(message: &str) {
    println!("{} {}", "✗".red().bold(), message.red());
}

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print prerequisite check result.
pub fn print_check_result(name: &str, passed: bool, message: Option<&str>) {
    let status = if passed { "✓".green() } else { "✗".red() };

    let text = if let Some(msg) = message {
        format!("{name} - {msg}")
    } else {
        name.to_string()
    };

    println!("  {status} {text}");
}

/// Print one poll observation.
pub fn print_poll(poll: u32, result: &PollResult) {
    let state = match result.state {
        PollState::Ready => "ready".green(),
        PollState::Failed => "failed".red(),
        PollState::Pending => "pending".yellow(),
        PollState::Unknown => "unknown".bright_black(),
    };

    println!(
        "  {} poll {:>3}: {} {}",
        "⟳".cyan(),
        poll,
        state,
        format!("({})", result.detail).bright_black()
    );
}

/// Print the final summary line for a wait.
pub fn print_wait_summary(outcome: &WaitOutcome) {
    let line = format!(
        "{} {} after {}s ({} polls)",
        outcome.resource,
        outcome.state,
        outcome.elapsed.as_secs(),
        outcome.polls
    );

    match outcome.state {
        FinalState::Ready => print_success(&line),
        FinalState::TimedOut => print_warning(&line),
        FinalState::Failed => print_error(&line),
    }

    if !outcome.detail.is_empty() {
        print_info(&format!("Last status: {}", outcome.detail));
    }
}
