//! Colored CLI display utilities.
//!
//! Formatting helpers return plain strings so they can be tested; the
//! `print_*` functions add color and write to stdout.

use std::io::{self, Write};
use std::time::SystemTime;

use chrono::{DateTime, Local, Utc};
use owo_colors::OwoColorize;

use crate::process::{ProcessState, ProcessStatus};
use crate::tailer::{TailState, TailStats};

/// Get current timestamp in the same format as tracing.
fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Format a modification time in local time, or `-` when unknown.
#[must_use]
pub fn format_modified(modified: Option<SystemTime>) -> String {
    modified.map_or_else(
        || "-".to_string(),
        |time| {
            DateTime::<Local>::from(time)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        },
    )
}

/// Format a byte count with thousands separators.
#[must_use]
pub fn format_bytes(size: u64) -> String {
    let digits = size.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    format!("{out} bytes")
}

/// Render cached lines, optionally prefixed with `{n:4} | `.
#[must_use]
pub fn format_lines(state: &TailState, line_numbers: bool) -> String {
    let mut out = String::new();
    if line_numbers {
        for (number, line) in state.numbered_lines() {
            out.push_str(&format!("{number:4} | {line}\n"));
        }
    } else {
        for line in state.lines() {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// Print the file header: path, size, modification time, lines shown.
pub fn print_file_info(state: &TailState) {
    println!(
        "{} {} size={}, modified={}, lines={}",
        "[FILE]".blue().bold(),
        state.path().display().cyan(),
        format_bytes(state.size()),
        format_modified(state.modified()),
        state.lines().len()
    );
    let _ = io::stdout().flush();
}

/// Print the tailed lines.
pub fn print_lines(state: &TailState, line_numbers: bool) {
    if state.lines().is_empty() {
        println!("{}", "No content to display".dimmed());
    } else {
        print!("{}", format_lines(state, line_numbers));
    }
    let _ = io::stdout().flush();
}

/// Print a process status line.
pub fn print_status(status: &ProcessStatus) {
    let state = match status.state {
        ProcessState::Running => status.state.to_string().green().bold().to_string(),
        ProcessState::Stopped => status.state.to_string().yellow().bold().to_string(),
        ProcessState::NotStarted => status.state.to_string().dimmed().to_string(),
    };
    let pid = status
        .pid
        .map_or_else(|| "-".to_string(), |pid| pid.to_string());
    let exit_code = status
        .exit_code
        .map_or_else(|| "-".to_string(), |code| code.to_string());
    println!(
        "{} {} {} pid={}, runtime={:.1}s, exit_code={}",
        timestamp().dimmed(),
        "[PROCESS]".magenta().bold(),
        state,
        pid,
        status.runtime.as_secs_f64(),
        exit_code
    );
    let _ = io::stdout().flush();
}

/// Print output statistics.
pub fn print_stats(stats: &TailStats) {
    println!(
        "{} lines={}, chars={}, avg_line_length={:.1}",
        "[STATS]".cyan().bold(),
        stats.lines,
        stats.total_chars,
        stats.avg_line_length
    );
    let _ = io::stdout().flush();
}

/// Print an error message.
pub fn print_error(message: &str) {
    println!("{} {}", "[ERROR]".red().bold(), message);
    let _ = io::stdout().flush();
}
