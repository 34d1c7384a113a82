//! Progress reporting for the repository scan
//!
//! Provides a live spinner using indicatif and an end-of-scan summary. Both
//! draw on stderr so that stdout carries only results.

use crate::walker::{ScanProgress, ScanResult};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter that displays scan status
#[derive(Clone)]
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update the progress display
    pub fn update(&self, progress: &ScanProgress) {
        let msg = format!(
            "Dirs: {} | Repos: {} | Unreadable: {} | Rate: {:.0}/s",
            format_number(progress.dirs),
            format_number(progress.repos),
            format_number(progress.unreadable),
            progress.dirs_per_second(),
        );

        self.bar.set_message(msg);
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a summary of the scan to stderr
pub fn print_summary(result: &ScanResult) {
    let heading = if result.completed {
        style("Scan Complete").green().bold()
    } else {
        style("Scan Interrupted").yellow().bold()
    };

    eprintln!();
    eprintln!("{}", heading);
    eprintln!("{}", style("─".repeat(50)).dim());
    eprintln!("  {} {}", style("Root:").bold(), result.root.display());
    eprintln!(
        "  {} {}",
        style("Repositories:").bold(),
        format_number(result.repos.len() as u64)
    );
    eprintln!(
        "  {} {}",
        style("Directories:").bold(),
        format_number(result.dirs_visited)
    );
    if result.unreadable > 0 {
        eprintln!(
            "  {} {}",
            style("Unreadable:").yellow().bold(),
            format_number(result.unreadable)
        );
    }
    if result.excluded > 0 {
        eprintln!(
            "  {} {}",
            style("Excluded:").bold(),
            format_number(result.excluded)
        );
    }
    if result.metadata_failures > 0 {
        eprintln!(
            "  {} {}",
            style("No metadata:").yellow().bold(),
            format_number(result.metadata_failures)
        );
    }
    eprintln!(
        "  {} {:.2}s ({} workers)",
        style("Duration:").bold(),
        result.duration.as_secs_f64(),
        result.workers
    );
    eprintln!();
}
