//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output: colored status
//! messages, a spinner while a pass runs, run-log rendering, and a summary
//! table of actions by kind. The engine itself never prints; everything a
//! pass did arrives here as a [`RunLog`].

use crate::report::{ActionKind, RunLog};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Manages all CLI output with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Returns a ticking spinner shown while a pass runs.
    pub fn start_spinner(message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("Invalid spinner template"),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    }

    /// Prints every record of a run log, colored by kind.
    pub fn print_run_log(log: &RunLog) {
        if log.is_empty() {
            Self::info("Nothing to do.");
            return;
        }
        for record in log.records() {
            let line = record.render();
            match record.kind {
                ActionKind::Warning => println!("{}", line.yellow()),
                ActionKind::Error => eprintln!("{}", line.red()),
                _ => println!("{}", line),
            }
        }
    }

    /// Prints a summary table of record counts by action kind.
    pub fn summary_table(log: &RunLog) {
        let counts = log.counts_by_kind();
        if counts.is_empty() {
            return;
        }

        Self::header("SUMMARY");

        let mut kinds: Vec<_> = counts.iter().collect();
        kinds.sort_by_key(|&(name, _)| name);

        let width = kinds
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(6); // at least "Action" width

        println!(
            "{:<width$} | {}",
            "Action".bold(),
            "Count".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));

        for (kind, count) in &kinds {
            println!(
                "{:<width$} | {}",
                kind,
                count.to_string().green(),
                width = width
            );
        }

        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {}",
            "Total".bold(),
            log.records().len().to_string().green().bold(),
            width = width
        );
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}
