//! Command-line interface module for downtidy.
//!
//! Collects settings, drives the engine, and presents results. Everything
//! here is presentation: the passes themselves live in [`crate::organize`],
//! [`crate::rollback`], and [`crate::quarantine`] and only ever hand back a
//! [`RunLog`].

use crate::organize::{organize, organize_dry_run};
use crate::output::OutputFormatter;
use crate::quarantine;
use crate::report::RunLog;
use crate::rollback::rollback;
use crate::settings::{Settings, SettingsFile};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Reorganize a cluttered downloads directory, reversibly.
#[derive(Debug, Parser)]
#[command(name = "downtidy", version, about)]
pub struct Cli {
    /// Operate on this directory instead of the configured downloads folder
    #[arg(long, global = true, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Path to a settings file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Classify and relocate everything at the top level of the downloads folder
    Organize {
        /// Report what would happen without moving anything
        #[arg(long)]
        dry_run: bool,

        /// Also write the plain-text run report to this file
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },
    /// Undo a previous organization: return items to the root, remove engine folders
    Rollback {
        /// Also write the plain-text run report to this file
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },
    /// Review, restore, or permanently delete quarantined items
    Quarantine {
        #[command(subcommand)]
        action: QuarantineAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum QuarantineAction {
    /// List held items with the inferred junk reason
    List,
    /// Move held items back to the downloads folder
    Restore {
        /// Names of quarantined items to restore
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,
    },
    /// Permanently delete held items (irreversible)
    Delete {
        /// Names of quarantined items to delete
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,

        /// Confirm the permanent deletion
        #[arg(long)]
        yes: bool,
    },
}

/// Runs the parsed CLI command.
pub fn run(cli: Cli) -> Result<(), String> {
    let settings = SettingsFile::load(cli.config.as_deref())
        .and_then(|file| file.resolve(cli.dir.as_deref()))
        .map_err(|e| e.to_string())?;

    match cli.command {
        Command::Organize { dry_run, report } => {
            run_organize(&settings, dry_run, report.as_deref())
        }
        Command::Rollback { report } => run_rollback(&settings, report.as_deref()),
        Command::Quarantine { action } => match action {
            QuarantineAction::List => run_quarantine_list(&settings),
            QuarantineAction::Restore { names } => run_quarantine_restore(&settings, &names),
            QuarantineAction::Delete { names, yes } => {
                run_quarantine_delete(&settings, &names, yes)
            }
        },
    }
}

fn run_organize(settings: &Settings, dry_run: bool, report: Option<&Path>) -> Result<(), String> {
    OutputFormatter::info(&format!(
        "Organizing contents of: {}",
        settings.downloads_dir.display()
    ));
    if dry_run {
        OutputFormatter::dry_run_notice("No files will be moved.");
    }

    let spinner = OutputFormatter::start_spinner("Classifying and relocating...");
    let result = if dry_run {
        organize_dry_run(settings)
    } else {
        organize(settings)
    };
    spinner.finish_and_clear();

    let log = result.map_err(|e| e.to_string())?;
    present(&log, report)?;

    if dry_run {
        OutputFormatter::dry_run_notice("Dry run complete. No files were modified.");
    } else if log.has_errors() {
        OutputFormatter::warning("Some entries could not be organized. Review the errors above.");
    } else {
        OutputFormatter::success("Organization complete. Use 'downtidy rollback' to revert.");
    }
    Ok(())
}

fn run_rollback(settings: &Settings, report: Option<&Path>) -> Result<(), String> {
    OutputFormatter::info(&format!(
        "Rolling back organization of: {}",
        settings.downloads_dir.display()
    ));

    let spinner = OutputFormatter::start_spinner("Returning items to the root...");
    let result = rollback(settings);
    spinner.finish_and_clear();

    let log = result.map_err(|e| e.to_string())?;
    present(&log, report)?;

    if log.has_errors() {
        OutputFormatter::warning("Some items could not be returned. Review the errors above.");
    } else {
        OutputFormatter::success("Rollback complete.");
    }
    Ok(())
}

fn run_quarantine_list(settings: &Settings) -> Result<(), String> {
    let entries = quarantine::list(settings).map_err(|e| e.to_string())?;
    if entries.is_empty() {
        OutputFormatter::info("Quarantine is empty.");
        return Ok(());
    }

    OutputFormatter::header(&format!("QUARANTINE ({} items)", entries.len()));
    for entry in &entries {
        println!(
            " - {} [{}] (modified {})",
            entry.name,
            entry.inferred_reason,
            entry.last_modified.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}

fn run_quarantine_restore(settings: &Settings, names: &[String]) -> Result<(), String> {
    let paths = quarantine_paths(settings, names);
    let log = quarantine::restore(settings, &paths).map_err(|e| e.to_string())?;
    present(&log, None)?;
    OutputFormatter::success("Restore complete.");
    Ok(())
}

fn run_quarantine_delete(settings: &Settings, names: &[String], yes: bool) -> Result<(), String> {
    if !yes {
        return Err(
            "deletion is permanent; pass --yes to confirm removing the selected items".to_string(),
        );
    }
    let paths = quarantine_paths(settings, names);
    let log = quarantine::delete(settings, &paths).map_err(|e| e.to_string())?;
    present(&log, None)?;
    OutputFormatter::success("Deletion complete.");
    Ok(())
}

/// Resolves bare item names against the quarantine folder.
fn quarantine_paths(settings: &Settings, names: &[String]) -> Vec<PathBuf> {
    let layout = crate::layout::EngineLayout::new(settings);
    let quarantine = layout.quarantine_dir();
    names.iter().map(|name| quarantine.join(name)).collect()
}

fn present(log: &RunLog, report: Option<&Path>) -> Result<(), String> {
    OutputFormatter::print_run_log(log);
    OutputFormatter::summary_table(log);
    if let Some(path) = report {
        log.write_to_file(path)
            .map_err(|e| format!("could not write report {}: {}", path.display(), e))?;
        OutputFormatter::info(&format!("Report written to {}", path.display()));
    }
    Ok(())
}
