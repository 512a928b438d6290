//! The run log: an ordered, append-only trail of everything a pass did.
//!
//! Every pass builds a [`RunLog`] and returns it to the caller; nothing in
//! the engine writes to a shared buffer. Records are created once and never
//! mutated. Rendering to a plain timestamped text report is provided here,
//! but where that text goes is the caller's business.

use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

/// What kind of action a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// File moved to the quarantine folder.
    Quarantined,
    /// File moved to an archive subfolder for age.
    Archived,
    /// File moved into its category folder.
    Categorized,
    /// Stale directory moved into the old-folders archive.
    FolderArchived,
    /// File that aged out inside a category folder, migrated to the archive.
    AgePromoted,
    /// Item moved back to the root during rollback.
    Returned,
    /// Item restored from quarantine on request.
    Restored,
    /// Item permanently deleted from quarantine on request.
    Deleted,
    /// Empty engine directory removed.
    FolderRemoved,
    /// Something worth telling the user, but not a failure.
    Warning,
    /// An entry-level failure; the run continued.
    Error,
}

impl ActionKind {
    /// Uppercase label used in the text report.
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Quarantined => "QUARANTINED",
            ActionKind::Archived => "ARCHIVED",
            ActionKind::Categorized => "CATEGORIZED",
            ActionKind::FolderArchived => "FOLDER ARCHIVED",
            ActionKind::AgePromoted => "AGE PROMOTED",
            ActionKind::Returned => "RETURNED",
            ActionKind::Restored => "RESTORED",
            ActionKind::Deleted => "DELETED",
            ActionKind::FolderRemoved => "FOLDER REMOVED",
            ActionKind::Warning => "WARNING",
            ActionKind::Error => "ERROR",
        }
    }

    /// Whether this record describes an actual filesystem change.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, ActionKind::Warning | ActionKind::Error)
    }
}

/// One immutable entry in the run log.
#[derive(Debug, Clone)]
pub struct ActionRecord {
    pub kind: ActionKind,
    /// Name of the entry the action concerned.
    pub name: String,
    /// Destination folder, relative to the root, when the action moved something.
    pub destination: Option<String>,
    pub reason: Option<String>,
    pub timestamp: DateTime<Local>,
}

impl ActionRecord {
    /// The single well-typed constructor both passes use.
    pub fn new(
        kind: ActionKind,
        name: impl Into<String>,
        destination: Option<String>,
        reason: Option<String>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            destination,
            reason,
            timestamp: Local::now(),
        }
    }

    /// Renders one report line, e.g.
    /// `[2026-08-23 10:15:00] QUARANTINED: "notes_backup.txt" -> _quarantine_review (junk keyword ('backup'))`
    pub fn render(&self) -> String {
        let mut line = format!(
            "[{}] {}: \"{}\"",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.kind.label(),
            self.name
        );
        if let Some(destination) = &self.destination {
            line.push_str(&format!(" -> {}", destination));
        }
        if let Some(reason) = &self.reason {
            line.push_str(&format!(" ({})", reason));
        }
        line
    }
}

/// Which pass produced a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Organize,
    DryRun,
    Rollback,
    QuarantineRestore,
    QuarantineDelete,
}

impl RunKind {
    pub fn label(&self) -> &'static str {
        match self {
            RunKind::Organize => "ORGANIZE",
            RunKind::DryRun => "ORGANIZE (DRY RUN)",
            RunKind::Rollback => "ROLLBACK",
            RunKind::QuarantineRestore => "QUARANTINE RESTORE",
            RunKind::QuarantineDelete => "QUARANTINE DELETE",
        }
    }
}

/// Ordered sequence of action records for one run.
#[derive(Debug)]
pub struct RunLog {
    kind: RunKind,
    started: DateTime<Local>,
    records: Vec<ActionRecord>,
}

impl RunLog {
    pub fn new(kind: RunKind) -> Self {
        Self {
            kind,
            started: Local::now(),
            records: Vec::new(),
        }
    }

    pub fn kind(&self) -> RunKind {
        self.kind
    }

    pub fn records(&self) -> &[ActionRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends one record.
    pub fn push(
        &mut self,
        kind: ActionKind,
        name: impl Into<String>,
        destination: Option<String>,
        reason: Option<String>,
    ) {
        self.records
            .push(ActionRecord::new(kind, name, destination, reason));
    }

    /// Appends a warning about one entry.
    pub fn warn(&mut self, name: impl Into<String>, reason: impl Into<String>) {
        self.push(ActionKind::Warning, name, None, Some(reason.into()));
    }

    /// Appends an entry-level error with the attempted destination.
    pub fn error(
        &mut self,
        name: impl Into<String>,
        destination: Option<String>,
        reason: impl Into<String>,
    ) {
        self.push(ActionKind::Error, name, destination, Some(reason.into()));
    }

    /// Number of records describing actual filesystem changes.
    pub fn mutation_count(&self) -> usize {
        self.records.iter().filter(|r| r.kind.is_mutation()).count()
    }

    /// Whether any entry-level errors were recorded.
    pub fn has_errors(&self) -> bool {
        self.records.iter().any(|r| r.kind == ActionKind::Error)
    }

    /// Record counts grouped by kind label, for the summary table.
    pub fn counts_by_kind(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for record in &self.records {
            *counts.entry(record.kind.label().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// The plain timestamped text report, one line per record.
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "=== {} started {} ===",
            self.kind.label(),
            self.started.format("%Y-%m-%d %H:%M:%S")
        )];
        lines.extend(self.records.iter().map(|r| r.render()));
        lines
    }

    /// Writes the text report to a file.
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.render_lines().join("\n") + "\n")
    }
}
