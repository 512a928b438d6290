//! The quarantine store: listing, restoring, and purging held files.
//!
//! Quarantined items wait for human review. Restoring moves them back to the
//! root with the usual collision safety; deleting is permanent and is the
//! only place the engine removes user-visible data, and only for paths that
//! resolve to a direct child of the quarantine folder. Confirmation UX
//! belongs to the caller.

use crate::classify::{Classifier, Entry, JunkSignal};
use crate::layout::EngineLayout;
use crate::organize::{RunError, RunGuard, name_of, snapshot};
use crate::relocate::{MoveOutcome, move_safely};
use crate::report::{ActionKind, RunKind, RunLog};
use crate::settings::Settings;
use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// One held item, as shown to the user for review.
#[derive(Debug, Clone)]
pub struct QuarantineEntry {
    pub name: String,
    pub path: PathBuf,
    /// Why the engine likely put it here, re-derived from the name.
    pub inferred_reason: String,
    pub last_modified: DateTime<Local>,
}

/// Lists the quarantine folder's contents. A missing folder lists as empty.
pub fn list(settings: &Settings) -> io::Result<Vec<QuarantineEntry>> {
    let layout = EngineLayout::new(settings);
    let dir = layout.quarantine_dir();
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let classifier = Classifier::new(settings, SystemTime::now());
    let mut entries = Vec::new();
    for path in snapshot(&dir) {
        let entry = match Entry::from_path(&path) {
            Ok(entry) => entry,
            // Deleted mid-listing; skip it.
            Err(_) => continue,
        };
        entries.push(QuarantineEntry {
            inferred_reason: inferred_reason(&classifier, &entry, layout.root()),
            last_modified: DateTime::from(entry.modified),
            name: entry.name,
            path: entry.path,
        });
    }
    Ok(entries)
}

/// Re-derives the junk reason for a held item. Duplicate-shaped names also
/// report whether the presumed original is still in the root.
fn inferred_reason(classifier: &Classifier, entry: &Entry, root: &Path) -> String {
    match classifier.junk_signal(&entry.name, &entry.extension) {
        Some(JunkSignal::WindowsDuplicate) => {
            match classifier.duplicate_original_name(&entry.name) {
                Some(original) if root.join(&original).exists() => {
                    format!("Windows duplicate of '{}'", original)
                }
                _ => "possible duplicate (original not found)".to_string(),
            }
        }
        Some(signal) => signal.reason(),
        None => "unknown".to_string(),
    }
}

/// Where a candidate path actually lives, after resolving symlinks and `..`
/// components. Only `Held` paths may be restored or deleted.
enum Containment {
    /// Resolves to a direct child of the quarantine folder.
    Held(PathBuf),
    /// Nothing exists at the path.
    Missing,
    /// Resolves somewhere else; the path is refused untouched.
    Outside,
}

/// Resolves a candidate against the real quarantine folder. The check is on
/// canonical paths, so `..` components and symlink indirection cannot smuggle
/// a path outside the folder past it.
fn containment_of(path: &Path, quarantine: &Path) -> Containment {
    let resolved = match path.canonicalize() {
        Ok(resolved) => resolved,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Containment::Missing,
        Err(_) => return Containment::Outside,
    };
    match quarantine.canonicalize() {
        Ok(quarantine) if resolved.parent() == Some(quarantine.as_path()) => {
            Containment::Held(resolved)
        }
        _ => Containment::Outside,
    }
}

/// Moves the given quarantined items back to the root.
pub fn restore(settings: &Settings, paths: &[PathBuf]) -> Result<RunLog, RunError> {
    let root = settings.downloads_dir.clone();
    let _guard = RunGuard::acquire(&root)?;
    if !root.is_dir() {
        return Err(RunError::RootNotFound(root));
    }

    let layout = EngineLayout::new(settings);
    let quarantine = layout.quarantine_dir();
    let mut log = RunLog::new(RunKind::QuarantineRestore);
    let root_label = name_of(&root);

    for path in paths {
        let name = name_of(path);
        let held = match containment_of(path, &quarantine) {
            Containment::Held(resolved) => resolved,
            Containment::Missing => {
                log.warn(name, "no longer in quarantine");
                continue;
            }
            Containment::Outside => {
                log.warn(name, "not inside the quarantine folder, skipped");
                continue;
            }
        };
        match move_safely(&held, &root) {
            Ok(MoveOutcome::Moved { .. }) => {
                log.push(ActionKind::Restored, name, Some(root_label.clone()), None);
            }
            Ok(MoveOutcome::SourceMissing) => {
                log.warn(name, "no longer in quarantine");
            }
            Err(e) => {
                log.error(name, Some(root_label.clone()), e.to_string());
            }
        }
    }

    Ok(log)
}

/// Permanently deletes the given quarantined items. Paths that resolve
/// outside the quarantine folder are refused and logged, never deleted.
pub fn delete(settings: &Settings, paths: &[PathBuf]) -> Result<RunLog, RunError> {
    let root = settings.downloads_dir.clone();
    let _guard = RunGuard::acquire(&root)?;

    let layout = EngineLayout::new(settings);
    let quarantine = layout.quarantine_dir();
    let mut log = RunLog::new(RunKind::QuarantineDelete);

    for path in paths {
        let name = name_of(path);
        let held = match containment_of(path, &quarantine) {
            Containment::Held(resolved) => resolved,
            Containment::Missing => {
                log.warn(name, "no longer in quarantine");
                continue;
            }
            Containment::Outside => {
                log.warn(name, "not inside the quarantine folder, refused");
                continue;
            }
        };
        let result = if held.is_dir() {
            fs::remove_dir_all(&held)
        } else {
            fs::remove_file(&held)
        };
        match result {
            Ok(()) => log.push(ActionKind::Deleted, name, None, None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log.warn(name, "no longer in quarantine");
            }
            Err(e) => log.error(name, None, e.to_string()),
        }
    }

    Ok(log)
}
