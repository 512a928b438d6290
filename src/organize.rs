//! The Organize Pass.
//!
//! A single walk over the configured root: each top-level entry is classified
//! and relocated, and every action lands in the returned [`RunLog`]. A second
//! phase then re-scans the category folders and migrates files that have aged
//! past the threshold since being filed. Entry-level failures are recorded
//! and the pass continues; only a missing root or a concurrent run aborts.

use crate::classify::{Classifier, Decision, Entry, FileKind};
use crate::layout::{ArchiveSubfolder, Category, EngineLayout, is_program_archive_extension};
use crate::relocate::{MoveOutcome, move_safely};
use crate::report::{ActionKind, RunKind, RunLog};
use crate::settings::Settings;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;

/// Roots with a pass currently executing against them. At most one
/// Organize-or-Rollback pass may run per root; a second invocation is
/// rejected, not queued.
static ACTIVE_ROOTS: Mutex<BTreeSet<PathBuf>> = Mutex::new(BTreeSet::new());

/// Run-level errors. Both abort before any filesystem mutation.
#[derive(Debug)]
pub enum RunError {
    /// The configured root directory does not exist.
    RootNotFound(PathBuf),
    /// Another pass is already executing against this root.
    AlreadyRunning(PathBuf),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::RootNotFound(path) => {
                write!(f, "Downloads directory not found: {}", path.display())
            }
            RunError::AlreadyRunning(path) => {
                write!(
                    f,
                    "Another pass is already running against {}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for RunError {}

/// Holds the per-root run lock for the duration of a pass.
pub(crate) struct RunGuard {
    root: PathBuf,
}

impl RunGuard {
    pub(crate) fn acquire(root: &Path) -> Result<Self, RunError> {
        let mut active = ACTIVE_ROOTS
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !active.insert(root.to_path_buf()) {
            return Err(RunError::AlreadyRunning(root.to_path_buf()));
        }
        Ok(RunGuard {
            root: root.to_path_buf(),
        })
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        ACTIVE_ROOTS
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&self.root);
    }
}

/// Performs one Organize Pass and returns its run log.
pub fn organize(settings: &Settings) -> Result<RunLog, RunError> {
    organize_run(settings, false)
}

/// Classifies everything like [`organize`] but moves nothing; the returned
/// log describes what a real run would do in its first phase.
pub fn organize_dry_run(settings: &Settings) -> Result<RunLog, RunError> {
    organize_run(settings, true)
}

fn organize_run(settings: &Settings, dry_run: bool) -> Result<RunLog, RunError> {
    let root = settings.downloads_dir.clone();
    let _guard = RunGuard::acquire(&root)?;
    if !root.is_dir() {
        return Err(RunError::RootNotFound(root));
    }

    let layout = EngineLayout::new(settings);
    let classifier = Classifier::new(settings, SystemTime::now());
    let mut log = RunLog::new(if dry_run {
        RunKind::DryRun
    } else {
        RunKind::Organize
    });

    // Materialize the listing before moving anything out of it.
    for path in snapshot(&root) {
        // Metadata is read fresh per entry, not taken from the snapshot.
        let entry = match Entry::from_path(&path) {
            Ok(entry) => entry,
            Err(_) => {
                log.warn(name_of(&path), "entry vanished before classification");
                continue;
            }
        };

        match classifier.classify(&entry) {
            Decision::Ignore | Decision::Keep { .. } => {}
            Decision::Quarantine { reason } => {
                apply_move(
                    &mut log,
                    dry_run,
                    &entry,
                    &layout.quarantine_dir(),
                    &root,
                    ActionKind::Quarantined,
                    Some(reason),
                );
            }
            Decision::ArchiveOld { subfolder, reason } => {
                apply_move(
                    &mut log,
                    dry_run,
                    &entry,
                    &layout.archive_subfolder(subfolder),
                    &root,
                    ActionKind::Archived,
                    Some(reason),
                );
            }
            Decision::Category(category) => {
                apply_move(
                    &mut log,
                    dry_run,
                    &entry,
                    &layout.category_dir(category),
                    &root,
                    ActionKind::Categorized,
                    None,
                );
            }
            Decision::ArchiveOldFolder { reason } => {
                apply_move(
                    &mut log,
                    dry_run,
                    &entry,
                    &layout.archive_subfolder(ArchiveSubfolder::OldFolders),
                    &root,
                    ActionKind::FolderArchived,
                    Some(reason),
                );
            }
        }
    }

    // Phase 2: files already filed into a category folder can themselves age
    // past the threshold; apply the age test only, never re-classification.
    if !dry_run {
        promote_aged_category_files(&layout, &classifier, &mut log);
    }

    Ok(log)
}

fn promote_aged_category_files(layout: &EngineLayout, classifier: &Classifier, log: &mut RunLog) {
    for category in Category::ALL {
        let dir = layout.category_dir(category);
        if !dir.is_dir() {
            continue;
        }
        for path in snapshot(&dir) {
            let entry = match Entry::from_path(&path) {
                Ok(entry) => entry,
                Err(_) => continue,
            };
            if entry.kind != FileKind::File || entry.modified >= classifier.cutoff() {
                continue;
            }
            let subfolder = if is_program_archive_extension(&entry.extension) {
                ArchiveSubfolder::ProgramArchives
            } else {
                ArchiveSubfolder::GeneralOld
            };
            apply_move(
                log,
                false,
                &entry,
                &layout.archive_subfolder(subfolder),
                layout.root(),
                ActionKind::AgePromoted,
                Some(format!(
                    "aged past {} days after filing",
                    classifier.age_threshold_days()
                )),
            );
        }
    }
}

/// Executes one relocation and records whatever happened. A failure here
/// never aborts the pass.
fn apply_move(
    log: &mut RunLog,
    dry_run: bool,
    entry: &Entry,
    target_dir: &Path,
    root: &Path,
    kind: ActionKind,
    reason: Option<String>,
) {
    let destination = destination_label(target_dir, root);
    if dry_run {
        log.push(kind, &entry.name, Some(destination), reason);
        return;
    }
    match move_safely(&entry.path, target_dir) {
        Ok(MoveOutcome::Moved { .. }) => {
            log.push(kind, &entry.name, Some(destination), reason);
        }
        Ok(MoveOutcome::SourceMissing) => {
            log.warn(&entry.name, "source disappeared before the move");
        }
        Err(e) => {
            log.error(&entry.name, Some(destination), e.to_string());
        }
    }
}

/// Destination folder shown in the log, relative to the root.
fn destination_label(target_dir: &Path, root: &Path) -> String {
    target_dir
        .strip_prefix(root)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| target_dir.display().to_string())
}

/// Materializes a directory listing before any mutation, sorted by name so
/// run logs are deterministic. An unreadable directory lists as empty.
pub(crate) fn snapshot(dir: &Path) -> Vec<PathBuf> {
    match fs::read_dir(dir) {
        Ok(entries) => {
            let mut paths: Vec<_> = entries.flatten().map(|e| e.path()).collect();
            paths.sort();
            paths
        }
        Err(_) => Vec::new(),
    }
}

pub(crate) fn name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn settings(root: &Path) -> Settings {
        Settings {
            downloads_dir: root.to_path_buf(),
            archive_dir_name: "Downloads_Archive".to_string(),
            age_threshold_days: 7,
            ignored_folder_names: Vec::new(),
        }
    }

    #[test]
    fn test_missing_root_aborts_before_any_mutation() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let settings = settings(&temp.path().join("no_such_dir"));
        let result = organize(&settings);
        assert!(matches!(result, Err(RunError::RootNotFound(_))));
    }

    #[test]
    fn test_concurrent_run_on_same_root_is_rejected() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let settings = settings(temp.path());

        let _held = RunGuard::acquire(temp.path()).expect("first acquire must succeed");
        let result = organize(&settings);
        assert!(matches!(result, Err(RunError::AlreadyRunning(_))));
    }

    #[test]
    fn test_lock_released_after_run() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let settings = settings(temp.path());

        organize(&settings).expect("first run failed");
        organize(&settings).expect("lock must be released between runs");
    }

    #[test]
    fn test_dry_run_moves_nothing() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp.path().join("photo.png"), "x").expect("write failed");
        fs::write(temp.path().join("junk.tmp"), "x").expect("write failed");

        let log = organize_dry_run(&settings(temp.path())).expect("dry run failed");

        assert_eq!(log.kind(), RunKind::DryRun);
        assert_eq!(log.mutation_count(), 2, "both decisions reported");
        assert!(temp.path().join("photo.png").exists());
        assert!(temp.path().join("junk.tmp").exists());
        assert!(!temp.path().join("01_images").exists());
    }

    #[test]
    fn test_fresh_files_land_in_category_folders() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp.path().join("photo.png"), "x").expect("write failed");
        fs::write(temp.path().join("song.mp3"), "x").expect("write failed");
        fs::write(temp.path().join("no_extension"), "x").expect("write failed");

        let log = organize(&settings(temp.path())).expect("organize failed");

        assert!(temp.path().join("01_images").join("photo.png").exists());
        assert!(temp.path().join("03_audio").join("song.mp3").exists());
        assert!(temp.path().join("10_other").join("no_extension").exists());
        assert_eq!(log.mutation_count(), 3);
        assert!(!log.has_errors());
    }
}
