//! The Rollback Pass.
//!
//! Restores the pre-organization layout by walking the engine-owned
//! directories, moving every contained item back to the root, and removing
//! each directory once it is empty, deepest nesting first, so the archive
//! subfolders are gone before their parent's removal is attempted. Nothing
//! here ever recursively deletes a directory: a folder that will not empty
//! (the user put something of their own inside) is left standing with a
//! warning. Running rollback on an already-rolled-back tree is a no-op.

use crate::layout::{ArchiveSubfolder, Category, EngineLayout};
use crate::organize::{RunError, RunGuard, name_of, snapshot};
use crate::relocate::{MoveOutcome, move_safely};
use crate::report::{ActionKind, RunKind, RunLog};
use crate::settings::Settings;
use std::fs;
use std::io;
use std::path::Path;

/// Performs one Rollback Pass and returns its run log.
pub fn rollback(settings: &Settings) -> Result<RunLog, RunError> {
    let root = settings.downloads_dir.clone();
    let _guard = RunGuard::acquire(&root)?;
    if !root.is_dir() {
        return Err(RunError::RootNotFound(root));
    }

    let layout = EngineLayout::new(settings);
    let mut log = RunLog::new(RunKind::Rollback);

    empty_and_remove(&layout.quarantine_dir(), &root, &layout, false, &mut log);

    // Archive subfolders before the archive root itself.
    for subfolder in ArchiveSubfolder::ALL {
        empty_and_remove(
            &layout.archive_subfolder(subfolder),
            &root,
            &layout,
            false,
            &mut log,
        );
    }
    empty_and_remove(&layout.archive_root(), &root, &layout, true, &mut log);

    for category in Category::ALL {
        empty_and_remove(&layout.category_dir(category), &root, &layout, false, &mut log);
    }

    Ok(log)
}

/// Moves every item in `dir` back to the root, then attempts `remove_dir`.
///
/// With `skip_engine_children` set (used for the archive root), children
/// whose names belong to the engine layout are left alone: a subfolder that
/// could not be removed earlier must not be relocated wholesale into the
/// root as if it were user data.
fn empty_and_remove(
    dir: &Path,
    root: &Path,
    layout: &EngineLayout,
    skip_engine_children: bool,
    log: &mut RunLog,
) {
    if !dir.is_dir() {
        // Already rolled back (or never created): nothing to do.
        return;
    }

    let root_label = name_of(root);
    for path in snapshot(dir) {
        let name = name_of(&path);
        if skip_engine_children && layout.is_archive_subfolder_name(&name) {
            continue;
        }
        match move_safely(&path, root) {
            Ok(MoveOutcome::Moved { .. }) => {
                log.push(ActionKind::Returned, name, Some(root_label.clone()), None);
            }
            Ok(MoveOutcome::SourceMissing) => {
                log.warn(name, "item disappeared before it could be returned");
            }
            Err(e) => {
                log.error(name, Some(root_label.clone()), e.to_string());
            }
        }
    }

    match fs::remove_dir(dir) {
        Ok(()) => {
            log.push(ActionKind::FolderRemoved, name_of(dir), None, None);
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(_) => {
            log.warn(name_of(dir), "not empty, left in place");
        }
    }
}
