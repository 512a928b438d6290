//! Recursive folder-age evaluation.
//!
//! A folder is stale when it, and everything reachable under it outside
//! ignored subtrees, was last modified before the cutoff instant. One fresh
//! entry anywhere is enough to keep the whole folder active.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// Returns true iff `folder` and every non-ignored entry under it
/// (recursively) were last modified before `cutoff`.
///
/// Ignored subtrees are special-cased both ways: an ignored folder whose own
/// modification time is fresh marks the parent as active, while an old one is
/// skipped entirely without inspecting its contents. An empty folder is
/// judged by its own modification time alone. A folder that disappears during
/// traversal is treated as stale.
pub fn is_stale(folder: &Path, cutoff: SystemTime, ignored: &[String]) -> bool {
    match fs::symlink_metadata(folder).and_then(|m| m.modified()) {
        Ok(modified) if modified >= cutoff => return false,
        Ok(_) => {}
        Err(_) => return true,
    }
    subtree_is_old(folder, cutoff, ignored)
}

fn subtree_is_old(folder: &Path, cutoff: SystemTime, ignored: &[String]) -> bool {
    let entries = match fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(_) => return true,
    };

    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        let modified = match entry.metadata().and_then(|m| m.modified()) {
            Ok(modified) => modified,
            // Vanished mid-scan: nothing fresh to account for.
            Err(_) => continue,
        };

        if ignored.iter().any(|i| i == &name) {
            // A fresh ignored subtree infects the ancestor with freshness;
            // an old one does not count against staleness.
            if modified >= cutoff {
                return false;
            }
            continue;
        }

        if modified >= cutoff {
            return false;
        }

        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_dir && !subtree_is_old(&entry.path(), cutoff, ignored) {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::{FileTime, set_file_mtime};
    use std::fs::{self, File};
    use std::time::Duration;
    use tempfile::TempDir;

    const DAY: Duration = Duration::from_secs(86_400);

    fn age(path: &Path, days: u64) {
        let when = SystemTime::now() - DAY * days as u32;
        set_file_mtime(path, FileTime::from_system_time(when)).expect("failed to set mtime");
    }

    fn cutoff_days(days: u64) -> SystemTime {
        SystemTime::now() - DAY * days as u32
    }

    #[test]
    fn test_all_old_tree_is_stale() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().join("project");
        fs::create_dir(&root).expect("mkdir failed");
        File::create(root.join("a.txt")).expect("create failed");
        fs::create_dir(root.join("sub")).expect("mkdir failed");
        File::create(root.join("sub").join("b.txt")).expect("create failed");

        age(&root.join("a.txt"), 30);
        age(&root.join("sub").join("b.txt"), 30);
        age(&root.join("sub"), 30);
        age(&root, 30);

        assert!(is_stale(&root, cutoff_days(7), &[]));
    }

    #[test]
    fn test_one_fresh_nested_entry_flips_to_active() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().join("project");
        fs::create_dir_all(root.join("sub")).expect("mkdir failed");
        File::create(root.join("a.txt")).expect("create failed");
        File::create(root.join("sub").join("b.txt")).expect("create failed");

        age(&root.join("a.txt"), 30);
        age(&root.join("sub").join("b.txt"), 30);
        age(&root.join("sub"), 30);
        age(&root, 30);
        assert!(is_stale(&root, cutoff_days(7), &[]));

        // Touching a single nested file makes the whole tree active again.
        age(&root.join("sub").join("b.txt"), 0);
        assert!(!is_stale(&root, cutoff_days(7), &[]));
    }

    #[test]
    fn test_fresh_folder_mtime_alone_is_active() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().join("fresh");
        fs::create_dir(&root).expect("mkdir failed");

        assert!(!is_stale(&root, cutoff_days(7), &[]));
    }

    #[test]
    fn test_empty_old_folder_is_stale() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().join("OldProject");
        fs::create_dir(&root).expect("mkdir failed");
        age(&root, 30);

        assert!(is_stale(&root, cutoff_days(7), &[]));
    }

    #[test]
    fn test_old_ignored_subtree_contents_are_skipped() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().join("project");
        let ignored_dir = root.join("node_modules");
        fs::create_dir_all(&ignored_dir).expect("mkdir failed");
        File::create(ignored_dir.join("fresh.js")).expect("create failed");

        // The ignored folder itself is old; the fresh file inside it must not
        // be inspected.
        age(&ignored_dir, 30);
        age(&root, 30);

        let ignored = vec!["node_modules".to_string()];
        assert!(is_stale(&root, cutoff_days(7), &ignored));
    }

    #[test]
    fn test_fresh_ignored_subtree_infects_ancestor() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().join("project");
        let ignored_dir = root.join("active_work");
        fs::create_dir_all(&ignored_dir).expect("mkdir failed");
        age(&root, 30);
        // ignored_dir keeps its just-created mtime, i.e. fresh

        let ignored = vec!["active_work".to_string()];
        assert!(!is_stale(&root, cutoff_days(7), &ignored));
    }

    #[test]
    fn test_missing_folder_is_stale() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let gone = temp.path().join("never_existed");
        assert!(is_stale(&gone, cutoff_days(7), &[]));
    }
}
