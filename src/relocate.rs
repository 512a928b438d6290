//! Collision-avoiding move primitive used by every pass.
//!
//! A move either fully relocates the item or leaves it exactly where it was:
//! `fs::rename` is tried first, and a cross-device failure falls back to
//! copy, verify, then delete-original. Name collisions at the destination are
//! resolved with a bounded `_N` suffix search, never by overwriting.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Upper bound on the `_N` collision suffix search.
const MAX_COLLISION_ATTEMPTS: u32 = 100;

/// Errors that can occur while relocating a single entry.
#[derive(Debug)]
pub enum RelocateError {
    /// Failed to create the destination directory chain.
    DirectoryCreationFailed { path: PathBuf, source: io::Error },
    /// Every candidate name up to the attempt cap already exists.
    CollisionExhausted { name: String, target_dir: PathBuf },
    /// The move (or its copy fallback) failed.
    MoveFailed {
        source_path: PathBuf,
        destination: PathBuf,
        source: io::Error,
    },
}

impl std::fmt::Display for RelocateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::CollisionExhausted { name, target_dir } => {
                write!(
                    f,
                    "Too many entries named like '{}' already in {}",
                    name,
                    target_dir.display()
                )
            }
            Self::MoveFailed {
                source_path,
                destination,
                source,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source_path.display(),
                    destination.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for RelocateError {}

/// Result type for relocation operations.
pub type RelocateResult<T> = Result<T, RelocateError>;

/// What a safe move did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The item now lives at `to`.
    Moved { to: PathBuf },
    /// The source vanished before the move; nothing was touched.
    SourceMissing,
}

/// Moves `source` into `target_dir` without ever overwriting anything.
///
/// The destination directory chain is created on demand. When
/// `target_dir/<name>` already exists, a numeric suffix is appended before
/// the extension (`report_1.pdf`, `report_2.pdf`, ...); directories get the
/// bare suffix (`project_1`). The search is capped; exhausting it is an
/// error and the source stays untouched.
pub fn move_safely(source: &Path, target_dir: &Path) -> RelocateResult<MoveOutcome> {
    if fs::symlink_metadata(source).is_err() {
        return Ok(MoveOutcome::SourceMissing);
    }

    fs::create_dir_all(target_dir).map_err(|e| RelocateError::DirectoryCreationFailed {
        path: target_dir.to_path_buf(),
        source: e,
    })?;

    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| RelocateError::MoveFailed {
            source_path: source.to_path_buf(),
            destination: target_dir.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "source has no name component"),
        })?;

    let destination = next_free_name(target_dir, &name, source.is_dir())?;

    match fs::rename(source, &destination) {
        Ok(()) => Ok(MoveOutcome::Moved { to: destination }),
        // Typically a cross-device move; rename cannot do those.
        Err(_) => match copy_then_delete(source, &destination) {
            Ok(()) => Ok(MoveOutcome::Moved { to: destination }),
            Err(e) => Err(RelocateError::MoveFailed {
                source_path: source.to_path_buf(),
                destination,
                source: e,
            }),
        },
    }
}

/// Finds the first non-existing destination name, `_N`-suffixed on demand.
fn next_free_name(target_dir: &Path, name: &str, is_dir: bool) -> RelocateResult<PathBuf> {
    let candidate = target_dir.join(name);
    if !candidate.exists() {
        return Ok(candidate);
    }

    let (stem, ext) = if is_dir {
        (name.to_string(), String::new())
    } else {
        split_name(name)
    };

    for counter in 1..=MAX_COLLISION_ATTEMPTS {
        let candidate = target_dir.join(format!("{}_{}{}", stem, counter, ext));
        if !candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(RelocateError::CollisionExhausted {
        name: name.to_string(),
        target_dir: target_dir.to_path_buf(),
    })
}

/// Splits a filename into stem and extension (extension keeps its dot).
fn split_name(name: &str) -> (String, String) {
    let path = Path::new(name);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => (
            stem.to_string_lossy().to_string(),
            format!(".{}", ext.to_string_lossy()),
        ),
        _ => (name.to_string(), String::new()),
    }
}

/// Copy fallback for moves `fs::rename` cannot perform. The source is only
/// deleted after the full copy has landed and, for files, the byte count has
/// been verified.
fn copy_then_delete(source: &Path, destination: &Path) -> io::Result<()> {
    if source.is_dir() {
        if let Err(e) = copy_dir_recursive(source, destination) {
            let _ = fs::remove_dir_all(destination);
            return Err(e);
        }
        fs::remove_dir_all(source)
    } else {
        let written = fs::copy(source, destination)?;
        let expected = fs::metadata(source)?.len();
        if written != expected {
            let _ = fs::remove_file(destination);
            return Err(io::Error::other(format!(
                "short copy: {} of {} bytes",
                written, expected
            )));
        }
        fs::remove_file(source)
    }
}

fn copy_dir_recursive(source: &Path, destination: &Path) -> io::Result<()> {
    fs::create_dir_all(destination)?;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let target = destination.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_move_creates_target_chain() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let source = temp.path().join("a.txt");
        fs::write(&source, "content").expect("write failed");

        let target = temp.path().join("archive").join("old");
        let outcome = move_safely(&source, &target).expect("move failed");

        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                to: target.join("a.txt")
            }
        );
        assert!(!source.exists());
        assert!(target.join("a.txt").exists());
    }

    #[test]
    fn test_missing_source_is_a_warning_not_an_error() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let outcome = move_safely(&temp.path().join("gone.txt"), temp.path())
            .expect("missing source must not error");
        assert_eq!(outcome, MoveOutcome::SourceMissing);
    }

    #[test]
    fn test_collision_appends_suffix_before_extension() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let target = temp.path().join("docs");
        fs::create_dir(&target).expect("mkdir failed");
        fs::write(target.join("report.pdf"), "first").expect("write failed");

        let second = temp.path().join("report.pdf");
        fs::write(&second, "second").expect("write failed");
        move_safely(&second, &target).expect("move failed");

        let third = temp.path().join("report.pdf");
        fs::write(&third, "third").expect("write failed");
        move_safely(&third, &target).expect("move failed");

        assert_eq!(
            fs::read_to_string(target.join("report.pdf")).expect("read failed"),
            "first"
        );
        assert_eq!(
            fs::read_to_string(target.join("report_1.pdf")).expect("read failed"),
            "second"
        );
        assert_eq!(
            fs::read_to_string(target.join("report_2.pdf")).expect("read failed"),
            "third"
        );
    }

    #[test]
    fn test_directory_collision_suffix_has_no_extension() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let target = temp.path().join("archive");
        fs::create_dir_all(target.join("project")).expect("mkdir failed");

        let source = temp.path().join("project");
        fs::create_dir(&source).expect("mkdir failed");
        fs::write(source.join("inner.txt"), "x").expect("write failed");

        move_safely(&source, &target).expect("move failed");
        assert!(target.join("project_1").join("inner.txt").exists());
    }

    #[test]
    fn test_collision_cap_reports_error_and_leaves_source() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let target = temp.path().join("docs");
        fs::create_dir(&target).expect("mkdir failed");

        fs::write(target.join("f.txt"), "0").expect("write failed");
        for i in 1..=MAX_COLLISION_ATTEMPTS {
            fs::write(target.join(format!("f_{}.txt", i)), "x").expect("write failed");
        }

        let source = temp.path().join("f.txt");
        fs::write(&source, "new").expect("write failed");

        let result = move_safely(&source, &target);
        assert!(matches!(
            result,
            Err(RelocateError::CollisionExhausted { .. })
        ));
        assert!(source.exists(), "source must stay put after the error");
    }

    #[test]
    fn test_dotfile_collision_keeps_leading_dot() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let target = temp.path().join("other");
        fs::create_dir(&target).expect("mkdir failed");
        fs::write(target.join(".env"), "a").expect("write failed");

        let source = temp.path().join(".env");
        fs::write(&source, "b").expect("write failed");
        let outcome = move_safely(&source, &target).expect("move failed");

        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                to: target.join(".env_1")
            }
        );
    }

    #[test]
    fn test_moving_whole_directory_keeps_contents() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let source = temp.path().join("proj");
        fs::create_dir_all(source.join("sub")).expect("mkdir failed");
        fs::write(source.join("sub").join("deep.txt"), "x").expect("write failed");

        let target = temp.path().join("archive");
        move_safely(&source, &target).expect("move failed");

        assert!(!source.exists());
        assert!(target.join("proj").join("sub").join("deep.txt").exists());
    }
}
