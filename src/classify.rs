//! Pure classification of directory entries.
//!
//! Given an entry's metadata, the [`Classifier`] decides what the Organize
//! Pass should do with it: leave it alone, quarantine it as likely junk,
//! archive it for age, or file it into a category folder. Directories are
//! judged by the recursive staleness predicate instead.
//!
//! Junk detection uses three signals with a fixed precedence: a junk
//! extension beats a junk keyword, which beats the Windows duplicate name
//! pattern. An entry is never double-classified.

use crate::layout::{ArchiveSubfolder, Category, EngineLayout, is_program_archive_extension};
use crate::settings::Settings;
use crate::staleness::is_stale;
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Extensions treated as junk, lowercased with a leading dot.
pub const JUNK_EXTENSIONS: &[&str] = &[".tmp", ".log", ".bak", "._gstmp", ".crdownload", ".part"];

/// Keywords whose case-insensitive presence in a filename marks it as junk.
pub const JUNK_KEYWORDS: &[&str] = &["old_version", "backup", "temp", "tmpfile"];

/// Matches names of the shape `basename (N)` or `basename (N).ext`.
const WINDOWS_DUPLICATE_PATTERN: &str = r"^(.+)\s\((\d+)\)(\.[^.]+)?$";

/// Whether an entry is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
}

/// A filesystem entry's metadata, read fresh at decision time.
///
/// Entries are never cached across a run: a stale snapshot would race with
/// concurrent user activity in the same directory.
#[derive(Debug, Clone)]
pub struct Entry {
    pub name: String,
    pub path: PathBuf,
    /// Lowercased extension including the leading dot, or empty.
    pub extension: String,
    pub kind: FileKind,
    pub modified: SystemTime,
    pub size: Option<u64>,
}

impl Entry {
    /// Reads an entry's metadata from disk.
    pub fn from_path(path: &Path) -> io::Result<Entry> {
        let metadata = fs::symlink_metadata(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "path has no name component")
            })?;
        let kind = if metadata.is_dir() {
            FileKind::Directory
        } else {
            FileKind::File
        };
        Ok(Entry {
            extension: extension_of(&name),
            name,
            path: path.to_path_buf(),
            kind,
            modified: metadata.modified()?,
            size: if metadata.is_file() {
                Some(metadata.len())
            } else {
                None
            },
        })
    }
}

/// Lowercased extension of a filename including the leading dot, or an empty
/// string when the name has none.
pub fn extension_of(name: &str) -> String {
    match Path::new(name).extension() {
        Some(ext) => format!(".{}", ext.to_string_lossy().to_lowercase()),
        None => String::new(),
    }
}

/// One reason a file was flagged as likely junk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JunkSignal {
    /// The extension is on the junk list.
    Extension(String),
    /// The filename contains a junk keyword.
    Keyword(String),
    /// The name has the `basename (N)` shape Windows gives duplicates.
    WindowsDuplicate,
}

impl JunkSignal {
    /// Human-readable reason string carried into the run log.
    pub fn reason(&self) -> String {
        match self {
            JunkSignal::Extension(ext) => format!("junk extension ({})", ext),
            JunkSignal::Keyword(keyword) => format!("junk keyword ('{}')", keyword),
            JunkSignal::WindowsDuplicate => "looks like a Windows duplicate".to_string(),
        }
    }
}

/// What the Organize Pass should do with one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Name is in the ignore list or belongs to the engine itself.
    Ignore,
    /// Likely junk; hold for human review.
    Quarantine { reason: String },
    /// File past the age threshold; route to an archive subfolder.
    ArchiveOld {
        subfolder: ArchiveSubfolder,
        reason: String,
    },
    /// Fresh file; file it under its category folder.
    Category(Category),
    /// Directory whose whole subtree is stale.
    ArchiveOldFolder { reason: String },
    /// Directory with recent activity; left in place.
    Keep { reason: String },
}

/// Pure decision function over entries, built once per run.
///
/// Construction pre-compiles the junk machinery and captures the cutoff
/// instant; classification itself then touches the filesystem only for the
/// directory staleness walk.
pub struct Classifier {
    layout: EngineLayout,
    ignored: Vec<String>,
    age_threshold_days: u32,
    cutoff: SystemTime,
    duplicate_pattern: Regex,
}

impl Classifier {
    /// Builds a classifier for one run, with the cutoff derived from `now`.
    pub fn new(settings: &Settings, now: SystemTime) -> Self {
        Self {
            layout: EngineLayout::new(settings),
            ignored: settings.ignored_folder_names.clone(),
            age_threshold_days: settings.age_threshold_days,
            cutoff: settings.cutoff(now),
            duplicate_pattern: Regex::new(WINDOWS_DUPLICATE_PATTERN)
                .expect("duplicate name pattern is a valid regex"),
        }
    }

    /// The instant separating fresh entries from stale ones for this run.
    pub fn cutoff(&self) -> SystemTime {
        self.cutoff
    }

    /// The configured age threshold, for reason strings.
    pub fn age_threshold_days(&self) -> u32 {
        self.age_threshold_days
    }

    /// Decides what to do with one entry.
    pub fn classify(&self, entry: &Entry) -> Decision {
        if self.ignored.iter().any(|i| i == &entry.name)
            || self.layout.is_engine_owned(&entry.name)
        {
            return Decision::Ignore;
        }
        match entry.kind {
            FileKind::File => self.classify_file(entry),
            FileKind::Directory => self.classify_directory(entry),
        }
    }

    fn classify_file(&self, entry: &Entry) -> Decision {
        if let Some(signal) = self.junk_signal(&entry.name, &entry.extension) {
            // Duplicate-shaped names get a richer reason when the presumed
            // original is sitting right next to them.
            let reason = if signal == JunkSignal::WindowsDuplicate {
                match self.duplicate_original_name(&entry.name) {
                    Some(original) if self.layout.root().join(&original).exists() => {
                        format!("Windows duplicate of '{}'", original)
                    }
                    _ => signal.reason(),
                }
            } else {
                signal.reason()
            };
            return Decision::Quarantine { reason };
        }

        if entry.modified < self.cutoff {
            let subfolder = if is_program_archive_extension(&entry.extension) {
                ArchiveSubfolder::ProgramArchives
            } else {
                ArchiveSubfolder::GeneralOld
            };
            return Decision::ArchiveOld {
                subfolder,
                reason: format!("older than {} days", self.age_threshold_days),
            };
        }

        Decision::Category(Category::for_extension(&entry.extension))
    }

    fn classify_directory(&self, entry: &Entry) -> Decision {
        if is_stale(&entry.path, self.cutoff, &self.ignored) {
            Decision::ArchiveOldFolder {
                reason: format!("no activity for {} days", self.age_threshold_days),
            }
        } else {
            Decision::Keep {
                reason: "recent activity inside".to_string(),
            }
        }
    }

    /// Finds the first junk signal for a filename, in precedence order.
    pub fn junk_signal(&self, name: &str, extension: &str) -> Option<JunkSignal> {
        if JUNK_EXTENSIONS.contains(&extension) {
            return Some(JunkSignal::Extension(extension.to_string()));
        }

        let lowered = name.to_lowercase();
        if let Some(keyword) = JUNK_KEYWORDS.iter().find(|k| lowered.contains(*k)) {
            return Some(JunkSignal::Keyword(keyword.to_string()));
        }

        if self.duplicate_pattern.is_match(name) {
            return Some(JunkSignal::WindowsDuplicate);
        }

        None
    }

    /// For a Windows-duplicate name, reconstructs the name of the original
    /// (`report (1).pdf` -> `report.pdf`). Returns `None` when the name does
    /// not have the duplicate shape.
    pub fn duplicate_original_name(&self, name: &str) -> Option<String> {
        let captures = self.duplicate_pattern.captures(name)?;
        let base = captures.get(1)?.as_str().trim_end();
        let ext = captures.get(3).map(|m| m.as_str()).unwrap_or("");
        Some(format!("{}{}", base, ext))
    }
}
