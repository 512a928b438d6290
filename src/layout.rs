//! The fixed set of directories the engine creates and is therefore allowed
//! to tear down again: category folders, the archive root with its named
//! subfolders, and the quarantine folder. Anything outside this set is user
//! data and must never be removed.
//!
//! # Examples
//!
//! ```
//! use downtidy::layout::Category;
//!
//! assert_eq!(Category::for_extension(".png"), Category::Images);
//! assert_eq!(Category::for_extension(".pdf"), Category::Documents);
//! assert_eq!(Category::for_extension(""), Category::Other);
//! ```

use crate::settings::Settings;
use std::path::{Path, PathBuf};

/// Name of the holding area for files flagged as likely junk.
pub const QUARANTINE_DIR_NAME: &str = "_quarantine_review";

/// A category folder for one broad file type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Images,
    Videos,
    Audio,
    Documents,
    /// Compressed archives and disk images.
    Archives,
    Programs,
    Fonts,
    Torrents,
    Code,
    /// Catch-all for unmapped or missing extensions.
    Other,
}

impl Category {
    /// All categories in table order. The order is the tie-break: should an
    /// extension ever appear twice, the earlier category wins.
    pub const ALL: [Category; 10] = [
        Category::Images,
        Category::Videos,
        Category::Audio,
        Category::Documents,
        Category::Archives,
        Category::Programs,
        Category::Fonts,
        Category::Torrents,
        Category::Code,
        Category::Other,
    ];

    /// Returns the directory name for this category.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Images => "01_images",
            Category::Videos => "02_videos",
            Category::Audio => "03_audio",
            Category::Documents => "04_documents",
            Category::Archives => "05_archives",
            Category::Programs => "06_programs",
            Category::Fonts => "07_fonts",
            Category::Torrents => "08_torrents",
            Category::Code => "09_code",
            Category::Other => "10_other",
        }
    }

    /// Extensions mapped to this category, lowercased with a leading dot.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Category::Images => &[
                ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".svg", ".webp", ".heic", ".avif",
                ".tiff", ".tif",
            ],
            Category::Videos => &[
                ".mp4", ".mov", ".avi", ".mkv", ".webm", ".flv", ".wmv", ".mpeg", ".mpg",
            ],
            Category::Audio => &[".mp3", ".wav", ".aac", ".flac", ".ogg", ".wma", ".m4a"],
            Category::Documents => &[
                ".pdf", ".doc", ".docx", ".txt", ".odt", ".rtf", ".csv", ".xls", ".xlsx", ".ppt",
                ".pptx", ".epub", ".djvu", ".md",
            ],
            Category::Archives => &[
                ".zip", ".rar", ".tar", ".gz", ".7z", ".bz2", ".iso", ".img", ".dmg",
            ],
            Category::Programs => &[".exe", ".msi", ".bat", ".sh", ".jar", ".apk", ".app"],
            Category::Fonts => &[".ttf", ".otf", ".woff", ".woff2"],
            Category::Torrents => &[".torrent"],
            Category::Code => &[
                ".py", ".js", ".html", ".css", ".cpp", ".java", ".psd", ".ai", ".fig", ".sketch",
                ".xd", ".ipynb", ".json", ".xml", ".yml", ".yaml",
            ],
            Category::Other => &[],
        }
    }

    /// Maps a lowercased extension (with leading dot) to its category.
    ///
    /// An empty or unmapped extension falls into [`Category::Other`].
    pub fn for_extension(ext: &str) -> Category {
        if ext.is_empty() {
            return Category::Other;
        }
        for category in Category::ALL {
            if category.extensions().contains(&ext) {
                return category;
            }
        }
        Category::Other
    }
}

/// Subfolders of the archive root. One unified set: the Rollback Pass walks
/// all of them, whether or not the last Organize Pass wrote into each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveSubfolder {
    /// Files past the age threshold with no special routing.
    GeneralOld,
    /// Aged files whose extension is an archive or disk image.
    ProgramArchives,
    /// Aged junk holding area; Organize routes junk to quarantine instead,
    /// but Rollback still tears this folder down when present.
    OldJunk,
    /// Whole directories judged stale.
    OldFolders,
}

impl ArchiveSubfolder {
    /// All archive subfolders, shallowest-last is irrelevant here: they are
    /// siblings, all one level below the archive root.
    pub const ALL: [ArchiveSubfolder; 4] = [
        ArchiveSubfolder::GeneralOld,
        ArchiveSubfolder::ProgramArchives,
        ArchiveSubfolder::OldJunk,
        ArchiveSubfolder::OldFolders,
    ];

    /// Returns the directory name for this subfolder.
    pub fn dir_name(&self) -> &'static str {
        match self {
            ArchiveSubfolder::GeneralOld => "01_general_old",
            ArchiveSubfolder::ProgramArchives => "02_program_archives_old",
            ArchiveSubfolder::OldJunk => "03_old_junk",
            ArchiveSubfolder::OldFolders => "04_old_folders",
        }
    }
}

/// Returns true when an aged file should be routed to the program-archives
/// subfolder rather than the general one.
pub fn is_program_archive_extension(ext: &str) -> bool {
    Category::Archives.extensions().contains(&ext)
}

/// Resolved paths for every directory the engine owns under one root.
#[derive(Debug, Clone)]
pub struct EngineLayout {
    root: PathBuf,
    archive_dir_name: String,
}

impl EngineLayout {
    pub fn new(settings: &Settings) -> Self {
        Self {
            root: settings.downloads_dir.clone(),
            archive_dir_name: settings.archive_dir_name.clone(),
        }
    }

    /// The organized root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn archive_root(&self) -> PathBuf {
        self.root.join(&self.archive_dir_name)
    }

    pub fn archive_subfolder(&self, subfolder: ArchiveSubfolder) -> PathBuf {
        self.archive_root().join(subfolder.dir_name())
    }

    pub fn quarantine_dir(&self) -> PathBuf {
        self.root.join(QUARANTINE_DIR_NAME)
    }

    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.root.join(category.dir_name())
    }

    /// Whether a top-level name belongs to the engine itself. Such entries
    /// are never classified or relocated by the Organize Pass.
    pub fn is_engine_owned(&self, name: &str) -> bool {
        name == self.archive_dir_name
            || name == QUARANTINE_DIR_NAME
            || Category::ALL.iter().any(|c| c.dir_name() == name)
    }

    /// Whether a name matches one of the archive subfolders.
    pub fn is_archive_subfolder_name(&self, name: &str) -> bool {
        ArchiveSubfolder::ALL.iter().any(|s| s.dir_name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn settings(root: &str) -> Settings {
        Settings {
            downloads_dir: PathBuf::from(root),
            archive_dir_name: "Downloads_Archive".to_string(),
            age_threshold_days: 7,
            ignored_folder_names: Vec::new(),
        }
    }

    #[test]
    fn test_extension_appears_in_at_most_one_category() {
        let mut seen = HashSet::new();
        for category in Category::ALL {
            for ext in category.extensions() {
                assert!(seen.insert(*ext), "extension {} mapped twice", ext);
            }
        }
    }

    #[test]
    fn test_for_extension_basic_mappings() {
        assert_eq!(Category::for_extension(".jpg"), Category::Images);
        assert_eq!(Category::for_extension(".mkv"), Category::Videos);
        assert_eq!(Category::for_extension(".pdf"), Category::Documents);
        assert_eq!(Category::for_extension(".iso"), Category::Archives);
        assert_eq!(Category::for_extension(".torrent"), Category::Torrents);
    }

    #[test]
    fn test_for_extension_unmapped_falls_into_other() {
        assert_eq!(Category::for_extension(".xyz"), Category::Other);
        assert_eq!(Category::for_extension(""), Category::Other);
    }

    #[test]
    fn test_program_archive_routing_covers_disk_images() {
        assert!(is_program_archive_extension(".zip"));
        assert!(is_program_archive_extension(".dmg"));
        assert!(!is_program_archive_extension(".pdf"));
    }

    #[test]
    fn test_engine_owned_names() {
        let layout = EngineLayout::new(&settings("/tmp/downloads"));
        assert!(layout.is_engine_owned("Downloads_Archive"));
        assert!(layout.is_engine_owned(QUARANTINE_DIR_NAME));
        assert!(layout.is_engine_owned("01_images"));
        assert!(layout.is_engine_owned("10_other"));
        assert!(!layout.is_engine_owned("Holiday Photos"));
    }

    #[test]
    fn test_layout_paths_nest_under_root() {
        let layout = EngineLayout::new(&settings("/tmp/downloads"));
        assert_eq!(
            layout.archive_subfolder(ArchiveSubfolder::OldFolders),
            PathBuf::from("/tmp/downloads/Downloads_Archive/04_old_folders")
        );
        assert_eq!(
            layout.quarantine_dir(),
            PathBuf::from("/tmp/downloads/_quarantine_review")
        );
        assert_eq!(
            layout.category_dir(Category::Audio),
            PathBuf::from("/tmp/downloads/03_audio")
        );
    }
}
