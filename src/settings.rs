//! Settings loading, validation, and persistence.
//!
//! Settings are stored in TOML and mirror the keys the engine consumes:
//!
//! ```toml
//! downloads_dir_name = "Downloads"
//! archive_dir_name = "Downloads_Archive"
//! age_threshold_days = 7
//! ignored_folder_names = ["Important_Projects"]
//! ```
//!
//! Invalid settings are rejected before a run starts and before any
//! filesystem mutation occurs.

use crate::layout::{Category, QUARANTINE_DIR_NAME};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Errors that can occur while loading or validating settings.
#[derive(Debug, Clone)]
pub enum SettingsError {
    /// Settings file not found at the explicitly requested path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML, or a value the engine refuses to run with.
    ConfigInvalid(String),
    /// No home directory available to resolve the downloads folder against.
    HomeNotFound,
    /// IO error while reading or writing the settings file.
    IoError(String),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::ConfigNotFound(path) => {
                write!(f, "Settings file not found: {}", path.display())
            }
            SettingsError::ConfigInvalid(msg) => write!(f, "Invalid settings: {}", msg),
            SettingsError::HomeNotFound => {
                write!(f, "Could not determine the home directory (HOME is unset)")
            }
            SettingsError::IoError(msg) => write!(f, "IO error reading settings: {}", msg),
        }
    }
}

impl std::error::Error for SettingsError {}

/// On-disk settings record.
///
/// `age_threshold_days` is kept signed here so that a negative value in the
/// file is reported as an invalid setting rather than a parse failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsFile {
    /// Name of the downloads folder under the home directory.
    #[serde(default = "default_downloads_dir_name")]
    pub downloads_dir_name: String,

    /// Name of the archive folder created inside the downloads folder.
    #[serde(default = "default_archive_dir_name")]
    pub archive_dir_name: String,

    /// Entries older than this many days are considered stale.
    #[serde(default = "default_age_threshold_days")]
    pub age_threshold_days: i64,

    /// Folder names the engine must never touch or look inside.
    #[serde(default)]
    pub ignored_folder_names: Vec<String>,
}

fn default_downloads_dir_name() -> String {
    "Downloads".to_string()
}

fn default_archive_dir_name() -> String {
    "Downloads_Archive".to_string()
}

fn default_age_threshold_days() -> i64 {
    7
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self {
            downloads_dir_name: default_downloads_dir_name(),
            archive_dir_name: default_archive_dir_name(),
            age_threshold_days: default_age_threshold_days(),
            ignored_folder_names: Vec::new(),
        }
    }
}

impl SettingsFile {
    /// Load settings, with fallback to defaults.
    ///
    /// Attempts to load in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.downtidy.toml` in the current directory
    /// 3. Look for `~/.config/downtidy/config.toml` in the home directory
    /// 4. Fall back to default settings
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file is explicitly provided but cannot
    /// be read or parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, SettingsError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".downtidy.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("downtidy")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Err(SettingsError::ConfigNotFound(path.to_path_buf()));
        }

        let content =
            fs::read_to_string(path).map_err(|e| SettingsError::IoError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| SettingsError::ConfigInvalid(e.to_string()))
    }

    /// Write settings back to disk in TOML format.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| SettingsError::ConfigInvalid(e.to_string()))?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| SettingsError::IoError(e.to_string()))?;
        }
        fs::write(path, content).map_err(|e| SettingsError::IoError(e.to_string()))
    }

    /// Validate the record and resolve it into runtime [`Settings`].
    ///
    /// `root_override`, when given, replaces the home-based resolution of the
    /// downloads directory (the CLI passes its positional directory here).
    pub fn resolve(self, root_override: Option<&Path>) -> Result<Settings, SettingsError> {
        let age_threshold_days = u32::try_from(self.age_threshold_days).map_err(|_| {
            SettingsError::ConfigInvalid(format!(
                "age_threshold_days must be between 0 and {} (got {})",
                u32::MAX,
                self.age_threshold_days
            ))
        })?;
        if self.archive_dir_name.trim().is_empty() {
            return Err(SettingsError::ConfigInvalid(
                "archive_dir_name must not be empty".to_string(),
            ));
        }
        if self.archive_dir_name == QUARANTINE_DIR_NAME
            || Category::ALL
                .iter()
                .any(|c| c.dir_name() == self.archive_dir_name)
        {
            return Err(SettingsError::ConfigInvalid(format!(
                "archive_dir_name '{}' collides with an engine folder name",
                self.archive_dir_name
            )));
        }

        let downloads_dir = match root_override {
            Some(path) => path.to_path_buf(),
            None => {
                let home = std::env::var("HOME").map_err(|_| SettingsError::HomeNotFound)?;
                PathBuf::from(home).join(&self.downloads_dir_name)
            }
        };

        Ok(Settings {
            downloads_dir,
            archive_dir_name: self.archive_dir_name,
            age_threshold_days,
            ignored_folder_names: self.ignored_folder_names,
        })
    }
}

/// Validated runtime settings consumed by the engine.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Absolute path of the directory to organize.
    pub downloads_dir: PathBuf,
    /// Name of the archive folder created inside `downloads_dir`.
    pub archive_dir_name: String,
    /// Entries older than this many days are considered stale.
    pub age_threshold_days: u32,
    /// Folder names the engine must never touch or look inside.
    pub ignored_folder_names: Vec<String>,
}

impl Settings {
    /// The instant separating fresh entries from stale ones, relative to `now`.
    ///
    /// With a zero threshold everything already on disk counts as stale.
    pub fn cutoff(&self, now: SystemTime) -> SystemTime {
        let window = Duration::from_secs(u64::from(self.age_threshold_days) * 86_400);
        now.checked_sub(window).unwrap_or(UNIX_EPOCH)
    }
}
