//! downtidy - a downloads-directory organization and cleanup engine
//!
//! This library classifies the top-level entries of a downloads folder
//! (junk, old, category, stale folder), relocates them without ever
//! overwriting or deleting data, holds suspected junk in a quarantine
//! folder for review, and can roll the whole organization back.

pub mod classify;
pub mod cli;
pub mod layout;
pub mod organize;
pub mod output;
pub mod quarantine;
pub mod relocate;
pub mod report;
pub mod rollback;
pub mod settings;
pub mod staleness;

pub use classify::{Classifier, Decision, Entry, FileKind, JunkSignal};
pub use layout::{ArchiveSubfolder, Category, EngineLayout, QUARANTINE_DIR_NAME};
pub use organize::{RunError, organize, organize_dry_run};
pub use quarantine::QuarantineEntry;
pub use relocate::{MoveOutcome, RelocateError, move_safely};
pub use report::{ActionKind, ActionRecord, RunKind, RunLog};
pub use rollback::rollback;
pub use settings::{Settings, SettingsError, SettingsFile};
pub use staleness::is_stale;
