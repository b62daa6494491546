//! Store configuration.
//!
//! # Responsibility
//! - Describe where the note database lives and how long writes may wait on
//!   SQLite locks.
//!
//! # Invariants
//! - `StoreConfig::default()` points at `db.sqlite` in the working directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default database file name, created on first run if absent.
pub const DEFAULT_DB_FILE_NAME: &str = "db.sqlite";
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings consumed by `NoteStore::open`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// SQLite database file path.
    pub db_path: PathBuf,
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

impl StoreConfig {
    /// Replaces the database file path.
    pub fn with_db_path(mut self, path: impl AsRef<Path>) -> Self {
        self.db_path = path.as_ref().to_path_buf();
        self
    }

    /// Replaces how long a write waits on another writer's lock.
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }
}
