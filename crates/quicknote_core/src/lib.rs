//! Embedded note storage core.
//! Persists title/body notes in a local SQLite file and exposes CRUD to an
//! in-process front end.

pub mod config;
pub mod context;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::StoreConfig;
pub use context::{CancelToken, ContextDone, OpContext};
pub use db::{DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{Note, NoteId};
pub use repo::note_repo::{NoteRepository, NoteStore, RepoError, RepoResult, StorageError};
