//! Note repository contract and SQLite-backed `NoteStore`.
//!
//! # Responsibility
//! - Provide list/get/create/update/delete over the `notes` table.
//! - Own the single SQLite connection for the store's lifetime.
//! - Translate SQLite failures, interrupts and lookup misses into `RepoError`.
//!
//! # Invariants
//! - Every operation is exactly one statement round-trip.
//! - Lists are ordered `created_at DESC, id DESC`.
//! - `created_at` is assigned here at insert and never written again.
//! - Updates/deletes that match no row succeed silently; a `status=noop`
//!   warning is logged instead.

use crate::config::StoreConfig;
use crate::context::{ContextDone, OpContext};
use crate::db::{self, DbError, DbResult};
use crate::model::note::{now_epoch_millis, Note, NoteId};
use crate::repo::interrupt::{is_interrupt, InterruptGuard};
use log::{debug, error, warn};
use rusqlite::{params, Connection, OptionalExtension, Params, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    title,
    note,
    created_at
FROM notes";
const UPDATE_TITLE_SQL: &str = "UPDATE notes SET title = ?1 WHERE id = ?2;";
const UPDATE_BODY_SQL: &str = "UPDATE notes SET note = ?1 WHERE id = ?2;";
const DELETE_NOTE_SQL: &str = "DELETE FROM notes WHERE id = ?1;";

pub type RepoResult<T> = Result<T, RepoError>;

/// Failure talking to the database, including caller-initiated aborts.
#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    Cancelled,
    DeadlineExceeded,
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Cancelled => write!(f, "operation cancelled"),
            Self::DeadlineExceeded => write!(f, "operation deadline exceeded"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Cancelled | Self::DeadlineExceeded => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ContextDone> for StorageError {
    fn from(value: ContextDone) -> Self {
        match value {
            ContextDone::Cancelled => Self::Cancelled,
            ContextDone::DeadlineExceeded => Self::DeadlineExceeded,
        }
    }
}

/// Repository error for note persistence and lookup.
#[derive(Debug)]
pub enum RepoError {
    Storage(StorageError),
    NotFound(NoteId),
}

impl RepoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "note_not_found",
            Self::Storage(StorageError::Cancelled) => "cancelled",
            Self::Storage(StorageError::DeadlineExceeded) => "deadline_exceeded",
            Self::Storage(StorageError::Db(_)) => "db_error",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<StorageError> for RepoError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Storage(value.into())
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(value.into())
    }
}

/// Repository interface for note CRUD operations.
pub trait NoteRepository {
    /// Lists every note, most recent first.
    fn list_notes(&self, ctx: &OpContext) -> RepoResult<Vec<Note>>;
    /// Gets one note by id, or `RepoError::NotFound`.
    fn get_note(&self, ctx: &OpContext, id: NoteId) -> RepoResult<Note>;
    /// Inserts a note with `title` and an empty body.
    fn create_note(&self, ctx: &OpContext, title: &str) -> RepoResult<Note>;
    /// Overwrites only the title.
    fn update_title(&self, ctx: &OpContext, id: NoteId, title: &str) -> RepoResult<()>;
    /// Overwrites only the body.
    fn update_body(&self, ctx: &OpContext, id: NoteId, body: &str) -> RepoResult<()>;
    /// Removes the note.
    fn delete_note(&self, ctx: &OpContext, id: NoteId) -> RepoResult<()>;
}

/// Result of a keyed write. Zero-row writes are not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteOutcome {
    Applied,
    NoMatchingRow,
}

/// SQLite-backed note store owning its connection.
pub struct NoteStore {
    conn: Connection,
}

impl NoteStore {
    /// Opens the database named by `config` and ensures the schema.
    ///
    /// # Errors
    /// - Returns `DbError` when the file cannot be opened or the schema cannot
    ///   be created. Callers treat this as fatal to startup.
    pub fn open(config: &StoreConfig) -> DbResult<Self> {
        Ok(Self {
            conn: db::open_db(config)?,
        })
    }

    /// Opens a private in-memory store.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self {
            conn: db::open_db_in_memory()?,
        })
    }

    /// Re-runs the idempotent schema step.
    pub fn ensure_schema(&self) -> DbResult<()> {
        db::ensure_schema(&self.conn)
    }

    fn round_trip<T>(
        &self,
        ctx: &OpContext,
        event: &'static str,
        note_id: Option<NoteId>,
        op: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> RepoResult<T> {
        let started_at = Instant::now();
        let id_field = note_id.map_or_else(String::new, |id| format!(" note_id={id}"));

        if let Some(done) = ctx.done() {
            let err = RepoError::Storage(done.into());
            warn!(
                "event={event} module=repo status=error{id_field} error_code={} stage=before_query",
                err.code()
            );
            return Err(err);
        }

        let result = {
            let _guard = InterruptGuard::install(&self.conn, ctx);
            op(&self.conn)
        };

        match result {
            Ok(value) => {
                debug!(
                    "event={event} module=repo status=ok{id_field} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(sqlite_err) => {
                let err = match ctx.done() {
                    Some(done) if is_interrupt(&sqlite_err) => RepoError::Storage(done.into()),
                    _ => RepoError::from(sqlite_err),
                };
                error!(
                    "event={event} module=repo status=error{id_field} duration_ms={} error_code={} error={}",
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Runs a single-row write keyed by `id` and reports whether a row matched.
    fn write_by_id(
        &self,
        ctx: &OpContext,
        event: &'static str,
        id: NoteId,
        sql: &'static str,
        params: impl Params,
    ) -> RepoResult<WriteOutcome> {
        let changed = self.round_trip(ctx, event, Some(id), |conn| conn.execute(sql, params))?;
        if changed == 0 {
            warn!("event={event} module=repo status=noop note_id={id} reason=no_matching_row");
            return Ok(WriteOutcome::NoMatchingRow);
        }
        Ok(WriteOutcome::Applied)
    }
}

impl NoteRepository for NoteStore {
    fn list_notes(&self, ctx: &OpContext) -> RepoResult<Vec<Note>> {
        self.round_trip(ctx, "note_list", None, |conn| {
            let mut stmt =
                conn.prepare(&format!("{NOTE_SELECT_SQL} ORDER BY created_at DESC, id DESC;"))?;
            let mut rows = stmt.query([])?;
            let mut notes = Vec::new();
            while let Some(row) = rows.next()? {
                notes.push(note_from_row(row)?);
            }
            Ok(notes)
        })
    }

    fn get_note(&self, ctx: &OpContext, id: NoteId) -> RepoResult<Note> {
        let found = self.round_trip(ctx, "note_get", Some(id), |conn| {
            conn.query_row(
                &format!("{NOTE_SELECT_SQL} WHERE id = ?1;"),
                [id],
                note_from_row,
            )
            .optional()
        })?;

        found.ok_or(RepoError::NotFound(id))
    }

    fn create_note(&self, ctx: &OpContext, title: &str) -> RepoResult<Note> {
        self.round_trip(ctx, "note_create", None, |conn| {
            conn.query_row(
                "INSERT INTO notes (title, note, created_at)
                 VALUES (?1, '', ?2)
                 RETURNING id, title, note, created_at;",
                params![title, now_epoch_millis()],
                note_from_row,
            )
        })
    }

    fn update_title(&self, ctx: &OpContext, id: NoteId, title: &str) -> RepoResult<()> {
        self.write_by_id(ctx, "note_update_title", id, UPDATE_TITLE_SQL, params![title, id])
            .map(|_| ())
    }

    fn update_body(&self, ctx: &OpContext, id: NoteId, body: &str) -> RepoResult<()> {
        self.write_by_id(ctx, "note_update_body", id, UPDATE_BODY_SQL, params![body, id])
            .map(|_| ())
    }

    fn delete_note(&self, ctx: &OpContext, id: NoteId) -> RepoResult<()> {
        self.write_by_id(ctx, "note_delete", id, DELETE_NOTE_SQL, [id])
            .map(|_| ())
    }
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get("id")?,
        title: row.get("title")?,
        body: row.get("note")?,
        created_at: row.get("created_at")?,
    })
}
