//! Statement interruption driven by `OpContext`.
//!
//! # Invariants
//! - The progress handler is removed when the guard drops, so a later call
//!   with a fresh context never sees a stale cancel.

use crate::context::OpContext;
use rusqlite::{Connection, ErrorCode};
use std::os::raw::c_int;

/// VM instructions between context polls.
const PROGRESS_POLL_OPS: c_int = 100;

/// Installs a progress handler that aborts the running statement once the
/// context fires.
pub(crate) struct InterruptGuard<'conn> {
    conn: &'conn Connection,
}

impl<'conn> InterruptGuard<'conn> {
    pub(crate) fn install(conn: &'conn Connection, ctx: &OpContext) -> Self {
        let ctx = ctx.clone();
        conn.progress_handler(PROGRESS_POLL_OPS, Some(move || ctx.done().is_some()));
        Self { conn }
    }
}

impl Drop for InterruptGuard<'_> {
    fn drop(&mut self) {
        self.conn.progress_handler(0, None::<fn() -> bool>);
    }
}

/// Whether SQLite stopped the statement because the progress handler asked.
pub(crate) fn is_interrupt(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _) if failure.code == ErrorCode::OperationInterrupted
    )
}
