//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record and its wire field names.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused.
//! - `created_at` is captured once at insert and never recomputed.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Store-assigned integer identity of a note.
pub type NoteId = i64;

/// One persisted note.
///
/// Serialized as `{ id, title, note, createdAt }` for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    /// Free-form body text. Empty for freshly created notes.
    #[serde(rename = "note")]
    pub body: String,
    /// Unix epoch milliseconds.
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

/// Current wall-clock time in Unix epoch milliseconds.
///
/// Clocks set before 1970 collapse to `0`.
pub fn now_epoch_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
