//! Domain model for persisted notes.
//!
//! # Responsibility
//! - Define the single `Note` record exchanged with callers.
//!
//! # Invariants
//! - Every `Note` is materialized from a full persisted row.

pub mod note;
