//! Repository layer: note persistence behind a trait seam.
//!
//! # Responsibility
//! - Define the note data-access contract.
//! - Keep SQL and interrupt plumbing inside the persistence boundary.
//!
//! # Invariants
//! - Lookup misses surface as `RepoError::NotFound`, distinct from storage
//!   failures.

mod interrupt;
pub mod note_repo;
