//! Domain model for journal entries and their owners.
//!
//! # Responsibility
//! - Define canonical data structures shared by ingest, store and engine.
//!
//! # Invariants
//! - Every persisted entry is identified by a store-assigned `EntryId`.
//! - Deletion is a hard delete performed by the store, owner-gated upstream.

pub mod entry;
pub mod identity;
