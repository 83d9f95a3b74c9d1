//! Entry store contract and implementations.
//!
//! # Responsibility
//! - Define the CRUD boundary the engine persists through.
//! - Provide an in-process store and a durable SQLite store.
//!
//! # Invariants
//! - `fetch_all` is ordered ascending by `created_at`, ties by insertion order.
//! - `update_stars` is a compare-and-set: it only writes when the persisted
//!   count equals `expected`, and otherwise reports `Conflict` with the
//!   current count. This is the store's answer to concurrent resonate calls.
//! - The store owns `id` assignment.

use crate::db::DbError;
use crate::model::entry::{Entry, EntryId, NewEntry};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryEntryStore;
pub use sqlite::SqliteEntryStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store failure kinds.
#[derive(Debug)]
pub enum StoreError {
    NotFound(EntryId),
    /// Compare-and-set lost against a concurrent writer.
    Conflict { id: EntryId, current: u32 },
    Db(DbError),
    InvalidData(String),
    Backend(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "entry not found: {id}"),
            Self::Conflict { id, current } => {
                write!(f, "star count of entry {id} changed concurrently (now {current})")
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted entry data: {message}"),
            Self::Backend(message) => write!(f, "entry store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable ordered collection of entries.
pub trait EntryStore {
    /// Returns every entry ascending by creation time.
    fn fetch_all(&self) -> StoreResult<Vec<Entry>>;
    /// Persists a new entry and returns it with its assigned id.
    fn insert(&self, entry: &NewEntry) -> StoreResult<Entry>;
    /// Sets `stars = new` when the stored count still equals `expected`.
    fn update_stars(&self, id: EntryId, expected: u32, new: u32) -> StoreResult<Entry>;
    /// Removes one entry.
    fn delete(&self, id: EntryId) -> StoreResult<()>;
}

impl<T: EntryStore + ?Sized> EntryStore for &T {
    fn fetch_all(&self) -> StoreResult<Vec<Entry>> {
        (**self).fetch_all()
    }

    fn insert(&self, entry: &NewEntry) -> StoreResult<Entry> {
        (**self).insert(entry)
    }

    fn update_stars(&self, id: EntryId, expected: u32, new: u32) -> StoreResult<Entry> {
        (**self).update_stars(id, expected, new)
    }

    fn delete(&self, id: EntryId) -> StoreResult<()> {
        (**self).delete(id)
    }
}

impl<T: EntryStore + ?Sized> EntryStore for Arc<T> {
    fn fetch_all(&self) -> StoreResult<Vec<Entry>> {
        (**self).fetch_all()
    }

    fn insert(&self, entry: &NewEntry) -> StoreResult<Entry> {
        (**self).insert(entry)
    }

    fn update_stars(&self, id: EntryId, expected: u32, new: u32) -> StoreResult<Entry> {
        (**self).update_stars(id, expected, new)
    }

    fn delete(&self, id: EntryId) -> StoreResult<()> {
        (**self).delete(id)
    }
}
