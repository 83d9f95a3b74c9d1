//! In-process entry store.
//!
//! Backs ephemeral sessions and tests. Rows live behind one mutex so every
//! compare-and-set is atomic with respect to other callers sharing the store.

use crate::model::entry::{Entry, EntryId, NewEntry};
use crate::store::{EntryStore, StoreError, StoreResult};
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Mutex-guarded vector of entries in insertion order.
#[derive(Debug, Default)]
pub struct MemoryEntryStore {
    rows: Mutex<Vec<Entry>>,
}

impl MemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with already-identified rows (imports, fixtures).
    pub fn with_entries(entries: Vec<Entry>) -> Self {
        Self {
            rows: Mutex::new(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }

    fn rows(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EntryStore for MemoryEntryStore {
    fn fetch_all(&self) -> StoreResult<Vec<Entry>> {
        let mut entries = self.rows().clone();
        entries.sort_by_key(|entry| entry.created_at);
        Ok(entries)
    }

    fn insert(&self, entry: &NewEntry) -> StoreResult<Entry> {
        let stored = entry.clone().into_entry(Uuid::new_v4());
        self.rows().push(stored.clone());
        Ok(stored)
    }

    fn update_stars(&self, id: EntryId, expected: u32, new: u32) -> StoreResult<Entry> {
        let mut rows = self.rows();
        let row = rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(StoreError::NotFound(id))?;

        if row.stars != expected {
            return Err(StoreError::Conflict {
                id,
                current: row.stars,
            });
        }
        row.stars = new;
        Ok(row.clone())
    }

    fn delete(&self, id: EntryId) -> StoreResult<()> {
        let mut rows = self.rows();
        let before = rows.len();
        rows.retain(|row| row.id != id);
        if rows.len() == before {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}
