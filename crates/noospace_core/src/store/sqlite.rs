//! SQLite-backed entry store.
//!
//! # Responsibility
//! - Persist entries durably in the `entries` table.
//! - Keep SQL details behind the `EntryStore` boundary.
//!
//! # Invariants
//! - Rows are read back through `parse_entry_row`, which rejects corrupt
//!   state instead of masking it.
//! - Star updates are a single conditional `UPDATE`, atomic per row.
//! - Tags are stored as a JSON array preserving their order.

use crate::config::{MAX_STORED_TAGS, MAX_STORED_TEXT_CHARS};
use crate::db::migrations::{current_user_version, latest_version};
use crate::model::entry::{Entry, EntryId, NewEntry};
use crate::model::identity::Identity;
use crate::store::{EntryStore, StoreError, StoreResult};
use chrono::{DateTime, Utc};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const ENTRY_SELECT_SQL: &str = "SELECT
    id,
    text,
    symbol,
    tags,
    wallet,
    date,
    stars
FROM entries";

/// Entry store over a migrated SQLite connection.
pub struct SqliteEntryStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntryStore<'conn> {
    /// Wraps a connection opened through `open_db`/`open_db_in_memory`.
    ///
    /// # Errors
    /// - `StoreError::InvalidData` when the schema is not fully migrated.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let version = current_user_version(conn)?;
        if version != latest_version() {
            return Err(StoreError::InvalidData(format!(
                "entries schema at version {version}, expected {}",
                latest_version()
            )));
        }
        Ok(Self { conn })
    }

    fn get_entry(&self, id: EntryId) -> StoreResult<Option<Entry>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ENTRY_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_entry_row(row)?));
        }
        Ok(None)
    }
}

impl EntryStore for SqliteEntryStore<'_> {
    fn fetch_all(&self) -> StoreResult<Vec<Entry>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ENTRY_SELECT_SQL} ORDER BY date ASC, seq ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }

    fn insert(&self, entry: &NewEntry) -> StoreResult<Entry> {
        let id = Uuid::new_v4();
        let tags = serde_json::to_string(&entry.tags)
            .map_err(|err| StoreError::InvalidData(format!("unencodable tags: {err}")))?;
        let stored = entry.clone().into_entry(id);

        self.conn.execute(
            "INSERT INTO entries (id, text, symbol, tags, wallet, date, stars)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                id.to_string(),
                stored.text.as_str(),
                stored.symbol.as_str(),
                tags,
                stored.owner.as_str(),
                stored.created_at_iso(),
                stored.stars,
            ],
        )?;

        debug!("event=store_insert module=store status=ok backend=sqlite id={id}");
        Ok(stored)
    }

    fn update_stars(&self, id: EntryId, expected: u32, new: u32) -> StoreResult<Entry> {
        let changed = self.conn.execute(
            "UPDATE entries SET stars = ?3 WHERE id = ?1 AND stars = ?2;",
            params![id.to_string(), expected, new],
        )?;

        if changed == 0 {
            let current: Option<u32> = self
                .conn
                .query_row(
                    "SELECT stars FROM entries WHERE id = ?1;",
                    [id.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            return Err(match current {
                Some(current) => StoreError::Conflict { id, current },
                None => StoreError::NotFound(id),
            });
        }

        self.get_entry(id)?.ok_or(StoreError::NotFound(id))
    }

    fn delete(&self, id: EntryId) -> StoreResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM entries WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_entry_row(row: &Row<'_>) -> StoreResult<Entry> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        StoreError::InvalidData(format!("invalid uuid value `{id_text}` in entries.id"))
    })?;

    let tags_text: String = row.get("tags")?;
    let tags: Vec<String> = serde_json::from_str(&tags_text).map_err(|_| {
        StoreError::InvalidData(format!("invalid tags value `{tags_text}` in entries.tags"))
    })?;

    let wallet: String = row.get("wallet")?;
    let owner = Identity::parse(&wallet)
        .map_err(|err| StoreError::InvalidData(format!("{err} in entries.wallet")))?;

    let date_text: String = row.get("date")?;
    let created_at = DateTime::parse_from_rfc3339(&date_text)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|_| {
            StoreError::InvalidData(format!("invalid timestamp `{date_text}` in entries.date"))
        })?;

    let entry = Entry {
        id,
        text: row.get("text")?,
        symbol: row.get("symbol")?,
        tags,
        owner,
        created_at,
        stars: row.get("stars")?,
    };
    entry
        .check_shape(MAX_STORED_TEXT_CHARS, MAX_STORED_TAGS)
        .map_err(|err| StoreError::InvalidData(err.to_string()))?;
    Ok(entry)
}
