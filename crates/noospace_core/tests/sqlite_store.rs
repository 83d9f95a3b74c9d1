mod common;

use chrono::{FixedOffset, TimeZone, Timelike, Utc};
use common::{noon, WALLET};
use noospace_core::db::{open_db, open_db_in_memory};
use noospace_core::{
    EngineConfig, EngineError, EntryEngine, EntryInput, EntryStore, FixedClock, Identity,
    NewEntry, SqliteEntryStore, StaticIdentityProvider, StoreError,
};
use rusqlite::Connection;
use uuid::Uuid;

fn draft(text: &str, owner: Identity, hour: u32) -> NewEntry {
    NewEntry {
        text: text.to_string(),
        symbol: "◈".to_string(),
        tags: vec!["dream".to_string(), "sky".to_string()],
        owner,
        created_at: Utc.with_ymd_and_hms(2026, 5, 2, hour, 0, 0).unwrap(),
        stars: 0,
    }
}

#[test]
fn insert_then_fetch_preserves_fields_and_date_order() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntryStore::try_new(&conn).unwrap();

    let late = store.insert(&draft("late", Identity::Guest, 9)).unwrap();
    let early = store
        .insert(&draft("early", Identity::Wallet(WALLET.to_string()), 7))
        .unwrap();

    let all = store.fetch_all().unwrap();
    assert_eq!(all, vec![early, late]);
    assert_eq!(all[0].tags, vec!["dream", "sky"]);
}

#[test]
fn equal_dates_keep_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntryStore::try_new(&conn).unwrap();

    let first = store.insert(&draft("first", Identity::Guest, 8)).unwrap();
    let second = store.insert(&draft("second", Identity::Guest, 8)).unwrap();

    let ids: Vec<Uuid> = store.fetch_all().unwrap().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[test]
fn star_update_is_compare_and_set() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntryStore::try_new(&conn).unwrap();
    let entry = store.insert(&draft("shine", Identity::Guest, 8)).unwrap();

    assert_eq!(store.update_stars(entry.id, 0, 1).unwrap().stars, 1);
    let err = store.update_stars(entry.id, 0, 1).unwrap_err();
    assert!(matches!(err, StoreError::Conflict { current: 1, .. }));

    let missing = store.update_stars(Uuid::new_v4(), 0, 1).unwrap_err();
    assert!(matches!(missing, StoreError::NotFound(_)));
}

#[test]
fn delete_removes_row_once() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntryStore::try_new(&conn).unwrap();
    let entry = store.insert(&draft("brief", Identity::Guest, 8)).unwrap();

    store.delete(entry.id).unwrap();

    assert!(store.fetch_all().unwrap().is_empty());
    assert!(matches!(
        store.delete(entry.id).unwrap_err(),
        StoreError::NotFound(_)
    ));
}

#[test]
fn corrupt_rows_are_reported_not_masked() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO entries (id, text, symbol, tags, wallet, date, stars)
         VALUES (?1, 'hello', '✶', 'not json', 'guest', '2026-05-02T08:00:00.000Z', 0);",
        [Uuid::new_v4().to_string()],
    )
    .unwrap();
    let store = SqliteEntryStore::try_new(&conn).unwrap();

    let err = store.fetch_all().unwrap_err();

    assert!(matches!(err, StoreError::InvalidData(message) if message.contains("entries.tags")));
}

#[test]
fn empty_tag_list_is_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO entries (id, text, symbol, tags, wallet, date, stars)
         VALUES (?1, 'hello', '✶', '[]', 'guest', '2026-05-02T08:00:00.000Z', 0);",
        [Uuid::new_v4().to_string()],
    )
    .unwrap();
    let store = SqliteEntryStore::try_new(&conn).unwrap();

    assert!(matches!(
        store.fetch_all().unwrap_err(),
        StoreError::InvalidData(_)
    ));
}

#[test]
fn unmigrated_connection_is_refused() {
    let conn = Connection::open_in_memory().unwrap();
    assert!(matches!(
        SqliteEntryStore::try_new(&conn),
        Err(StoreError::InvalidData(_))
    ));
}

#[test]
fn file_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("noospace.sqlite3");

    let id = {
        let conn = open_db(&path).unwrap();
        let store = SqliteEntryStore::try_new(&conn).unwrap();
        store.insert(&draft("durable", Identity::Guest, 8)).unwrap().id
    };

    let conn = open_db(&path).unwrap();
    let store = SqliteEntryStore::try_new(&conn).unwrap();
    let all = store.fetch_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, id);
    assert_eq!(all[0].text, "durable");
}

#[test]
fn engine_runs_over_sqlite() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntryStore::try_new(&conn).unwrap();
    let mut engine = EntryEngine::new(
        store,
        StaticIdentityProvider::connected(WALLET),
        EngineConfig::default(),
    )
    .with_clock(FixedClock(noon()));
    engine.attach().unwrap();

    let entry = engine
        .submit(&EntryInput::new("  persisted  ").with_tags("Sky, sky, sea"))
        .unwrap();
    assert_eq!(entry.text, "persisted");
    assert_eq!(entry.tags, vec!["sky", "sea"]);

    assert_eq!(engine.resonate(entry.id).unwrap().stars, 1);
    assert_eq!(engine.refresh().unwrap()[0].stars, 1);

    engine.retract(entry.id).unwrap();
    assert!(engine.refresh().unwrap().is_empty());
    assert!(matches!(
        engine.retract(entry.id).unwrap_err(),
        EngineError::NotFound(_)
    ));
}

#[test]
fn tighter_configured_limits_stay_readable() {
    let config = EngineConfig::from_toml_str("max_tags = 3\nmax_text_chars = 100").unwrap();
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntryStore::try_new(&conn).unwrap();
    let mut engine = EntryEngine::new(store, StaticIdentityProvider::connected(WALLET), config)
        .with_clock(FixedClock(noon()));
    engine.attach().unwrap();

    let entry = engine
        .submit(&EntryInput::new("short").with_tags("a,b,c,d,e,f,g"))
        .unwrap();
    assert_eq!(entry.tags, vec!["a", "b", "c"]);
    assert!(matches!(
        engine.submit(&EntryInput::new("x".repeat(101))).unwrap_err(),
        EngineError::Validation(_)
    ));

    assert_eq!(engine.refresh().unwrap().len(), 1);
}

#[test]
fn limits_the_table_cannot_hold_are_refused() {
    assert!(EngineConfig::from_toml_str("max_tags = 7").is_err());
    assert!(EngineConfig::from_toml_str("max_text_chars = 300").is_err());
}

#[test]
fn submitted_entry_matches_row_read_back() {
    let precise = FixedOffset::east_opt(2 * 3600)
        .unwrap()
        .with_ymd_and_hms(2026, 5, 2, 14, 0, 0)
        .unwrap()
        .with_nanosecond(123_456_789)
        .unwrap();
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEntryStore::try_new(&conn).unwrap();
    let mut engine = EntryEngine::new(
        store,
        StaticIdentityProvider::unavailable(),
        EngineConfig::default(),
    )
    .with_clock(FixedClock(precise));
    engine.attach().unwrap();

    let submitted = engine.submit(&EntryInput::new("precise")).unwrap();
    assert_eq!(submitted.created_at.nanosecond(), 123_000_000);

    let cached = engine.entries().to_vec();
    assert_eq!(engine.refresh().unwrap(), cached.as_slice());
}
