#![allow(dead_code)]

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use noospace_core::{
    EngineConfig, Entry, EntryEngine, EntryId, EntryStore, FixedClock, Identity,
    MemoryEntryStore, NewEntry, StaticIdentityProvider, StoreError, StoreResult,
};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub type TestEngine = EntryEngine<Arc<ScriptedStore>, Arc<StaticIdentityProvider>>;

pub const WALLET: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

/// 2026-05-02 12:00 at UTC+0.
pub fn noon() -> DateTime<FixedOffset> {
    at(0, 2026, 5, 2, 12)
}

pub fn at(offset_hours: i32, year: i32, month: u32, day: u32, hour: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(offset_hours * 3600)
        .unwrap()
        .with_ymd_and_hms(year, month, day, hour, 0, 0)
        .unwrap()
}

/// Memory store with call counting, failure injection and simulated
/// concurrent star writers.
#[derive(Default)]
pub struct ScriptedStore {
    pub inner: MemoryEntryStore,
    pub inserts: AtomicUsize,
    pub star_writes: AtomicUsize,
    pub deletes: AtomicUsize,
    /// Foreign `+1` writes applied right before each of our star writes.
    pub interfering_writers: AtomicU32,
    fail_next: Mutex<Option<String>>,
}

impl ScriptedStore {
    pub fn seeded(entries: Vec<Entry>) -> Self {
        Self {
            inner: MemoryEntryStore::with_entries(entries),
            ..Self::default()
        }
    }

    pub fn fail_next(&self, message: &str) {
        *self.fail_next.lock().unwrap() = Some(message.to_string());
    }

    fn injected_failure(&self) -> StoreResult<()> {
        match self.fail_next.lock().unwrap().take() {
            Some(message) => Err(StoreError::Backend(message)),
            None => Ok(()),
        }
    }

    fn current_stars(&self, id: EntryId) -> Option<u32> {
        self.inner
            .fetch_all()
            .unwrap()
            .into_iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.stars)
    }
}

impl EntryStore for ScriptedStore {
    fn fetch_all(&self) -> StoreResult<Vec<Entry>> {
        self.injected_failure()?;
        self.inner.fetch_all()
    }

    fn insert(&self, entry: &NewEntry) -> StoreResult<Entry> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.injected_failure()?;
        self.inner.insert(entry)
    }

    fn update_stars(&self, id: EntryId, expected: u32, new: u32) -> StoreResult<Entry> {
        self.star_writes.fetch_add(1, Ordering::SeqCst);
        self.injected_failure()?;
        if self.interfering_writers.load(Ordering::SeqCst) > 0 {
            self.interfering_writers.fetch_sub(1, Ordering::SeqCst);
            if let Some(current) = self.current_stars(id) {
                self.inner.update_stars(id, current, current + 1)?;
            }
        }
        self.inner.update_stars(id, expected, new)
    }

    fn delete(&self, id: EntryId) -> StoreResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.injected_failure()?;
        self.inner.delete(id)
    }
}

/// Already-persisted entry fixture.
pub fn stored(owner: Identity, text: &str, tags: &[&str], created_at: DateTime<FixedOffset>) -> Entry {
    Entry {
        id: Uuid::new_v4(),
        text: text.to_string(),
        symbol: "✶".to_string(),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        owner,
        created_at: created_at.with_timezone(&Utc),
        stars: 0,
    }
}

pub struct Harness {
    pub store: Arc<ScriptedStore>,
    pub provider: Arc<StaticIdentityProvider>,
    pub engine: TestEngine,
}

impl Harness {
    pub fn new(provider: StaticIdentityProvider, config: EngineConfig) -> Self {
        Self::with_store(ScriptedStore::default(), provider, config)
    }

    pub fn with_store(
        store: ScriptedStore,
        provider: StaticIdentityProvider,
        config: EngineConfig,
    ) -> Self {
        let store = Arc::new(store);
        let provider = Arc::new(provider);
        let engine = EntryEngine::new(store.clone(), provider.clone(), config)
            .with_clock(FixedClock(noon()));
        Self {
            store,
            provider,
            engine,
        }
    }

    /// Attached engine for an environment without a wallet.
    pub fn guest() -> Self {
        let mut harness = Self::new(StaticIdentityProvider::unavailable(), EngineConfig::default());
        harness.engine.attach().unwrap();
        harness
    }

    /// Attached engine already connected to `WALLET`.
    pub fn wallet() -> Self {
        let mut harness = Self::new(
            StaticIdentityProvider::connected(WALLET),
            EngineConfig::default(),
        );
        harness.engine.attach().unwrap();
        harness
    }

    pub fn inserts(&self) -> usize {
        self.store.inserts.load(Ordering::SeqCst)
    }
}
