//! Entry engine: one user session over an entry store and identity provider.
//!
//! # Responsibility
//! - Own the locally cached entry list and the session identity.
//! - Orchestrate submit/resonate/retract against the injected store.
//! - Track identity transitions pushed by the injected provider.
//! - Derive the filtered spiral/scroll views.
//!
//! # Invariants
//! - Every operation is sequential; the cache only changes after the store
//!   confirms a write, so a failed call leaves the session as it was.
//! - Pending identity events are applied before each operation.
//! - Guest mode pins identity to `guest` and never subscribes to the provider.
//! - Every failure is logged and kept as a user-facing `last_error`.

mod clock;
mod inbox;

pub use clock::{Clock, FixedClock, SystemClock};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::identity::{
    IdentityEvent, IdentityListener, IdentityProvider, ProviderError, ProviderState,
    SubscriptionId,
};
use crate::ingest::normalize::{build_entry, normalize_tag};
use crate::ingest::quota::{count_today, remaining_today};
use crate::model::entry::{Entry, EntryId, EntryInput};
use crate::model::identity::Identity;
use crate::store::{EntryStore, StoreError};
use crate::view::{filter_by_tag, spiral_layout, EntryView, ViewMode};
use inbox::IdentityInbox;
use log::{debug, info, warn};
use std::sync::Arc;

/// Fails with `Unauthorized` unless `requester` owns `entry`.
pub fn ensure_owner(entry: &Entry, requester: &Identity) -> EngineResult<()> {
    if entry.is_owned_by(requester) {
        Ok(())
    } else {
        Err(EngineError::Unauthorized {
            entry_id: entry.id,
            requester: requester.clone(),
        })
    }
}

/// Stateful session facade over store and identity collaborators.
pub struct EntryEngine<S: EntryStore, P: IdentityProvider> {
    store: S,
    provider: P,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    entries: Vec<Entry>,
    identity: Identity,
    connected: bool,
    inbox: Arc<IdentityInbox>,
    subscription: Option<SubscriptionId>,
    filter: Option<String>,
    view_mode: ViewMode,
    resonance: u32,
    last_error: Option<String>,
}

impl<S: EntryStore, P: IdentityProvider> EntryEngine<S, P> {
    /// Creates a detached engine with an empty cache and `guest` identity.
    pub fn new(store: S, provider: P, config: EngineConfig) -> Self {
        Self {
            store,
            provider,
            clock: Arc::new(SystemClock),
            config,
            entries: Vec::new(),
            identity: Identity::Guest,
            connected: false,
            inbox: Arc::new(IdentityInbox::default()),
            subscription: None,
            filter: None,
            view_mode: ViewMode::default(),
            resonance: 0,
            last_error: None,
        }
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    // ------------------------------------------------------------------
    // Lifecycle and identity
    // ------------------------------------------------------------------

    /// Subscribes to provider transitions, adopts the provider's current
    /// state, then loads the entry list.
    pub fn attach(&mut self) -> EngineResult<()> {
        if self.config.guest_mode {
            self.identity = Identity::Guest;
            self.connected = false;
            info!("event=engine_attach module=engine status=ok mode=guest");
        } else {
            if self.subscription.is_none() {
                let listener: Arc<dyn IdentityListener> = self.inbox.clone();
                self.subscription = Some(self.provider.subscribe(listener));
            }
            match self.provider.state() {
                ProviderState::Connected(address) => {
                    if let Err(err) = self.adopt_wallet(&address) {
                        warn!("event=engine_attach module=engine status=degraded error={err}");
                    }
                }
                ProviderState::Disconnected | ProviderState::Unavailable => {}
            }
            info!(
                "event=engine_attach module=engine status=ok mode=wallet connected={}",
                self.connected
            );
        }

        self.refresh().map(|_| ())
    }

    /// Unsubscribes from the provider and discards queued events.
    pub fn detach(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.provider.unsubscribe(id);
            self.inbox.drain();
            info!("event=engine_detach module=engine status=ok");
        }
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Applies queued provider transitions.
    pub fn sync_identity(&mut self) {
        if self.config.guest_mode {
            return;
        }
        for event in self.inbox.drain() {
            self.apply_event(event);
        }
    }

    /// Requests a wallet connection from the provider.
    pub fn connect(&mut self) -> EngineResult<Identity> {
        self.sync_identity();
        if self.config.guest_mode {
            let err = ProviderError::Rejected("guest mode is active".to_string());
            return Err(self.fail("connect", err.into()));
        }

        let granted = self.provider.connect().and_then(|raw| match Identity::parse(&raw) {
            Ok(identity @ Identity::Wallet(_)) => Ok(identity),
            _ => Err(ProviderError::InvalidIdentity(raw)),
        });

        match granted {
            Ok(identity) => {
                self.identity = identity.clone();
                self.connected = true;
                self.last_error = None;
                self.resonance += 1;
                info!(
                    "event=identity_connect module=engine status=ok identity={}",
                    identity.short_label()
                );
                Ok(identity)
            }
            Err(err) => Err(self.fail("connect", err.into())),
        }
    }

    /// Disconnects the wallet; identity falls back to `guest`.
    pub fn disconnect(&mut self) -> EngineResult<()> {
        self.sync_identity();
        if self.config.guest_mode {
            return Ok(());
        }

        match self.provider.disconnect() {
            Ok(()) => {
                self.identity = Identity::Guest;
                self.connected = false;
                self.resonance = 0;
                info!("event=identity_disconnect module=engine status=ok");
                Ok(())
            }
            Err(err) => Err(self.fail("disconnect", err.into())),
        }
    }

    fn apply_event(&mut self, event: IdentityEvent) {
        match event {
            IdentityEvent::Connected(address) => {
                if let Err(err) = self.adopt_wallet(&address) {
                    warn!("event=identity_event module=engine status=ignored error={err}");
                }
            }
            IdentityEvent::Disconnected => {
                self.identity = Identity::Guest;
                self.connected = false;
                debug!("event=identity_event module=engine status=ok kind=disconnected");
            }
        }
    }

    fn adopt_wallet(&mut self, address: &str) -> Result<(), ProviderError> {
        match Identity::parse(address) {
            Ok(identity @ Identity::Wallet(_)) => {
                debug!(
                    "event=identity_event module=engine status=ok kind=connected identity={}",
                    identity.short_label()
                );
                self.identity = identity;
                self.connected = true;
                Ok(())
            }
            _ => Err(ProviderError::InvalidIdentity(address.to_string())),
        }
    }

    // ------------------------------------------------------------------
    // Store-backed operations
    // ------------------------------------------------------------------

    /// Replaces the cache with the store's full ordered collection.
    pub fn refresh(&mut self) -> EngineResult<&[Entry]> {
        self.last_error = None;
        match self.store.fetch_all() {
            Ok(entries) => {
                self.entries = entries;
                info!(
                    "event=entries_refresh module=engine status=ok count={}",
                    self.entries.len()
                );
                Ok(&self.entries)
            }
            Err(err) => Err(self.fail("refresh", err.into())),
        }
    }

    /// Validates input, enforces today's quota and persists a new entry.
    pub fn submit(&mut self, input: &EntryInput) -> EngineResult<Entry> {
        self.last_error = None;
        self.sync_identity();

        let now = self.clock.now();
        let draft = match build_entry(
            input,
            &self.identity,
            &self.entries,
            &now,
            &self.config.limits,
        ) {
            Ok(draft) => draft,
            Err(err) => return Err(self.fail("submit", err)),
        };

        match self.store.insert(&draft) {
            Ok(stored) => {
                self.entries.push(stored.clone());
                if !self.identity.is_guest() {
                    self.resonance += 1;
                }
                info!(
                    "event=entry_submit module=engine status=ok id={} owner={} tags={}",
                    stored.id,
                    stored.owner.short_label(),
                    stored.tags.len()
                );
                Ok(stored)
            }
            Err(err) => Err(self.fail("submit", err.into())),
        }
    }

    /// Adds one star to a cached entry.
    ///
    /// Uses the store's compare-and-set; on `Conflict` the reported current
    /// count becomes the next expectation, up to `resonate_max_attempts`.
    pub fn resonate(&mut self, id: EntryId) -> EngineResult<Entry> {
        self.last_error = None;
        self.sync_identity();

        let Some(mut expected) = self.cached(id).map(|entry| entry.stars) else {
            return Err(self.fail("resonate", EngineError::NotFound(id)));
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            let Some(next) = expected.checked_add(1) else {
                let err = StoreError::InvalidData(format!("star counter of {id} overflowed"));
                return Err(self.fail("resonate", err.into()));
            };

            match self.store.update_stars(id, expected, next) {
                Ok(row) => {
                    if let Some(slot) = self.entries.iter_mut().find(|entry| entry.id == id) {
                        *slot = row.clone();
                    }
                    info!(
                        "event=entry_resonate module=engine status=ok id={id} stars={} attempts={attempt}",
                        row.stars
                    );
                    return Ok(row);
                }
                Err(StoreError::Conflict { current, .. })
                    if attempt < self.config.resonate_max_attempts =>
                {
                    debug!(
                        "event=entry_resonate module=engine status=retry id={id} expected={expected} current={current}"
                    );
                    expected = current;
                }
                Err(err) => return Err(self.fail("resonate", err.into())),
            }
        }
    }

    /// Deletes an entry owned by the current identity.
    pub fn retract(&mut self, id: EntryId) -> EngineResult<()> {
        self.last_error = None;
        self.sync_identity();

        let authorized = match self.cached(id) {
            Some(entry) => ensure_owner(entry, &self.identity),
            None => Err(EngineError::NotFound(id)),
        };
        if let Err(err) = authorized {
            return Err(self.fail("retract", err));
        }

        match self.store.delete(id) {
            Ok(()) => {
                self.entries.retain(|entry| entry.id != id);
                info!("event=entry_retract module=engine status=ok id={id}");
                Ok(())
            }
            Err(err) => Err(self.fail("retract", err.into())),
        }
    }

    fn fail(&mut self, operation: &str, err: EngineError) -> EngineError {
        warn!(
            "event=engine_{operation} module=engine status=error error_code={} error={err}",
            err.code()
        );
        self.last_error = Some(err.user_message().to_string());
        err
    }

    fn cached(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    // ------------------------------------------------------------------
    // Quota and views
    // ------------------------------------------------------------------

    /// Entries the current identity posted today.
    pub fn count_today(&self) -> usize {
        count_today(&self.identity, &self.entries, &self.clock.now())
    }

    /// Submissions left today for the current identity.
    pub fn remaining_today(&self) -> usize {
        remaining_today(self.config.limits.daily_limit, self.count_today())
    }

    /// Sets the tag filter; a blank tag clears it.
    pub fn set_filter(&mut self, tag: &str) {
        self.filter = normalize_tag(tag);
    }

    pub fn clear_filter(&mut self) {
        self.filter = None;
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Cached entries after the tag filter, in store order.
    pub fn filtered(&self) -> Vec<&Entry> {
        filter_by_tag(&self.entries, self.filter.as_deref().unwrap_or(""))
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Renders the filtered entries for the active view mode.
    pub fn view(&self) -> EntryView<'_> {
        let filtered = self.filtered();
        match self.view_mode {
            ViewMode::Spiral => {
                EntryView::Spiral(spiral_layout(filtered, &self.config.spiral))
            }
            ViewMode::Scroll => EntryView::Scroll(filtered),
        }
    }

    /// Whether the retract action applies to `entry` for this session.
    pub fn can_retract(&self, entry: &Entry) -> bool {
        entry.is_owned_by(&self.identity)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Session counter: +1 per wallet connect and per wallet-owned submit,
    /// reset by an explicit disconnect.
    pub fn resonance(&self) -> u32 {
        self.resonance
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: EntryStore, P: IdentityProvider> Drop for EntryEngine<S, P> {
    fn drop(&mut self) {
        self.detach();
    }
}
