//! Core logic for the Noospace journal.
//!
//! Users post short tagged "echoes", optionally under a wallet identity, and
//! browse them as a spiral or a chronological list. This crate owns entry
//! validation, the per-identity daily quota, view derivation and the session
//! engine; persistence and identity are injected collaborators.

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod identity;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod store;
pub mod view;

pub use config::{EngineConfig, EntryLimits, LoggingConfig, SpiralGeometry};
pub use engine::{ensure_owner, Clock, EntryEngine, FixedClock, SystemClock};
pub use error::{EngineError, EngineResult, ValidationError};
pub use identity::{
    IdentityEvent, IdentityListener, IdentityProvider, ProviderError, ProviderState,
    StaticIdentityProvider, SubscriptionId,
};
pub use ingest::normalize::{build_entry, normalize_symbol, normalize_tags, validate_text};
pub use ingest::quota::{count_today, day_key, remaining_today};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::entry::{Entry, EntryId, EntryInput, NewEntry};
pub use model::identity::{Identity, GUEST_IDENTITY};
pub use store::{EntryStore, MemoryEntryStore, SqliteEntryStore, StoreError, StoreResult};
pub use view::{filter_by_tag, spiral_layout, EntryView, SpiralPoint, ViewMode};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
