//! Entry domain model.
//!
//! # Responsibility
//! - Define the persisted "echo" record and its pre-persistence draft.
//! - Provide shape checks shared by the store read paths.
//!
//! # Invariants
//! - `text` is trimmed and 1..=240 characters for every persisted entry.
//! - `tags` holds 1..=5 lower-cased, trimmed, non-empty values.
//! - `stars` never decreases; `owner` never changes after creation.

use crate::model::identity::Identity;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Store-assigned entry identifier.
pub type EntryId = Uuid;

/// One posted, timestamped, tagged thought.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub text: String,
    pub symbol: String,
    pub tags: Vec<String>,
    /// Serialized as `wallet` to match the hosted table schema.
    #[serde(rename = "wallet")]
    pub owner: Identity,
    /// Serialized as `date` to match the hosted table schema.
    #[serde(rename = "date")]
    pub created_at: DateTime<Utc>,
    pub stars: u32,
}

/// Fully validated entry that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    pub text: String,
    pub symbol: String,
    pub tags: Vec<String>,
    #[serde(rename = "wallet")]
    pub owner: Identity,
    #[serde(rename = "date")]
    pub created_at: DateTime<Utc>,
    pub stars: u32,
}

/// Raw composer values before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryInput {
    pub text: String,
    pub symbol: String,
    /// Comma separated tag list as typed by the user.
    pub tags: String,
}

impl EntryInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }
}

/// Persisted shape violations detected on read-back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryShapeError {
    TextLength(usize),
    NoTags,
    TooManyTags(usize),
    MalformedTag(String),
}

impl Display for EntryShapeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TextLength(len) => write!(f, "entry text length {len} is out of range"),
            Self::NoTags => write!(f, "entry carries no tags"),
            Self::TooManyTags(count) => write!(f, "entry carries {count} tags"),
            Self::MalformedTag(tag) => write!(f, "entry tag `{tag}` is not normalized"),
        }
    }
}

impl Error for EntryShapeError {}

impl NewEntry {
    /// Attaches the store-assigned id.
    pub fn into_entry(self, id: EntryId) -> Entry {
        Entry {
            id,
            text: self.text,
            symbol: self.symbol,
            tags: self.tags,
            owner: self.owner,
            created_at: self.created_at,
            stars: self.stars,
        }
    }
}

impl Entry {
    /// ISO-8601 creation timestamp (UTC, millisecond precision, `Z` suffix).
    pub fn created_at_iso(&self) -> String {
        self.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|value| value == tag)
    }

    pub fn is_owned_by(&self, identity: &Identity) -> bool {
        &self.owner == identity
    }

    /// Checks the persisted-entry invariants against the given limits.
    pub fn check_shape(&self, max_text_chars: usize, max_tags: usize) -> Result<(), EntryShapeError> {
        let len = self.text.chars().count();
        if len == 0 || len > max_text_chars || self.text.trim() != self.text {
            return Err(EntryShapeError::TextLength(len));
        }
        if self.tags.is_empty() {
            return Err(EntryShapeError::NoTags);
        }
        if self.tags.len() > max_tags {
            return Err(EntryShapeError::TooManyTags(self.tags.len()));
        }
        for tag in &self.tags {
            if tag.is_empty() || tag.trim() != tag.as_str() || tag.to_lowercase() != *tag {
                return Err(EntryShapeError::MalformedTag(tag.clone()));
            }
        }
        Ok(())
    }
}
