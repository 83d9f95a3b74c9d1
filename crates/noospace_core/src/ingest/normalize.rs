//! Composer input normalization and entry construction.
//!
//! # Responsibility
//! - Validate entry text and normalize tags and symbol.
//! - Build a ready-to-insert `NewEntry` after the daily quota check.
//!
//! # Invariants
//! - Checks run in order: empty text, text length, daily quota.
//! - Lengths are counted in characters, not bytes.
//! - `build_entry` has no side effects; persistence belongs to the caller.
//! - `created_at` is truncated to the millisecond precision stores persist.

use crate::config::EntryLimits;
use crate::error::{EngineError, ValidationError};
use crate::ingest::quota::count_today;
use crate::model::entry::{Entry, EntryInput, NewEntry};
use crate::model::identity::Identity;
use chrono::{DateTime, FixedOffset, SubsecRound, Utc};

/// Trims entry text and enforces the `1..=max_chars` length window.
pub fn validate_text(raw: &str, max_chars: usize) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }

    let len = trimmed.chars().count();
    if len > max_chars {
        return Err(ValidationError::TooLong {
            len,
            max: max_chars,
        });
    }

    Ok(trimmed.to_string())
}

/// Normalizes one tag value; blank input yields `None`.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes a comma separated tag list.
///
/// Rules: split on `,`, trim, lower-case, drop empties, keep the first
/// occurrence of duplicates, keep at most `max_tags`. An empty result becomes
/// `[sentinel]`.
pub fn normalize_tags(raw: &str, max_tags: usize, sentinel: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for value in raw.split(',').filter_map(normalize_tag) {
        if tags.len() == max_tags {
            break;
        }
        if !tags.contains(&value) {
            tags.push(value);
        }
    }

    if tags.is_empty() {
        tags.push(sentinel.to_string());
    }
    tags
}

/// Truncates the symbol to `max_chars` characters, substituting the default
/// glyph when blank.
pub fn normalize_symbol(raw: &str, max_chars: usize, default: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return default.to_string();
    }
    trimmed.chars().take(max_chars).collect()
}

/// Validates composer input and constructs the entry to hand to the store.
pub fn build_entry<'a, I>(
    input: &EntryInput,
    identity: &Identity,
    existing: I,
    now: &DateTime<FixedOffset>,
    limits: &EntryLimits,
) -> Result<NewEntry, EngineError>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let text = validate_text(&input.text, limits.max_text_chars)?;
    let tags = normalize_tags(&input.tags, limits.max_tags, &limits.untagged_tag);
    let symbol = normalize_symbol(
        &input.symbol,
        limits.max_symbol_chars,
        &limits.default_symbol,
    );

    if count_today(identity, existing, now) >= limits.daily_limit {
        return Err(EngineError::QuotaExceeded {
            identity: identity.clone(),
            limit: limits.daily_limit,
        });
    }

    Ok(NewEntry {
        text,
        symbol,
        tags,
        owner: identity.clone(),
        created_at: now.with_timezone(&Utc).trunc_subsecs(3),
        stars: 0,
    })
}
