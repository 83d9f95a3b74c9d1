//! Per-identity daily quota computation.
//!
//! # Invariants
//! - The day key is derived from `now` in the caller's own offset.
//! - Entries are matched by the prefix of their ISO-8601 (UTC) timestamp.
//! - All anonymous users share the single `guest` bucket.

use crate::model::entry::Entry;
use crate::model::identity::Identity;
use chrono::{DateTime, FixedOffset};

/// `YYYY-MM-DD` calendar-day key of `now` in its own offset.
pub fn day_key(now: &DateTime<FixedOffset>) -> String {
    now.format("%Y-%m-%d").to_string()
}

/// Counts entries owned by `identity` whose timestamp falls on today's key.
pub fn count_today<'a, I>(identity: &Identity, entries: I, now: &DateTime<FixedOffset>) -> usize
where
    I: IntoIterator<Item = &'a Entry>,
{
    let key = day_key(now);
    entries
        .into_iter()
        .filter(|entry| entry.is_owned_by(identity))
        .filter(|entry| entry.created_at_iso().starts_with(key.as_str()))
        .count()
}

/// Remaining submissions for today, never negative.
pub fn remaining_today(limit: usize, used: usize) -> usize {
    limit.saturating_sub(used)
}
