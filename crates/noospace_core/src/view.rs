//! Derived views over the cached entry sequence.
//!
//! # Responsibility
//! - Tag filtering for both display modes.
//! - Spiral coordinate derivation for the spiral mode.
//!
//! # Invariants
//! - Both derivations are pure and preserve input order.
//! - Spiral placement depends only on position, never on entry content.

use crate::config::SpiralGeometry;
use crate::ingest::normalize::normalize_tag;
use crate::model::entry::{Entry, EntryId};
use serde::{Deserialize, Serialize};

/// Display mode of the entry viewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Archimedean spiral placement.
    #[default]
    Spiral,
    /// Chronological list.
    Scroll,
}

/// Cartesian placement of one entry on the spiral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpiralPoint {
    pub entry_id: EntryId,
    /// Zero-based position in the placed sequence.
    pub index: usize,
    pub angle: f64,
    pub radius: f64,
    pub x: f64,
    pub y: f64,
}

/// Rendered view for the active display mode.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryView<'a> {
    Spiral(Vec<SpiralPoint>),
    Scroll(Vec<&'a Entry>),
}

/// Keeps entries carrying `tag`, in input order.
///
/// A blank tag disables filtering and returns every entry.
pub fn filter_by_tag<'a, I>(entries: I, tag: &str) -> Vec<&'a Entry>
where
    I: IntoIterator<Item = &'a Entry>,
{
    match normalize_tag(tag) {
        None => entries.into_iter().collect(),
        Some(tag) => entries
            .into_iter()
            .filter(|entry| entry.has_tag(tag.as_str()))
            .collect(),
    }
}

/// Places each entry at `i * angle_step` radians and `i * radius_step` units
/// from the center.
pub fn spiral_layout<'a, I>(entries: I, geometry: &SpiralGeometry) -> Vec<SpiralPoint>
where
    I: IntoIterator<Item = &'a Entry>,
{
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let step = index as f64;
            let angle = step * geometry.angle_step;
            let radius = step * geometry.radius_step;
            SpiralPoint {
                entry_id: entry.id,
                index,
                angle,
                radius,
                x: geometry.center_x + radius * angle.cos(),
                y: geometry.center_y + radius * angle.sin(),
            }
        })
        .collect()
}
