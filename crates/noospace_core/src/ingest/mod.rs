//! Entry ingestion: validation, normalization and daily quota.
//!
//! Pure functions only; the engine wires them to the store and identity.

pub mod normalize;
pub mod quota;
