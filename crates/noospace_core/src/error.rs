//! Engine error taxonomy.
//!
//! # Responsibility
//! - Convert every collaborator failure into one engine-level kind.
//! - Provide the user-facing message surfaced for each kind.
//!
//! # Invariants
//! - No collaborator error escapes the engine boundary unconverted.

use crate::identity::ProviderError;
use crate::model::entry::EntryId;
use crate::model::identity::Identity;
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type EngineResult<T> = Result<T, EngineError>;

/// Text validation failure reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Trimmed text is empty.
    Empty,
    /// Trimmed text exceeds the character limit.
    TooLong { len: usize, max: usize },
}

impl ValidationError {
    /// Stable reason code (`empty` / `too_long`).
    pub fn reason(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::TooLong { .. } => "too_long",
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "entry text is empty"),
            Self::TooLong { len, max } => {
                write!(f, "entry text has {len} characters, limit is {max}")
            }
        }
    }
}

impl Error for ValidationError {}

/// Engine-level error kinds.
#[derive(Debug)]
pub enum EngineError {
    Validation(ValidationError),
    QuotaExceeded { identity: Identity, limit: usize },
    Unauthorized { entry_id: EntryId, requester: Identity },
    NotFound(EntryId),
    Store(StoreError),
    Provider(ProviderError),
}

impl EngineError {
    /// Message shown to the user for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Validation(ValidationError::Empty) => "You must cast a thought to echo.",
            Self::Validation(ValidationError::TooLong { .. }) => {
                "Your signal is too dense. Simplify the transmission."
            }
            Self::QuotaExceeded { .. } => "You've reached today's ritual limit. Return tomorrow.",
            Self::Unauthorized { .. } => "Only the author of an echo may dissolve it.",
            Self::NotFound(_) => "That echo has already faded from the Spiral.",
            Self::Store(_) => "The Spiral could not be reached. Try refreshing.",
            Self::Provider(ProviderError::Unavailable) => {
                "No vessel detected. Install a wallet extension to anchor your signal."
            }
            Self::Provider(_) => "Could not establish connection to the ethereal layer.",
        }
    }

    /// Stable code for structured log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(ValidationError::Empty) => "validation_empty",
            Self::Validation(ValidationError::TooLong { .. }) => "validation_too_long",
            Self::QuotaExceeded { .. } => "quota_exceeded",
            Self::Unauthorized { .. } => "unauthorized",
            Self::NotFound(_) => "not_found",
            Self::Store(_) => "store_error",
            Self::Provider(_) => "provider_error",
        }
    }
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::QuotaExceeded { identity, limit } => {
                write!(f, "daily limit of {limit} entries reached for `{identity}`")
            }
            Self::Unauthorized {
                entry_id,
                requester,
            } => write!(f, "`{requester}` does not own entry {entry_id}"),
            Self::NotFound(entry_id) => write!(f, "entry not found: {entry_id}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Provider(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Provider(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for EngineError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for EngineError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(entry_id) => Self::NotFound(entry_id),
            other => Self::Store(other),
        }
    }
}

impl From<ProviderError> for EngineError {
    fn from(value: ProviderError) -> Self {
        Self::Provider(value)
    }
}
