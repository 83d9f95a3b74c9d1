//! Identity model for entry ownership.
//!
//! # Responsibility
//! - Represent who owns an entry: the shared guest sentinel or a wallet address.
//! - Keep the wire form a plain string so stored rows stay schema-compatible.
//!
//! # Invariants
//! - The literal `guest` always parses to `Identity::Guest`.
//! - Wallet addresses are trimmed and never blank.
//! - Owner equality is the only authorization check for retraction.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Wire value of the shared anonymous identity.
pub const GUEST_IDENTITY: &str = "guest";

const SHORT_LABEL_HEAD: usize = 6;
const SHORT_LABEL_TAIL: usize = 4;

/// Opaque identity string distinguishing entry ownership.
///
/// All anonymous users share one `Guest` bucket; there is no per-device
/// distinction in the data model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Identity {
    Guest,
    Wallet(String),
}

/// Rejected identity input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    Blank,
}

impl Display for IdentityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank => write!(f, "identity must not be blank"),
        }
    }
}

impl Error for IdentityError {}

impl Identity {
    /// Parses a raw identity string as supplied by a provider or storage row.
    pub fn parse(value: &str) -> Result<Self, IdentityError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(IdentityError::Blank);
        }
        if trimmed == GUEST_IDENTITY {
            return Ok(Self::Guest);
        }
        Ok(Self::Wallet(trimmed.to_string()))
    }

    /// Wire/string form (`guest` or the wallet address).
    pub fn as_str(&self) -> &str {
        match self {
            Self::Guest => GUEST_IDENTITY,
            Self::Wallet(address) => address.as_str(),
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }

    /// Display label: `abcdef…wxyz` for long addresses, unchanged otherwise.
    pub fn short_label(&self) -> String {
        let Self::Wallet(address) = self else {
            return GUEST_IDENTITY.to_string();
        };

        let count = address.chars().count();
        if count <= SHORT_LABEL_HEAD + SHORT_LABEL_TAIL {
            return address.clone();
        }

        let head: String = address.chars().take(SHORT_LABEL_HEAD).collect();
        let tail: String = address.chars().skip(count - SHORT_LABEL_TAIL).collect();
        format!("{head}…{tail}")
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Identity {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value.as_str())
    }
}

impl From<Identity> for String {
    fn from(value: Identity) -> Self {
        match value {
            Identity::Guest => GUEST_IDENTITY.to_string(),
            Identity::Wallet(address) => address,
        }
    }
}
