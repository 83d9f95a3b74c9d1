//! Identity provider contract.
//!
//! # Responsibility
//! - Abstract the wallet extension that supplies owner identities.
//! - Deliver connect/disconnect transitions through subscribed listeners.
//!
//! # Invariants
//! - Listeners are only called between `subscribe` and `unsubscribe`.
//! - Providers never hand out blank identities; callers still re-validate.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

mod static_provider;

pub use static_provider::StaticIdentityProvider;

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Snapshot of the provider's connection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderState {
    Connected(String),
    Disconnected,
    /// No provider installed in this environment.
    Unavailable,
}

/// Asynchronous transition pushed to listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityEvent {
    Connected(String),
    Disconnected,
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

/// Receiver of provider transitions.
pub trait IdentityListener: Send + Sync {
    fn on_identity_event(&self, event: IdentityEvent);
}

/// Provider failure kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    Unavailable,
    /// User or provider declined the request.
    Rejected(String),
    /// Provider returned an identity that cannot own entries.
    InvalidIdentity(String),
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "identity provider is unavailable"),
            Self::Rejected(reason) => write!(f, "identity provider rejected request: {reason}"),
            Self::InvalidIdentity(value) => {
                write!(f, "identity provider returned invalid identity `{value}`")
            }
        }
    }
}

impl Error for ProviderError {}

/// Wallet-style identity source.
pub trait IdentityProvider {
    fn is_available(&self) -> bool;
    fn state(&self) -> ProviderState;
    /// Requests a connection and returns the granted identity string.
    fn connect(&self) -> ProviderResult<String>;
    fn disconnect(&self) -> ProviderResult<()>;
    fn subscribe(&self, listener: Arc<dyn IdentityListener>) -> SubscriptionId;
    fn unsubscribe(&self, id: SubscriptionId);
}

impl<T: IdentityProvider + ?Sized> IdentityProvider for Arc<T> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn state(&self) -> ProviderState {
        (**self).state()
    }

    fn connect(&self) -> ProviderResult<String> {
        (**self).connect()
    }

    fn disconnect(&self) -> ProviderResult<()> {
        (**self).disconnect()
    }

    fn subscribe(&self, listener: Arc<dyn IdentityListener>) -> SubscriptionId {
        (**self).subscribe(listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        (**self).unsubscribe(id)
    }
}
