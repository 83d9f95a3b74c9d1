//! In-process identity provider holding at most one wallet address.

use crate::identity::{
    IdentityEvent, IdentityListener, IdentityProvider, ProviderError, ProviderResult,
    ProviderState, SubscriptionId,
};
use log::debug;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct ProviderInner {
    address: Option<String>,
    connected: bool,
    rejection: Option<String>,
    listeners: BTreeMap<SubscriptionId, Arc<dyn IdentityListener>>,
    next_subscription: u64,
}

/// Provider backed by a fixed address, or none at all.
///
/// Without an address it reports `Unavailable`, matching an environment with
/// no wallet extension installed.
#[derive(Default)]
pub struct StaticIdentityProvider {
    inner: Mutex<ProviderInner>,
}

impl StaticIdentityProvider {
    /// Provider for an environment without any wallet.
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Provider that grants `address` on the next `connect`.
    pub fn with_wallet(address: impl Into<String>) -> Self {
        let provider = Self::default();
        provider.lock().address = Some(address.into());
        provider
    }

    /// Provider already connected to `address`.
    pub fn connected(address: impl Into<String>) -> Self {
        let provider = Self::with_wallet(address);
        provider.lock().connected = true;
        provider
    }

    /// Makes subsequent `connect` calls fail with `Rejected(reason)`.
    pub fn reject_connections(&self, reason: impl Into<String>) {
        self.lock().rejection = Some(reason.into());
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Pushes an externally originated transition to every listener.
    pub fn announce(&self, event: IdentityEvent) {
        {
            let mut inner = self.lock();
            match &event {
                IdentityEvent::Connected(address) => {
                    inner.address = Some(address.clone());
                    inner.connected = true;
                }
                IdentityEvent::Disconnected => inner.connected = false,
            }
        }
        self.notify(event);
    }

    fn notify(&self, event: IdentityEvent) {
        let listeners: Vec<Arc<dyn IdentityListener>> =
            self.lock().listeners.values().cloned().collect();
        for listener in listeners {
            listener.on_identity_event(event.clone());
        }
    }

    fn lock(&self) -> MutexGuard<'_, ProviderInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn is_available(&self) -> bool {
        self.lock().address.is_some()
    }

    fn state(&self) -> ProviderState {
        let inner = self.lock();
        match (&inner.address, inner.connected) {
            (None, _) => ProviderState::Unavailable,
            (Some(address), true) => ProviderState::Connected(address.clone()),
            (Some(_), false) => ProviderState::Disconnected,
        }
    }

    fn connect(&self) -> ProviderResult<String> {
        let address = {
            let mut inner = self.lock();
            if let Some(reason) = inner.rejection.clone() {
                return Err(ProviderError::Rejected(reason));
            }
            let address = inner.address.clone().ok_or(ProviderError::Unavailable)?;
            inner.connected = true;
            address
        };
        debug!("event=provider_connect module=identity status=ok provider=static");
        self.notify(IdentityEvent::Connected(address.clone()));
        Ok(address)
    }

    fn disconnect(&self) -> ProviderResult<()> {
        {
            let mut inner = self.lock();
            if inner.address.is_none() {
                return Err(ProviderError::Unavailable);
            }
            inner.connected = false;
        }
        self.notify(IdentityEvent::Disconnected);
        Ok(())
    }

    fn subscribe(&self, listener: Arc<dyn IdentityListener>) -> SubscriptionId {
        let mut inner = self.lock();
        inner.next_subscription += 1;
        let id = SubscriptionId(inner.next_subscription);
        inner.listeners.insert(id, listener);
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.lock().listeners.remove(&id);
    }
}
