//! Listener that queues provider transitions for the engine.

use crate::identity::{IdentityEvent, IdentityListener};
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

/// FIFO of identity events, drained by the engine before each operation.
#[derive(Debug, Default)]
pub(crate) struct IdentityInbox {
    pending: Mutex<VecDeque<IdentityEvent>>,
}

impl IdentityInbox {
    pub(crate) fn drain(&self) -> Vec<IdentityEvent> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }
}

impl IdentityListener for IdentityInbox {
    fn on_identity_event(&self, event: IdentityEvent) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(event);
    }
}
