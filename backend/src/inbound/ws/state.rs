//! Shared WebSocket adapter state.
//!
//! Entry points depend on the `ChatCommand` port rather than constructing
//! domain services, so the adapter stays testable with deterministic
//! doubles. The registry tracks the send half of every live connection so
//! mirrored messages can be relayed to a connected peer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::domain::ports::ChatCommand;

/// Live connections by user. The newest connection for a user wins; an
/// older socket for the same user stops receiving relays.
#[derive(Default, Clone)]
pub struct ConnectionRegistry {
    inner: Arc<Mutex<HashMap<Uuid, mpsc::UnboundedSender<String>>>>,
}

impl ConnectionRegistry {
    pub fn register(&self, user: Uuid, sender: mpsc::UnboundedSender<String>) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.insert(user, sender);
    }

    /// Remove the user's entry, but only if it still belongs to this
    /// connection. A reconnect replaces the entry and must not be
    /// deregistered by the old socket's teardown.
    pub fn deregister(&self, user: Uuid, sender: &mpsc::UnboundedSender<String>) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(current) = inner.get(&user) {
            if current.same_channel(sender) {
                inner.remove(&user);
            }
        }
    }

    /// Relay a frame to the user if connected; returns whether delivery was
    /// handed to a live channel.
    pub fn relay(&self, user: Uuid, frame: String) -> bool {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match inner.get(&user) {
            Some(sender) => sender.send(frame).is_ok(),
            None => false,
        }
    }
}

/// Dependency bundle for WebSocket handlers.
#[derive(Clone)]
pub struct WsState {
    pub chat: Arc<dyn ChatCommand>,
    pub registry: ConnectionRegistry,
}

impl WsState {
    /// Construct state from an explicit port implementation.
    pub fn new(chat: Arc<dyn ChatCommand>) -> Self {
        Self {
            chat,
            registry: ConnectionRegistry::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use super::*;

    #[test]
    fn relay_reaches_a_registered_connection() {
        let registry = ConnectionRegistry::default();
        let user = Uuid::new_v4();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.register(user, tx);

        assert!(registry.relay(user, "hello".into()));
        assert_eq!(rx.try_recv().expect("frame queued"), "hello");
    }

    #[test]
    fn relay_to_an_absent_user_reports_failure() {
        let registry = ConnectionRegistry::default();
        assert!(!registry.relay(Uuid::new_v4(), "hello".into()));
    }

    #[test]
    fn a_reconnect_survives_the_old_sockets_teardown() {
        let registry = ConnectionRegistry::default();
        let user = Uuid::new_v4();
        let (old_tx, _old_rx) = mpsc::unbounded_channel();
        let (new_tx, mut new_rx) = mpsc::unbounded_channel();

        registry.register(user, old_tx.clone());
        registry.register(user, new_tx);
        registry.deregister(user, &old_tx);

        assert!(registry.relay(user, "still here".into()));
        assert_eq!(new_rx.try_recv().expect("frame queued"), "still here");
    }
}
