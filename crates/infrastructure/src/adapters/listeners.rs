//! Change-listener bookkeeping shared by the identity adapters.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::mpsc;
use tracing::{debug, trace};
use vestibule_application::ports::{IdentitySubscription, UserChange};

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    current: UserChange,
    listeners: HashMap<u64, mpsc::UnboundedSender<UserChange>>,
}

/// The set of live change listeners plus the last published user.
///
/// New subscribers receive the current user immediately, which is the
/// provider's "status determined" notification.
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    inner: Arc<Mutex<Registry>>,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    // Every update is a single assignment, so a poisoned lock is still consistent.
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ListenerRegistry {
    /// Creates an empty registry with nobody signed in.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener and sends it the current user.
    #[must_use]
    pub fn subscribe(&self) -> IdentitySubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = {
            let mut registry = lock(&self.inner);
            let id = registry.next_id;
            registry.next_id += 1;
            // The receiver is alive, so this cannot fail.
            let _ = tx.send(registry.current.clone());
            registry.listeners.insert(id, tx);
            id
        };
        debug!(listener = id, "identity listener registered");

        let registry: Weak<Mutex<Registry>> = Arc::downgrade(&self.inner);
        IdentitySubscription::new(rx, move || {
            if let Some(registry) = registry.upgrade() {
                lock(&registry).listeners.remove(&id);
                debug!(listener = id, "identity listener released");
            }
        })
    }

    /// Records a new current user and notifies every listener.
    pub fn publish(&self, change: UserChange) {
        let mut registry = lock(&self.inner);
        registry.current = change;
        let current = registry.current.clone();
        registry
            .listeners
            .retain(|_, listener| listener.send(current.clone()).is_ok());
        trace!(
            listeners = registry.listeners.len(),
            signed_in = current.is_some(),
            "auth change published"
        );
    }

    /// The last published user.
    #[must_use]
    pub fn current(&self) -> UserChange {
        lock(&self.inner).current.clone()
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        lock(&self.inner).listeners.len()
    }
}
