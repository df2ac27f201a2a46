//! Session state store.
//!
//! The store is split into a read half handed to consumers and a
//! crate-private write half owned by the session provider's task. When that
//! task ends the writer is dropped, so nothing can mutate the state after
//! the provider is unmounted.

use tokio::sync::watch;
use tracing::{debug, info};
use vestibule_domain::{SessionAction, SessionState};

/// Read access to the current session.
///
/// Cheap to clone; every clone observes the same state.
#[derive(Debug, Clone)]
pub struct SessionStore {
    state: watch::Receiver<SessionState>,
}

/// The single writer of the session state.
#[derive(Debug)]
pub(crate) struct SessionWriter {
    state: watch::Sender<SessionState>,
}

/// Creates a connected writer/store pair starting at `Uninitialized`.
pub(crate) fn session_channel() -> (SessionWriter, SessionStore) {
    let (tx, rx) = watch::channel(SessionState::initial());
    (SessionWriter { state: tx }, SessionStore { state: rx })
}

impl SessionStore {
    /// Returns the current snapshot.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Registers an observer.
    ///
    /// The returned receiver reports the current state as already seen, so
    /// `changed()` resolves on the next transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        let mut observer = self.state.clone();
        observer.mark_unchanged();
        observer
    }

    /// False once the writer is gone and the state is frozen.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.state.has_changed().is_ok()
    }
}

impl SessionWriter {
    /// Applies an action through the reducer and publishes the result.
    pub(crate) fn dispatch(&self, action: SessionAction) -> SessionState {
        self.state.send_modify(|state| {
            let next = state.reduce(action);
            if next.status() == state.status() {
                debug!(status = ?next.status(), revision = next.revision(), "session refreshed");
            } else {
                info!(
                    from = ?state.status(),
                    to = ?next.status(),
                    principal = next.principal().map(|p| p.id.as_str()),
                    "session status changed"
                );
            }
            *state = next;
        });
        self.state.borrow().clone()
    }
}
