//! Auth context handed to UI code.

use tokio::sync::watch;
use vestibule_domain::{AuthMethod, Principal, SessionState};

use super::{SessionActions, SessionStore};
use crate::error::ApplicationError;

/// Everything a screen needs: current state, an observer, the actions, and
/// which backend is in use.
///
/// Obtained from [`super::SessionProvider::context`]; cheap to clone.
#[derive(Debug, Clone)]
pub struct AuthContext {
    store: SessionStore,
    actions: SessionActions,
}

impl AuthContext {
    pub(crate) const fn new(store: SessionStore, actions: SessionActions) -> Self {
        Self { store, actions }
    }

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.store.state()
    }

    /// True when a principal is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.store.state().is_authenticated()
    }

    /// The signed-in principal, if any.
    #[must_use]
    pub fn principal(&self) -> Option<Principal> {
        self.store.state().principal().cloned()
    }

    /// Which backend the session is bound to.
    #[must_use]
    pub fn method(&self) -> AuthMethod {
        self.actions.method()
    }

    /// The actions facade.
    #[must_use]
    pub const fn actions(&self) -> &SessionActions {
        &self.actions
    }

    /// Registers an observer of state transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.store.subscribe()
    }

    /// Waits until the provider has reported for the first time.
    ///
    /// # Errors
    ///
    /// `ProviderStopped` if the provider is unmounted first.
    pub async fn initialized(&self) -> Result<SessionState, ApplicationError> {
        let mut observer = self.store.subscribe();
        let state = observer
            .wait_for(SessionState::is_initialized)
            .await
            .map_err(|_| ApplicationError::ProviderStopped)?;
        Ok(state.clone())
    }
}
