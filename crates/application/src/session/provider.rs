//! Session provider: owns the identity subscription for the lifetime of the
//! dashboard.

use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use vestibule_domain::{AuthMethod, SessionAction};

use super::store::{SessionWriter, session_channel};
use super::{AuthContext, SessionActions, SessionStore};
use crate::error::ApplicationError;
use crate::ports::{IdentityCollaborator, IdentitySubscription};

/// Mounts the session core on an identity provider.
///
/// Mounting registers exactly one change listener and starts the task that
/// applies every notification to the store. [`SessionProvider::unmount`]
/// deregisters it; dropping the provider aborts the task, and the listener
/// is released by the subscription's own drop.
#[derive(Debug)]
pub struct SessionProvider {
    store: SessionStore,
    actions: SessionActions,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SessionProvider {
    /// Subscribes to `collaborator` and starts applying its notifications.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn mount(collaborator: Arc<dyn IdentityCollaborator>) -> Self {
        let (writer, store) = session_channel();
        let subscription = collaborator.subscribe();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        info!(method = %collaborator.method(), "session provider mounted");
        let task = tokio::spawn(apply_changes(subscription, writer, shutdown_rx));

        Self {
            store,
            actions: SessionActions::new(collaborator),
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    /// The read side of the session state.
    #[must_use]
    pub const fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The actions facade.
    #[must_use]
    pub const fn actions(&self) -> &SessionActions {
        &self.actions
    }

    /// Which backend the session is bound to.
    #[must_use]
    pub fn method(&self) -> AuthMethod {
        self.actions.method()
    }

    /// A handle for UI code bundling state, actions and method.
    #[must_use]
    pub fn context(&self) -> AuthContext {
        AuthContext::new(self.store.clone(), self.actions.clone())
    }

    /// Stops applying notifications and deregisters the listener.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the subscription task panicked.
    pub async fn unmount(mut self) -> Result<(), ApplicationError> {
        if let Some(shutdown) = self.shutdown.take() {
            // The task may already have stopped on its own.
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            task.await
                .map_err(|e| ApplicationError::Internal(e.to_string()))?;
        }
        info!("session provider unmounted");
        Ok(())
    }
}

impl Drop for SessionProvider {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            debug!("session provider dropped without unmount");
            task.abort();
        }
    }
}

async fn apply_changes(
    mut subscription: IdentitySubscription,
    writer: SessionWriter,
    mut shutdown: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            change = subscription.next_change() => match change {
                Some(user) => {
                    writer.dispatch(SessionAction::auth_changed(user));
                }
                None => {
                    debug!("identity provider closed its change feed");
                    break;
                }
            },
        }
    }
    subscription.unsubscribe();
}
