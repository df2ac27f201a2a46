//! Identity provider port
//!
//! The narrow capability interface the session core needs from the external
//! identity service. Construction of an adapter plays the role of the
//! provider's one-time `initialize(config)`.

use std::fmt;

use async_trait::async_trait;
use tokio::sync::mpsc;
use vestibule_domain::{AuthError, AuthMethod, FederatedProvider, RawUser};

/// One authentication-state notification: the signed-in user, or `None`.
pub type UserChange = Option<RawUser>;

type Disposer = Box<dyn FnOnce() + Send>;

/// A live registration of a change listener at the identity provider.
///
/// Notifications arrive on a channel instead of a callback. The first one is
/// the provider's initial determination. Dropping the subscription
/// deregisters the listener; [`IdentitySubscription::unsubscribe`] does the
/// same explicitly. The disposer runs at most once either way.
pub struct IdentitySubscription {
    changes: mpsc::UnboundedReceiver<UserChange>,
    disposer: Option<Disposer>,
}

impl IdentitySubscription {
    /// Wraps a change feed and the function that deregisters it.
    pub fn new(
        changes: mpsc::UnboundedReceiver<UserChange>,
        disposer: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            changes,
            disposer: Some(Box::new(disposer)),
        }
    }

    /// Waits for the next notification.
    ///
    /// Returns `None` once the provider has closed the feed.
    pub async fn next_change(&mut self) -> Option<UserChange> {
        self.changes.recv().await
    }

    /// True until the listener has been deregistered.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.disposer.is_some()
    }

    /// Deregisters the listener.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(disposer) = self.disposer.take() {
            self.changes.close();
            disposer();
        }
    }
}

impl Drop for IdentitySubscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for IdentitySubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentitySubscription")
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

/// Port for the external identity service.
///
/// Every request method only reports the provider's answer. The session
/// state changes when the provider later publishes the new user on the
/// subscription feed, never as a direct effect of these calls.
#[async_trait]
pub trait IdentityCollaborator: Send + Sync {
    /// Which backend this is.
    fn method(&self) -> AuthMethod;

    /// Registers a change listener.
    ///
    /// The provider sends its current determination right away and every
    /// later change after that.
    fn subscribe(&self) -> IdentitySubscription;

    /// Signs in with email and password.
    ///
    /// # Errors
    /// Invalid credential, disabled account, network failure.
    async fn sign_in_with_password(&self, email: &str, password: &str)
    -> Result<RawUser, AuthError>;

    /// Signs in through a federated provider's interactive flow.
    ///
    /// # Errors
    /// User cancellation, blocked window, network failure.
    async fn sign_in_interactive(&self, provider: &FederatedProvider)
    -> Result<RawUser, AuthError>;

    /// Creates a new email/password account.
    ///
    /// Whether this also signs the new user in is up to the provider.
    ///
    /// # Errors
    /// Email already in use, weak password, network failure.
    async fn create_account(&self, email: &str, password: &str) -> Result<RawUser, AuthError>;

    /// Ends the current session.
    ///
    /// # Errors
    /// Network failure.
    async fn sign_out(&self) -> Result<(), AuthError>;
}
