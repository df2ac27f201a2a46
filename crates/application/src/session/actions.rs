//! Session actions facade.
//!
//! Translates the dashboard's four auth intents into identity provider
//! calls. None of these touch the session state: the provider publishes the
//! outcome on its change feed and the session provider applies it from
//! there.

use std::fmt;
use std::sync::Arc;

use tracing::{info, instrument, warn};
use vestibule_domain::{
    AuthError, AuthMethod, EmailCredential, FederatedProvider, Principal, Registration,
};

use crate::ports::IdentityCollaborator;

/// Facade over the identity provider's request methods.
#[derive(Clone)]
pub struct SessionActions {
    collaborator: Arc<dyn IdentityCollaborator>,
}

impl SessionActions {
    /// Creates a facade bound to `collaborator`.
    #[must_use]
    pub fn new(collaborator: Arc<dyn IdentityCollaborator>) -> Self {
        Self { collaborator }
    }

    /// Which backend the facade talks to.
    #[must_use]
    pub fn method(&self) -> AuthMethod {
        self.collaborator.method()
    }

    /// Signs in with email and password.
    ///
    /// Returns the principal the provider reported. The session becomes
    /// authenticated only when the provider's change notification arrives.
    ///
    /// # Errors
    ///
    /// Blank fields fail locally with `auth/missing-email` or
    /// `auth/missing-password`; everything else comes from the provider.
    #[instrument(skip(self, password), fields(method = %self.method()))]
    pub async fn sign_in_with_email(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Principal, AuthError> {
        let credential = EmailCredential::new(email, password)?;
        let user = self
            .collaborator
            .sign_in_with_password(credential.email(), credential.password())
            .await
            .inspect_err(|e| warn!(code = e.code(), "email sign-in rejected"))?;
        info!(uid = %user.uid, "email sign-in accepted");
        Ok(Principal::from(user))
    }

    /// Signs in through a federated provider.
    ///
    /// # Errors
    ///
    /// Whatever the provider reports, e.g. `auth/popup-closed-by-user`.
    #[instrument(skip(self), fields(method = %self.method()))]
    pub async fn sign_in_with_provider(
        &self,
        provider: &FederatedProvider,
    ) -> Result<Principal, AuthError> {
        let user = self
            .collaborator
            .sign_in_interactive(provider)
            .await
            .inspect_err(|e| warn!(code = e.code(), "federated sign-in failed"))?;
        info!(uid = %user.uid, "federated sign-in accepted");
        Ok(Principal::from(user))
    }

    /// Creates an account.
    ///
    /// The username is not sent to the provider. Whether the new account is
    /// also signed in depends on the provider.
    ///
    /// # Errors
    ///
    /// Blank fields fail locally; duplicates and weak passwords come from
    /// the provider.
    #[instrument(skip(self, password), fields(method = %self.method()))]
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<Principal, AuthError> {
        let registration = Registration::new(email, username, password)?;
        let credential = registration.credential();
        let user = self
            .collaborator
            .create_account(credential.email(), credential.password())
            .await
            .inspect_err(|e| warn!(code = e.code(), "registration rejected"))?;
        info!(uid = %user.uid, username = registration.username(), "account created");
        Ok(Principal::from(user))
    }

    /// Asks the provider to end the session.
    ///
    /// The local state is left alone until the provider confirms with a
    /// signed-out notification.
    ///
    /// # Errors
    ///
    /// Whatever the provider reports.
    #[instrument(skip(self), fields(method = %self.method()))]
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.collaborator
            .sign_out()
            .await
            .inspect_err(|e| warn!(code = e.code(), "sign-out failed"))?;
        info!("sign-out requested");
        Ok(())
    }
}

impl fmt::Debug for SessionActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionActions")
            .field("method", &self.method())
            .finish()
    }
}
