//! In-process identity provider.
//!
//! Keeps accounts in memory and follows the hosted provider's observable
//! rules: accounts are signed in on creation, passwords need six
//! characters, and errors use the same reason codes. Used by the demo shell
//! when no provider is configured, and by tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::{debug, info};
use vestibule_application::ports::{IdentityCollaborator, IdentitySubscription};
use vestibule_domain::auth::codes;
use vestibule_domain::{AuthError, AuthMethod, FederatedProvider, RawUser, generate_id};

use crate::adapters::ListenerRegistry;

/// Minimum password length accepted on account creation.
pub const MIN_PASSWORD_LEN: usize = 6;

/// What the simulated federated consent screen does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FederatedOutcome {
    /// The user approves.
    #[default]
    Approve,
    /// The user closes the window.
    Cancel,
    /// The window never opens.
    Block,
}

#[derive(Debug, Clone)]
struct Account {
    password: String,
    user: RawUser,
}

/// Identity provider backed by in-memory maps.
#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    accounts: Mutex<HashMap<String, Account>>,
    federated: Mutex<HashMap<String, RawUser>>,
    outcome: Mutex<FederatedOutcome>,
    offline: AtomicBool,
    listeners: ListenerRegistry,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn account_key(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

impl InMemoryIdentityProvider {
    /// Creates a provider with no accounts and nobody signed in.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account, builder style.
    #[must_use]
    pub fn with_account(
        self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Self {
        let user = RawUser {
            display_name: display_name.map(String::from),
            ..RawUser::new(generate_id(), Some(email.trim().to_string()))
        };
        lock(&self.accounts).insert(
            account_key(email),
            Account {
                password: password.to_string(),
                user,
            },
        );
        self
    }

    /// Sets how the next federated sign-ins behave.
    pub fn set_federated_outcome(&self, outcome: FederatedOutcome) {
        *lock(&self.outcome) = outcome;
    }

    /// Simulates losing connectivity: every request fails with
    /// `auth/network-request-failed`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// The user currently signed in, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<RawUser> {
        self.listeners.current()
    }

    /// Number of live change listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.listener_count()
    }

    fn ensure_online(&self) -> Result<(), AuthError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AuthError::network("A network error has occurred"));
        }
        Ok(())
    }

    fn sign_in(&self, user: RawUser) -> RawUser {
        info!(uid = %user.uid, "local sign-in");
        self.listeners.publish(Some(user.clone()));
        user
    }
}

#[async_trait]
impl IdentityCollaborator for InMemoryIdentityProvider {
    fn method(&self) -> AuthMethod {
        AuthMethod::Local
    }

    fn subscribe(&self) -> IdentitySubscription {
        self.listeners.subscribe()
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<RawUser, AuthError> {
        self.ensure_online()?;
        let user = {
            let accounts = lock(&self.accounts);
            match accounts.get(&account_key(email)) {
                Some(account) if account.password == password => account.user.clone(),
                _ => return Err(AuthError::invalid_credential()),
            }
        };
        Ok(self.sign_in(user))
    }

    async fn sign_in_interactive(
        &self,
        provider: &FederatedProvider,
    ) -> Result<RawUser, AuthError> {
        self.ensure_online()?;
        match *lock(&self.outcome) {
            FederatedOutcome::Approve => {}
            FederatedOutcome::Cancel => return Err(AuthError::cancelled()),
            FederatedOutcome::Block => return Err(AuthError::popup_blocked()),
        }

        let user = lock(&self.federated)
            .entry(provider.provider_id().to_string())
            .or_insert_with(|| {
                debug!(provider = %provider, "creating federated account");
                RawUser {
                    display_name: Some(format!("{provider} user")),
                    ..RawUser::new(
                        generate_id(),
                        Some(format!("demo@{}", provider.provider_id())),
                    )
                }
            })
            .clone();
        Ok(self.sign_in(user))
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<RawUser, AuthError> {
        self.ensure_online()?;
        if !email.contains('@') {
            return Err(AuthError::new(
                codes::INVALID_EMAIL,
                "The email address is badly formatted",
            ));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::weak_password(format!(
                "Password should be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let user = {
            let mut accounts = lock(&self.accounts);
            let key = account_key(email);
            if accounts.contains_key(&key) {
                return Err(AuthError::email_already_in_use());
            }
            let user = RawUser::new(generate_id(), Some(email.trim().to_string()));
            accounts.insert(
                key,
                Account {
                    password: password.to_string(),
                    user: user.clone(),
                },
            );
            user
        };
        info!(uid = %user.uid, "local account created");
        Ok(self.sign_in(user))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.ensure_online()?;
        info!("local sign-out");
        self.listeners.publish(None);
        Ok(())
    }
}
