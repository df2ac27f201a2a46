//! Credential inputs accepted by the session facade.

use std::fmt;

use super::AuthError;

/// An email/password pair, both non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct EmailCredential {
    email: String,
    password: String,
}

impl EmailCredential {
    /// Builds a credential, rejecting blank fields with the provider's own
    /// reason codes.
    ///
    /// # Errors
    ///
    /// Returns `auth/missing-email` or `auth/missing-password`.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Result<Self, AuthError> {
        let email = email.into().trim().to_string();
        let password = password.into();

        if email.is_empty() {
            return Err(AuthError::missing_email());
        }
        if password.is_empty() {
            return Err(AuthError::missing_password());
        }

        Ok(Self { email, password })
    }

    /// The email, trimmed of surrounding whitespace.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// The password, exactly as entered.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for EmailCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailCredential")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// A new-account request: credential plus the chosen username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    credential: EmailCredential,
    username: String,
}

impl Registration {
    /// Builds a registration request.
    ///
    /// # Errors
    ///
    /// Same as [`EmailCredential::new`].
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, AuthError> {
        Ok(Self {
            credential: EmailCredential::new(email, password)?,
            username: username.into(),
        })
    }

    /// The email/password pair sent to the provider.
    #[must_use]
    pub const fn credential(&self) -> &EmailCredential {
        &self.credential
    }

    /// The username chosen on the registration form.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Proof of identity returned by a federated provider's interactive flow.
///
/// The identity service exchanges it for its own session.
#[derive(Clone, PartialEq, Eq)]
pub struct FederatedCredential {
    /// Identifier of the issuing provider, e.g. `google.com`.
    pub provider_id: String,
    /// OpenID Connect ID token, when the provider issues one.
    pub id_token: Option<String>,
    /// OAuth access token, when the provider issues one.
    pub access_token: Option<String>,
}

impl FederatedCredential {
    /// True when at least one token is present.
    #[must_use]
    pub const fn has_token(&self) -> bool {
        self.id_token.is_some() || self.access_token.is_some()
    }
}

impl fmt::Debug for FederatedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FederatedCredential")
            .field("provider_id", &self.provider_id)
            .field("id_token", &self.id_token.as_ref().map(|_| "***"))
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .finish()
    }
}
