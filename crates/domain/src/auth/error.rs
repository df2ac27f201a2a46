//! Authentication errors reported by the identity provider.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reason codes used by the identity provider.
///
/// Adapters translate their native error payloads into these codes so that
/// callers can branch on a stable vocabulary.
pub mod codes {
    /// Email/password pair rejected.
    pub const INVALID_CREDENTIAL: &str = "auth/invalid-credential";
    /// Email address is malformed.
    pub const INVALID_EMAIL: &str = "auth/invalid-email";
    /// No account exists for the email.
    pub const USER_NOT_FOUND: &str = "auth/user-not-found";
    /// Password does not match the account.
    pub const WRONG_PASSWORD: &str = "auth/wrong-password";
    /// Account has been disabled by an administrator.
    pub const USER_DISABLED: &str = "auth/user-disabled";
    /// Email was empty.
    pub const MISSING_EMAIL: &str = "auth/missing-email";
    /// Password was empty.
    pub const MISSING_PASSWORD: &str = "auth/missing-password";
    /// Registration with an email that already has an account.
    pub const EMAIL_ALREADY_IN_USE: &str = "auth/email-already-in-use";
    /// Password rejected by the provider's strength policy.
    pub const WEAK_PASSWORD: &str = "auth/weak-password";
    /// User closed the federated sign-in window.
    pub const POPUP_CLOSED_BY_USER: &str = "auth/popup-closed-by-user";
    /// Federated sign-in window could not be opened.
    pub const POPUP_BLOCKED: &str = "auth/popup-blocked";
    /// Transport failure while talking to the provider.
    pub const NETWORK_REQUEST_FAILED: &str = "auth/network-request-failed";
    /// Provider throttled the client.
    pub const TOO_MANY_REQUESTS: &str = "auth/too-many-requests";
    /// Sign-in method disabled for the project.
    pub const OPERATION_NOT_ALLOWED: &str = "auth/operation-not-allowed";
    /// Interactive flow unavailable in this environment.
    pub const OPERATION_NOT_SUPPORTED: &str = "auth/operation-not-supported-in-this-environment";
    /// Provider configuration rejected (bad API key, unknown project).
    pub const INVALID_API_KEY: &str = "auth/invalid-api-key";
    /// Anything the adapter could not classify.
    pub const INTERNAL_ERROR: &str = "auth/internal-error";
}

/// Broad classification of an [`AuthError`] code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthErrorKind {
    /// Credentials were rejected.
    InvalidCredential,
    /// A required field was empty.
    MissingInput,
    /// The email is already registered.
    EmailAlreadyInUse,
    /// The password is too weak.
    WeakPassword,
    /// The user abandoned an interactive flow.
    Cancelled,
    /// The interactive window could not be opened.
    PopupBlocked,
    /// Transport or throttling failure.
    Network,
    /// The requested flow is unavailable.
    Unsupported,
    /// Provider misconfiguration or an unclassified failure.
    Other,
}

/// Error raised when the identity provider rejects a request.
///
/// Carries the provider-supplied reason code and a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message} ({code})")]
pub struct AuthError {
    code: String,
    message: String,
}

impl AuthError {
    /// Creates an error from a reason code and message.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// The provider reason code, e.g. `auth/invalid-credential`.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Classifies the reason code.
    #[must_use]
    pub fn kind(&self) -> AuthErrorKind {
        match self.code.as_str() {
            codes::INVALID_CREDENTIAL
            | codes::INVALID_EMAIL
            | codes::USER_NOT_FOUND
            | codes::WRONG_PASSWORD
            | codes::USER_DISABLED => AuthErrorKind::InvalidCredential,
            codes::MISSING_EMAIL | codes::MISSING_PASSWORD => AuthErrorKind::MissingInput,
            codes::EMAIL_ALREADY_IN_USE => AuthErrorKind::EmailAlreadyInUse,
            codes::WEAK_PASSWORD => AuthErrorKind::WeakPassword,
            codes::POPUP_CLOSED_BY_USER | "auth/cancelled-popup-request" => {
                AuthErrorKind::Cancelled
            }
            codes::POPUP_BLOCKED => AuthErrorKind::PopupBlocked,
            codes::NETWORK_REQUEST_FAILED | codes::TOO_MANY_REQUESTS => AuthErrorKind::Network,
            codes::OPERATION_NOT_SUPPORTED | codes::OPERATION_NOT_ALLOWED => {
                AuthErrorKind::Unsupported
            }
            _ => AuthErrorKind::Other,
        }
    }

    /// Whether a caller-initiated retry has a chance of succeeding.
    ///
    /// Nothing in this crate retries on its own.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.kind() == AuthErrorKind::Network
    }

    /// Transport failure.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(codes::NETWORK_REQUEST_FAILED, message)
    }

    /// Rejected email/password pair.
    #[must_use]
    pub fn invalid_credential() -> Self {
        Self::new(codes::INVALID_CREDENTIAL, "The supplied credential is invalid")
    }

    /// Empty email.
    #[must_use]
    pub fn missing_email() -> Self {
        Self::new(codes::MISSING_EMAIL, "An email address is required")
    }

    /// Empty password.
    #[must_use]
    pub fn missing_password() -> Self {
        Self::new(codes::MISSING_PASSWORD, "A password is required")
    }

    /// Duplicate registration.
    #[must_use]
    pub fn email_already_in_use() -> Self {
        Self::new(
            codes::EMAIL_ALREADY_IN_USE,
            "The email address is already in use by another account",
        )
    }

    /// Password below the provider's policy.
    #[must_use]
    pub fn weak_password(message: impl Into<String>) -> Self {
        Self::new(codes::WEAK_PASSWORD, message)
    }

    /// User closed the federated window.
    #[must_use]
    pub fn cancelled() -> Self {
        Self::new(
            codes::POPUP_CLOSED_BY_USER,
            "The sign-in window was closed before finalizing the operation",
        )
    }

    /// Federated window could not be opened.
    #[must_use]
    pub fn popup_blocked() -> Self {
        Self::new(codes::POPUP_BLOCKED, "The sign-in window was blocked")
    }

    /// Interactive flow not available.
    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(codes::OPERATION_NOT_SUPPORTED, message)
    }

    /// Unclassified provider failure.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL_ERROR, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display_includes_code() {
        let err = AuthError::invalid_credential();
        assert_eq!(
            err.to_string(),
            "The supplied credential is invalid (auth/invalid-credential)"
        );
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            AuthError::new(codes::WRONG_PASSWORD, "x").kind(),
            AuthErrorKind::InvalidCredential
        );
        assert_eq!(
            AuthError::email_already_in_use().kind(),
            AuthErrorKind::EmailAlreadyInUse
        );
        assert_eq!(AuthError::cancelled().kind(), AuthErrorKind::Cancelled);
        assert_eq!(AuthError::popup_blocked().kind(), AuthErrorKind::PopupBlocked);
        assert_eq!(
            AuthError::new("auth/something-new", "x").kind(),
            AuthErrorKind::Other
        );
    }

    #[test]
    fn test_only_network_failures_are_transient() {
        assert!(AuthError::network("offline").is_transient());
        assert!(AuthError::new(codes::TOO_MANY_REQUESTS, "slow down").is_transient());
        assert!(!AuthError::invalid_credential().is_transient());
        assert!(!AuthError::weak_password("short").is_transient());
    }
}
