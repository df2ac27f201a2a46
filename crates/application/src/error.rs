//! Application error types

use thiserror::Error;
use vestibule_domain::{AuthError, DomainError};

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// The identity provider rejected a request.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The session provider was unmounted before the request completed.
    #[error("session provider stopped")]
    ProviderStopped,

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
