//! Authentication domain types

mod credentials;
mod error;
mod provider;

pub use credentials::{EmailCredential, FederatedCredential, Registration};
pub use error::{AuthError, AuthErrorKind, codes};
pub use provider::{AuthMethod, FederatedProvider};
