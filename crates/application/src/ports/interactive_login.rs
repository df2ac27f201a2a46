//! Interactive login port

use async_trait::async_trait;
use vestibule_domain::{AuthError, FederatedCredential, FederatedProvider};

/// Runs a federated provider's consent flow (a browser popup, a device
/// code prompt) and hands back the resulting credential.
///
/// Identity adapters that cannot drive such a flow themselves take one of
/// these as a dependency.
#[async_trait]
pub trait InteractiveLogin: Send + Sync {
    /// Obtains a credential from `provider`.
    ///
    /// # Errors
    /// `auth/popup-closed-by-user` when the user backs out,
    /// `auth/popup-blocked` when the flow cannot be shown.
    async fn authorize(&self, provider: &FederatedProvider)
    -> Result<FederatedCredential, AuthError>;
}
