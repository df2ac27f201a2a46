//! Identity provider configuration.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// Base URL of the hosted Identity Toolkit REST API.
pub const DEFAULT_IDENTITY_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/";

/// Static configuration for the identity provider.
///
/// Field names follow the provider's web config object, so a config
/// copied from its console deserializes unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct IdentityConfig {
    /// Browser API key of the project.
    pub api_key: String,
    /// Hosting domain used by federated redirects.
    #[serde(default)]
    pub auth_domain: Option<String>,
    /// Project identifier.
    pub project_id: String,
    /// Storage bucket (unused by the session layer).
    #[serde(default)]
    pub storage_bucket: Option<String>,
    /// Messaging sender id (unused by the session layer).
    #[serde(default)]
    pub messaging_sender_id: Option<String>,
    /// App id.
    #[serde(default)]
    pub app_id: Option<String>,
    /// Analytics measurement id (unused by the session layer).
    #[serde(default)]
    pub measurement_id: Option<String>,
    /// Override for the REST endpoint, e.g. a local emulator.
    #[serde(default)]
    pub identity_endpoint: Option<Url>,
}

impl IdentityConfig {
    /// Creates a config with the two required fields.
    #[must_use]
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            project_id: project_id.into(),
            ..Self::default()
        }
    }

    /// Sets the REST endpoint override.
    #[must_use]
    pub fn with_identity_endpoint(mut self, endpoint: Url) -> Self {
        self.identity_endpoint = Some(endpoint);
        self
    }

    /// The REST endpoint to talk to, always ending in `/`.
    ///
    /// Request paths are joined onto it, so an override such as
    /// `http://localhost:9099/identitytoolkit.googleapis.com` keeps its
    /// path prefix.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in default cannot be parsed.
    pub fn identity_endpoint(&self) -> DomainResult<Url> {
        let mut url = match &self.identity_endpoint {
            Some(url) => url.clone(),
            None => Url::parse(DEFAULT_IDENTITY_ENDPOINT)
                .map_err(|e| DomainError::InvalidConfiguration(e.to_string()))?,
        };
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    /// Checks that required fields are present.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` naming the first missing field.
    pub fn validate(&self) -> DomainResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(DomainError::InvalidConfiguration(
                "apiKey is required".to_string(),
            ));
        }
        if self.project_id.trim().is_empty() {
            return Err(DomainError::InvalidConfiguration(
                "projectId is required".to_string(),
            ));
        }
        if let Some(url) = &self.identity_endpoint
            && url.cannot_be_a_base()
        {
            return Err(DomainError::InvalidConfiguration(format!(
                "identityEndpoint is not a base URL: {url}"
            )));
        }
        Ok(())
    }
}
