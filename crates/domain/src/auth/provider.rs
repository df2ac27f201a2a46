//! Federated identity providers and the session backend marker.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A federated identity provider usable with interactive sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FederatedProvider {
    /// Google accounts (`google.com`).
    Google,
    /// GitHub (`github.com`).
    GitHub,
    /// Microsoft accounts (`microsoft.com`).
    Microsoft,
    /// Sign in with Apple (`apple.com`).
    Apple,
    /// Any other provider, by its identifier (e.g. `oidc.corp`).
    Other(String),
}

impl FederatedProvider {
    /// The provider identifier understood by the identity service.
    #[must_use]
    pub fn provider_id(&self) -> &str {
        match self {
            Self::Google => "google.com",
            Self::GitHub => "github.com",
            Self::Microsoft => "microsoft.com",
            Self::Apple => "apple.com",
            Self::Other(id) => id,
        }
    }
}

impl fmt::Display for FederatedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.provider_id())
    }
}

impl FromStr for FederatedProvider {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim();
        match id.to_ascii_lowercase().as_str() {
            "" => Err(DomainError::InvalidIdentifier(
                "provider identifier is empty".to_string(),
            )),
            "google" | "google.com" => Ok(Self::Google),
            "github" | "github.com" => Ok(Self::GitHub),
            "microsoft" | "microsoft.com" => Ok(Self::Microsoft),
            "apple" | "apple.com" => Ok(Self::Apple),
            _ => Ok(Self::Other(id.to_string())),
        }
    }
}

/// Which identity backend a session context is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthMethod {
    /// Firebase Authentication.
    Firebase,
    /// The in-process provider used for demos and tests.
    Local,
}

impl AuthMethod {
    /// Upper-case label, as shown in the dashboard header.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Firebase => "FIREBASE",
            Self::Local => "LOCAL",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
