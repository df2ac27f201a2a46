//! Identity configuration loading.
//!
//! The configuration is a JSON or YAML file in the provider's console
//! format, named by `VESTIBULE_CONFIG`. A handful of environment variables
//! override single fields, and can stand in for the file entirely.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use url::Url;
use vestibule_domain::{DomainError, IdentityConfig};

/// Path of the configuration file.
pub const CONFIG_PATH_ENV: &str = "VESTIBULE_CONFIG";
/// Overrides `apiKey`.
pub const API_KEY_ENV: &str = "VESTIBULE_API_KEY";
/// Overrides `projectId`.
pub const PROJECT_ID_ENV: &str = "VESTIBULE_PROJECT_ID";
/// Overrides `authDomain`.
pub const AUTH_DOMAIN_ENV: &str = "VESTIBULE_AUTH_DOMAIN";
/// Overrides `identityEndpoint`, e.g. to point at a local emulator.
pub const IDENTITY_ENDPOINT_ENV: &str = "VESTIBULE_IDENTITY_ENDPOINT";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not valid JSON.
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// The file is not valid YAML.
    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The file extension is neither JSON nor YAML.
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(PathBuf),

    /// An override is malformed.
    #[error("invalid value for {name}: {message}")]
    InvalidOverride {
        /// Variable name.
        name: &'static str,
        /// What was wrong.
        message: String,
    },

    /// The configuration is incomplete.
    #[error(transparent)]
    Invalid(#[from] DomainError),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(String),
}

/// Serialization format of a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.json`
    Json,
    /// `.yaml` / `.yml`
    Yaml,
}

impl ConfigFormat {
    /// Picks the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Parses configuration text.
///
/// # Errors
///
/// Returns a parse error for malformed input.
pub fn parse_identity_config(
    contents: &str,
    format: ConfigFormat,
) -> Result<IdentityConfig, ConfigError> {
    let config = match format {
        ConfigFormat::Json => serde_json::from_str(contents)?,
        ConfigFormat::Yaml => serde_yaml::from_str(contents)?,
    };
    Ok(config)
}

/// Reads and parses a config file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, has an unknown extension,
/// or does not parse.
pub async fn load_identity_config(path: &Path) -> Result<IdentityConfig, ConfigError> {
    let format =
        ConfigFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat(path.into()))?;
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Io {
            path: path.into(),
            source,
        })?;
    debug!(path = %path.display(), ?format, "loaded identity config");
    parse_identity_config(&contents, format)
}

/// Applies field overrides looked up through `var`.
///
/// # Errors
///
/// Returns `InvalidOverride` if the endpoint override is not a URL.
pub fn apply_overrides(
    mut config: IdentityConfig,
    var: impl Fn(&str) -> Option<String>,
) -> Result<IdentityConfig, ConfigError> {
    if let Some(api_key) = var(API_KEY_ENV) {
        config.api_key = api_key;
    }
    if let Some(project_id) = var(PROJECT_ID_ENV) {
        config.project_id = project_id;
    }
    if let Some(auth_domain) = var(AUTH_DOMAIN_ENV) {
        config.auth_domain = Some(auth_domain);
    }
    if let Some(endpoint) = var(IDENTITY_ENDPOINT_ENV) {
        let url = Url::parse(&endpoint).map_err(|e| ConfigError::InvalidOverride {
            name: IDENTITY_ENDPOINT_ENV,
            message: e.to_string(),
        })?;
        config.identity_endpoint = Some(url);
    }
    Ok(config)
}

/// Resolves the identity configuration from the environment.
///
/// Returns `Ok(None)` when neither a config file nor the required
/// variables are present, which selects the in-process provider.
///
/// # Errors
///
/// Returns an error if a named file cannot be loaded, an override is
/// malformed, or the result is incomplete.
pub async fn load_from_env(
    var: impl Fn(&str) -> Option<String>,
) -> Result<Option<IdentityConfig>, ConfigError> {
    let base = match var(CONFIG_PATH_ENV) {
        Some(path) => load_identity_config(Path::new(&path)).await?,
        None if var(API_KEY_ENV).is_some() => IdentityConfig::default(),
        None => return Ok(None),
    };
    let config = apply_overrides(base, var)?;
    config.validate()?;
    Ok(Some(config))
}
