//! Vestibule Infrastructure - Adapters and implementations
//!
//! This crate provides the identity provider adapters behind the
//! application layer's ports, plus configuration loading.

pub mod adapters;
pub mod auth;
pub mod config;

pub use adapters::{FixedClock, ListenerRegistry, SystemClock};
pub use auth::{
    FederatedOutcome, FirebaseIdentityClient, InMemoryIdentityProvider, MIN_PASSWORD_LEN,
    map_provider_error,
};
pub use config::{
    ConfigError, ConfigFormat, apply_overrides, load_from_env, load_identity_config,
    parse_identity_config,
};
