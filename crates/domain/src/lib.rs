//! Vestibule Domain - Core session types
//!
//! This crate defines the domain model for the Vestibule session layer.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod config;
pub mod error;
pub mod id;
pub mod session;

pub use auth::{
    AuthError, AuthErrorKind, AuthMethod, EmailCredential, FederatedCredential, FederatedProvider,
    Registration,
};
pub use config::IdentityConfig;
pub use error::{DomainError, DomainResult};
pub use id::generate_id;
pub use session::{Principal, RawUser, SessionAction, SessionState, SessionStatus};
