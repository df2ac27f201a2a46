//! Identity provider adapters.
//!
//! - Firebase Authentication over its REST API
//! - An in-process provider for demos and tests

mod firebase;
mod memory;

pub use firebase::{FirebaseIdentityClient, map_provider_error};
pub use memory::{FederatedOutcome, InMemoryIdentityProvider, MIN_PASSWORD_LEN};
