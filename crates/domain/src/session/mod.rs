//! Session state domain types
//!
//! The session mirrors the identity provider's view of who is signed in.
//! [`SessionState::reduce`] is the only way to move between states.

mod principal;
mod state;

pub use principal::{Principal, RawUser};
pub use state::{SessionAction, SessionState, SessionStatus};
