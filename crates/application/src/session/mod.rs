//! Session module for the dashboard.
//!
//! This module provides:
//! - The session store, the read side of the session state
//! - The actions facade that forwards intents to the identity provider
//! - The provider that owns the subscription and the only writer
//! - The context handle handed to UI code

mod actions;
mod context;
mod provider;
mod store;

pub use actions::SessionActions;
pub use context::AuthContext;
pub use provider::SessionProvider;
pub use store::SessionStore;
