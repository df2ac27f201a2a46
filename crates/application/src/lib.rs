//! Vestibule Application - Session core
//!
//! Ports to the identity provider and the session store, facade and
//! subscription lifecycle built on top of them.

pub mod error;
pub mod ports;
pub mod session;

pub use error::{ApplicationError, ApplicationResult};
pub use session::{AuthContext, SessionActions, SessionProvider, SessionStore};
