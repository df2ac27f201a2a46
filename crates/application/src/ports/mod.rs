//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the session core and the identity
//! provider. Each port is a trait implemented by adapters in the
//! infrastructure layer.

mod clock;
mod identity;
mod interactive_login;

pub use clock::Clock;
pub use identity::{IdentityCollaborator, IdentitySubscription, UserChange};
pub use interactive_login::InteractiveLogin;
