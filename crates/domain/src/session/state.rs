//! Session state machine.
//!
//! ```text
//! Uninitialized ──AUTH_CHANGED──▶ Authenticated ◀──▶ Unauthenticated
//!       └──────────AUTH_CHANGED──────────────────────────▲
//! ```
//!
//! There is no edge back to `Uninitialized`.

use serde::Serialize;

use super::{Principal, RawUser};

/// Authentication status of the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// The identity provider has not reported yet.
    #[default]
    Uninitialized,
    /// Nobody is signed in.
    Unauthenticated,
    /// A principal is signed in.
    Authenticated,
}

/// Immutable snapshot of the session.
///
/// `principal` is `Some` exactly when `status` is `Authenticated`; the
/// fields are private so the pair can only change together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct SessionState {
    status: SessionStatus,
    principal: Option<Principal>,
    revision: u64,
}

/// Mutations accepted by [`SessionState::reduce`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// The identity provider reported a new authentication state.
    AuthChanged {
        /// Whether the provider considers the user signed in.
        is_authenticated: bool,
        /// The signed-in identity, if any.
        principal: Option<Principal>,
    },
}

impl SessionAction {
    /// Builds an `AuthChanged` from a provider notification.
    #[must_use]
    pub fn auth_changed(user: Option<RawUser>) -> Self {
        Self::AuthChanged {
            is_authenticated: user.is_some(),
            principal: user.map(Principal::from),
        }
    }
}

impl SessionState {
    /// The state every session starts in.
    #[must_use]
    pub fn initial() -> Self {
        Self::default()
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    /// Signed-in principal, present only when authenticated.
    #[must_use]
    pub const fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Number of provider notifications applied so far.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// True once the provider has reported at least once.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        !matches!(self.status, SessionStatus::Uninitialized)
    }

    /// True when a principal is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self.status, SessionStatus::Authenticated)
    }

    /// Applies an action and returns the next state.
    ///
    /// `AuthChanged(true, None)` is treated as signed out and
    /// `AuthChanged(false, Some(_))` drops the principal, so the
    /// status/principal pairing always holds.
    #[must_use]
    pub fn reduce(&self, action: SessionAction) -> Self {
        match action {
            SessionAction::AuthChanged {
                is_authenticated,
                principal,
            } => {
                let (status, principal) = match (is_authenticated, principal) {
                    (true, Some(principal)) => (SessionStatus::Authenticated, Some(principal)),
                    _ => (SessionStatus::Unauthenticated, None),
                };
                Self {
                    status,
                    principal,
                    revision: self.revision + 1,
                }
            }
        }
    }
}
