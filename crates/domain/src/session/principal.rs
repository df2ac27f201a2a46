//! Signed-in identity types.

use serde::{Deserialize, Serialize};

/// The user record as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawUser {
    /// Provider-assigned unique identifier.
    pub uid: String,
    /// Primary email, if the account has one.
    #[serde(default)]
    pub email: Option<String>,
    /// Profile picture URL.
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
    /// Profile display name.
    #[serde(default, rename = "displayName")]
    pub display_name: Option<String>,
}

impl RawUser {
    /// Creates a raw user with only a uid and email.
    #[must_use]
    pub fn new(uid: impl Into<String>, email: Option<String>) -> Self {
        Self {
            uid: uid.into(),
            email,
            photo_url: None,
            display_name: None,
        }
    }
}

/// The authenticated identity exposed to the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    /// Opaque identifier assigned by the identity provider.
    pub id: String,
    /// Email, if any.
    pub email: Option<String>,
    /// Avatar URL, if any.
    pub avatar: Option<String>,
    /// Display name; the email when the profile has none.
    pub name: Option<String>,
}

impl Principal {
    /// Name to show in the UI, falling back to the identifier.
    #[must_use]
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

impl From<RawUser> for Principal {
    fn from(user: RawUser) -> Self {
        // An empty display name counts as unset.
        let name = user
            .display_name
            .filter(|name| !name.is_empty())
            .or_else(|| user.email.clone());

        Self {
            id: user.uid,
            email: user.email,
            avatar: user.photo_url,
            name,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_name_falls_back_to_email() {
        let principal = Principal::from(RawUser::new("u1", Some("a@b.com".to_string())));
        assert_eq!(
            principal,
            Principal {
                id: "u1".to_string(),
                email: Some("a@b.com".to_string()),
                avatar: None,
                name: Some("a@b.com".to_string()),
            }
        );
    }

    #[test]
    fn test_display_name_wins_over_email() {
        let principal = Principal::from(RawUser {
            uid: "u2".to_string(),
            email: Some("c@d.com".to_string()),
            photo_url: Some("http://x/p.png".to_string()),
            display_name: Some("Carl".to_string()),
        });
        assert_eq!(principal.id, "u2");
        assert_eq!(principal.email.as_deref(), Some("c@d.com"));
        assert_eq!(principal.avatar.as_deref(), Some("http://x/p.png"));
        assert_eq!(principal.name.as_deref(), Some("Carl"));
    }

    #[test]
    fn test_empty_display_name_counts_as_unset() {
        let principal = Principal::from(RawUser {
            display_name: Some(String::new()),
            ..RawUser::new("u3", Some("e@f.com".to_string()))
        });
        assert_eq!(principal.name.as_deref(), Some("e@f.com"));
    }

    #[test]
    fn test_no_email_no_name() {
        let principal = Principal::from(RawUser::new("anon", None));
        assert_eq!(principal.name, None);
        assert_eq!(principal.label(), "anon");
    }

    #[test]
    fn test_raw_user_wire_shape() {
        let json = r#"{"uid":"u9","email":null,"photoURL":"http://x/a.png","displayName":"Dee"}"#;
        let user: RawUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.photo_url.as_deref(), Some("http://x/a.png"));
        assert_eq!(user.display_name.as_deref(), Some("Dee"));
        assert_eq!(user.email, None);
    }
}
