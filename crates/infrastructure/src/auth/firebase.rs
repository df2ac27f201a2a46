//! Firebase Authentication adapter.
//!
//! Talks to the Identity Toolkit REST API. The adapter owns the session it
//! obtains (ID token, refresh token, expiry) and announces every change of
//! signed-in user to its listeners.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;
use vestibule_application::ports::{
    Clock, IdentityCollaborator, IdentitySubscription, InteractiveLogin,
};
use vestibule_domain::auth::codes;
use vestibule_domain::{AuthError, AuthMethod, FederatedProvider, IdentityConfig, RawUser};

use crate::adapters::{ListenerRegistry, SystemClock};
use crate::config::ConfigError;

const SIGN_IN_WITH_PASSWORD_PATH: &str = "v1/accounts:signInWithPassword";
const SIGN_UP_PATH: &str = "v1/accounts:signUp";
const SIGN_IN_WITH_IDP_PATH: &str = "v1/accounts:signInWithIdp";

/// Lifetime assumed when the response omits `expiresIn`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpRequest<'a> {
    post_body: String,
    request_uri: &'a str,
    return_secure_token: bool,
    return_idp_credential: bool,
}

/// Successful sign-in/sign-up response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default, alias = "profilePicture")]
    photo_url: Option<String>,
    id_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Tokens for the signed-in user.
#[derive(Debug, Clone)]
struct ActiveSession {
    user: RawUser,
    id_token: String,
    refresh_token: Option<String>,
    expires_at: DateTime<Utc>,
}

/// Maps an Identity Toolkit error message to an [`AuthError`].
///
/// Messages look like `EMAIL_EXISTS` or `WEAK_PASSWORD : Password should be
/// at least 6 characters`.
#[must_use]
pub fn map_provider_error(message: &str) -> AuthError {
    let (reason, detail) = match message.split_once(" : ") {
        Some((reason, detail)) => (reason.trim(), Some(detail.trim())),
        None => (message.trim(), None),
    };

    let (code, default_message) = match reason {
        "EMAIL_EXISTS" => (
            codes::EMAIL_ALREADY_IN_USE,
            "The email address is already in use by another account",
        ),
        "INVALID_LOGIN_CREDENTIALS" | "INVALID_IDP_RESPONSE" | "INVALID_CREDENTIAL" => {
            (codes::INVALID_CREDENTIAL, "The supplied credential is invalid")
        }
        "INVALID_PASSWORD" => (codes::WRONG_PASSWORD, "The password is invalid"),
        "EMAIL_NOT_FOUND" => (codes::USER_NOT_FOUND, "There is no user for this email"),
        "INVALID_EMAIL" => (codes::INVALID_EMAIL, "The email address is badly formatted"),
        "USER_DISABLED" => (codes::USER_DISABLED, "The user account has been disabled"),
        "WEAK_PASSWORD" => (codes::WEAK_PASSWORD, "The password is too weak"),
        "MISSING_EMAIL" => (codes::MISSING_EMAIL, "An email address is required"),
        "MISSING_PASSWORD" => (codes::MISSING_PASSWORD, "A password is required"),
        "TOO_MANY_ATTEMPTS_TRY_LATER" => (
            codes::TOO_MANY_REQUESTS,
            "Too many attempts, try again later",
        ),
        "OPERATION_NOT_ALLOWED" | "PASSWORD_LOGIN_DISABLED" => (
            codes::OPERATION_NOT_ALLOWED,
            "This sign-in method is disabled for the project",
        ),
        "INVALID_API_KEY" => (codes::INVALID_API_KEY, "The API key is invalid"),
        _ if reason.starts_with("API key not valid") => {
            (codes::INVALID_API_KEY, "The API key is invalid")
        }
        _ => return AuthError::internal(message.trim()),
    };

    AuthError::new(code, detail.unwrap_or(default_message))
}

/// When a token issued at `now` with the given `expiresIn` runs out.
///
/// Missing, negative or out-of-range lifetimes fall back to
/// [`DEFAULT_TOKEN_LIFETIME_SECS`].
fn token_expiry(now: DateTime<Utc>, expires_in: Option<&str>) -> DateTime<Utc> {
    expires_in
        .and_then(|secs| secs.trim().parse::<i64>().ok())
        .filter(|secs| *secs >= 0)
        .and_then(TimeDelta::try_seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .or_else(|| {
            TimeDelta::try_seconds(DEFAULT_TOKEN_LIFETIME_SECS)
                .and_then(|lifetime| now.checked_add_signed(lifetime))
        })
        .unwrap_or(now)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Identity provider adapter for Firebase Authentication.
pub struct FirebaseIdentityClient {
    config: IdentityConfig,
    endpoint: Url,
    http_client: reqwest::Client,
    clock: Arc<dyn Clock>,
    interactive: Option<Arc<dyn InteractiveLogin>>,
    session: Mutex<Option<ActiveSession>>,
    listeners: ListenerRegistry,
}

impl FirebaseIdentityClient {
    /// One-time setup from static configuration.
    ///
    /// No request is made; nobody is signed in until a sign-in succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is incomplete or the HTTP
    /// client cannot be built.
    pub fn initialize(config: IdentityConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let endpoint = config.identity_endpoint()?;
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("vestibule/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::Http(e.to_string()))?;

        info!(project = %config.project_id, endpoint = %endpoint, "identity client initialized");
        Ok(Self {
            config,
            endpoint,
            http_client,
            clock: Arc::new(SystemClock::new()),
            interactive: None,
            session: Mutex::new(None),
            listeners: ListenerRegistry::new(),
        })
    }

    /// Replaces the clock used for token expiry.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Enables federated sign-in through `login`.
    #[must_use]
    pub fn with_interactive_login(mut self, login: Arc<dyn InteractiveLogin>) -> Self {
        self.interactive = Some(login);
        self
    }

    /// The configuration this client was initialized with.
    #[must_use]
    pub const fn config(&self) -> &IdentityConfig {
        &self.config
    }

    /// The signed-in user's ID token, while it is still valid.
    #[must_use]
    pub fn id_token(&self) -> Option<String> {
        let now = self.clock.now();
        lock(&self.session)
            .as_ref()
            .filter(|session| session.expires_at > now)
            .map(|session| session.id_token.clone())
    }

    /// The refresh token of the signed-in user.
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        lock(&self.session)
            .as_ref()
            .and_then(|session| session.refresh_token.clone())
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<RawUser> {
        lock(&self.session).as_ref().map(|session| session.user.clone())
    }

    fn endpoint_url(&self, path: &str) -> Result<Url, AuthError> {
        let mut url = self
            .endpoint
            .join(path)
            .map_err(|e| AuthError::internal(format!("Invalid identity endpoint: {e}")))?;
        url.query_pairs_mut().append_pair("key", &self.config.api_key);
        Ok(url)
    }

    async fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<AuthResponse, AuthError> {
        let url = self.endpoint_url(path)?;
        debug!(path, "identity request");

        let response = self
            .http_client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e: reqwest::Error| AuthError::network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e: reqwest::Error| AuthError::network(e.to_string()))?;

        if !status.is_success() {
            let err = serde_json::from_str::<ErrorEnvelope>(&text).map_or_else(
                |_| AuthError::internal(format!("Identity endpoint returned {status}: {text}")),
                |envelope| map_provider_error(&envelope.error.message),
            );
            warn!(path, %status, code = err.code(), "identity request rejected");
            return Err(err);
        }

        serde_json::from_str(&text)
            .map_err(|e| AuthError::internal(format!("Failed to parse identity response: {e}")))
    }

    /// Stores the new session and announces the user.
    fn establish(&self, response: AuthResponse) -> RawUser {
        let expires_at = token_expiry(self.clock.now(), response.expires_in.as_deref());
        let user = RawUser {
            uid: response.local_id,
            email: response.email,
            photo_url: response.photo_url,
            display_name: response.display_name,
        };
        *lock(&self.session) = Some(ActiveSession {
            user: user.clone(),
            id_token: response.id_token,
            refresh_token: response.refresh_token,
            expires_at,
        });

        info!(uid = %user.uid, "identity session established");
        self.listeners.publish(Some(user.clone()));
        user
    }

    fn request_uri(&self) -> String {
        self.config
            .auth_domain
            .as_deref()
            .map_or_else(|| "http://localhost".to_string(), |domain| format!("https://{domain}"))
    }
}

#[async_trait]
impl IdentityCollaborator for FirebaseIdentityClient {
    fn method(&self) -> AuthMethod {
        AuthMethod::Firebase
    }

    fn subscribe(&self) -> IdentitySubscription {
        self.listeners.subscribe()
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<RawUser, AuthError> {
        let request = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let response = self.post(SIGN_IN_WITH_PASSWORD_PATH, &request).await?;
        Ok(self.establish(response))
    }

    async fn sign_in_interactive(
        &self,
        provider: &FederatedProvider,
    ) -> Result<RawUser, AuthError> {
        let Some(login) = &self.interactive else {
            return Err(AuthError::unsupported(
                "No interactive login is available in this environment",
            ));
        };

        let credential = login.authorize(provider).await?;
        if !credential.has_token() {
            return Err(AuthError::new(
                codes::INVALID_CREDENTIAL,
                "The federated provider returned no token",
            ));
        }

        let mut params = vec![("providerId", credential.provider_id.as_str())];
        if let Some(token) = &credential.id_token {
            params.push(("id_token", token.as_str()));
        }
        if let Some(token) = &credential.access_token {
            params.push(("access_token", token.as_str()));
        }
        let post_body = serde_urlencoded::to_string(&params)
            .map_err(|e| AuthError::internal(format!("Failed to encode post body: {e}")))?;

        let request_uri = self.request_uri();
        let request = IdpRequest {
            post_body,
            request_uri: &request_uri,
            return_secure_token: true,
            return_idp_credential: true,
        };
        let response = self.post(SIGN_IN_WITH_IDP_PATH, &request).await?;
        Ok(self.establish(response))
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<RawUser, AuthError> {
        let request = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let response = self.post(SIGN_UP_PATH, &request).await?;
        // The hosted provider signs new accounts in.
        Ok(self.establish(response))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        // Sessions are held client-side only; dropping the tokens ends it.
        let previous = lock(&self.session).take();
        if let Some(session) = previous {
            info!(uid = %session.user.uid, "identity session cleared");
        }
        self.listeners.publish(None);
        Ok(())
    }
}

impl std::fmt::Debug for FirebaseIdentityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseIdentityClient")
            .field("project_id", &self.config.project_id)
            .field("endpoint", &self.endpoint.as_str())
            .field("interactive", &self.interactive.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn client() -> FirebaseIdentityClient {
        FirebaseIdentityClient::initialize(IdentityConfig::new("test-key", "demo")).unwrap()
    }

    #[test]
    fn test_token_expiry_bounds() {
        use chrono::TimeZone;
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let default = now + TimeDelta::seconds(DEFAULT_TOKEN_LIFETIME_SECS);

        assert_eq!(token_expiry(now, Some("120")), now + TimeDelta::seconds(120));
        assert_eq!(token_expiry(now, Some("0")), now);
        assert_eq!(token_expiry(now, None), default);
        assert_eq!(token_expiry(now, Some("soon")), default);
        assert_eq!(token_expiry(now, Some("-5")), default);
        assert_eq!(token_expiry(now, Some("9223372036854775807")), default);
        // Fits a TimeDelta but overflows the calendar.
        assert_eq!(token_expiry(now, Some("100000000000000")), default);
    }

    #[test]
    fn test_map_known_reasons() {
        assert_eq!(
            map_provider_error("EMAIL_EXISTS").code(),
            codes::EMAIL_ALREADY_IN_USE
        );
        assert_eq!(
            map_provider_error("INVALID_LOGIN_CREDENTIALS").code(),
            codes::INVALID_CREDENTIAL
        );
        assert_eq!(
            map_provider_error("TOO_MANY_ATTEMPTS_TRY_LATER : Access disabled").code(),
            codes::TOO_MANY_REQUESTS
        );
        assert_eq!(
            map_provider_error("API key not valid. Please pass a valid API key.").code(),
            codes::INVALID_API_KEY
        );
    }

    #[test]
    fn test_map_keeps_provider_detail() {
        let err = map_provider_error("WEAK_PASSWORD : Password should be at least 6 characters");
        assert_eq!(err.code(), codes::WEAK_PASSWORD);
        assert_eq!(err.message(), "Password should be at least 6 characters");
    }

    #[test]
    fn test_map_unknown_reason_is_internal() {
        let err = map_provider_error("SOMETHING_NEW");
        assert_eq!(err.code(), codes::INTERNAL_ERROR);
        assert_eq!(err.message(), "SOMETHING_NEW");
    }

    #[test]
    fn test_initialize_rejects_missing_api_key() {
        let result = FirebaseIdentityClient::initialize(IdentityConfig::new("", "demo"));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_endpoint_url_carries_api_key() {
        let url = client().endpoint_url(SIGN_UP_PATH).unwrap();
        assert_eq!(
            url.as_str(),
            "https://identitytoolkit.googleapis.com/v1/accounts:signUp?key=test-key"
        );
    }

    #[test]
    fn test_request_uri_uses_auth_domain() {
        let mut config = IdentityConfig::new("k", "demo");
        config.auth_domain = Some("demo.firebaseapp.com".to_string());
        let client = FirebaseIdentityClient::initialize(config).unwrap();
        assert_eq!(client.request_uri(), "https://demo.firebaseapp.com");
    }

    #[tokio::test]
    async fn test_interactive_without_login_is_unsupported() {
        let err = client()
            .sign_in_interactive(&FederatedProvider::Google)
            .await
            .unwrap_err();
        assert_eq!(err.code(), codes::OPERATION_NOT_SUPPORTED);
    }

    #[tokio::test]
    async fn test_sign_out_without_session_still_notifies() {
        let client = client();
        let mut subscription = client.subscribe();
        assert_eq!(subscription.next_change().await, Some(None));

        client.sign_out().await.unwrap();
        assert_eq!(subscription.next_change().await, Some(None));
        assert_eq!(client.id_token(), None);
    }
}
