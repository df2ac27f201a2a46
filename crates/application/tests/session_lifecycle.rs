//! Session lifecycle tests against a spy identity provider.
//!
//! The spy records every call and lets each test decide when change
//! notifications are published.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tokio::sync::mpsc;
use vestibule_application::ports::{IdentityCollaborator, IdentitySubscription, UserChange};
use vestibule_application::{ApplicationError, SessionProvider};
use vestibule_domain::auth::codes;
use vestibule_domain::{
    AuthError, AuthMethod, FederatedProvider, Principal, RawUser, SessionStatus,
};

#[derive(Default)]
struct SpyCollaborator {
    listeners: Mutex<Vec<mpsc::UnboundedSender<UserChange>>>,
    subscribe_calls: AtomicUsize,
    unsubscribe_calls: Arc<AtomicUsize>,
    password_calls: Mutex<Vec<(String, String)>>,
    account_calls: Mutex<Vec<(String, String)>>,
    interactive_calls: Mutex<Vec<String>>,
    sign_out_calls: AtomicUsize,
    responses: Mutex<VecDeque<Result<RawUser, AuthError>>>,
    sign_out_response: Mutex<Option<AuthError>>,
}

impl SpyCollaborator {
    fn emit(&self, change: UserChange) {
        let listeners = self.listeners.lock().unwrap();
        for listener in listeners.iter() {
            // Closed listeners have been released by their subscriber.
            let _ = listener.send(change.clone());
        }
    }

    fn respond_with(&self, response: Result<RawUser, AuthError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    fn next_response(&self) -> Result<RawUser, AuthError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AuthError::internal("no scripted response")))
    }
}

#[async_trait]
impl IdentityCollaborator for SpyCollaborator {
    fn method(&self) -> AuthMethod {
        AuthMethod::Firebase
    }

    fn subscribe(&self) -> IdentitySubscription {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners.lock().unwrap().push(tx);
        let unsubscribed = Arc::clone(&self.unsubscribe_calls);
        IdentitySubscription::new(rx, move || {
            unsubscribed.fetch_add(1, Ordering::SeqCst);
        })
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<RawUser, AuthError> {
        self.password_calls
            .lock()
            .unwrap()
            .push((email.to_string(), password.to_string()));
        self.next_response()
    }

    async fn sign_in_interactive(
        &self,
        provider: &FederatedProvider,
    ) -> Result<RawUser, AuthError> {
        self.interactive_calls
            .lock()
            .unwrap()
            .push(provider.provider_id().to_string());
        self.next_response()
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<RawUser, AuthError> {
        self.account_calls
            .lock()
            .unwrap()
            .push((email.to_string(), password.to_string()));
        self.next_response()
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        self.sign_out_response
            .lock()
            .unwrap()
            .take()
            .map_or(Ok(()), Err)
    }
}

fn alice() -> RawUser {
    RawUser::new("u1", Some("a@b.com".to_string()))
}

fn carl() -> RawUser {
    RawUser {
        uid: "u2".to_string(),
        email: Some("c@d.com".to_string()),
        photo_url: Some("http://x/p.png".to_string()),
        display_name: Some("Carl".to_string()),
    }
}

fn mount() -> (Arc<SpyCollaborator>, SessionProvider) {
    let spy = Arc::new(SpyCollaborator::default());
    let provider = SessionProvider::mount(spy.clone());
    (spy, provider)
}

#[tokio::test]
async fn test_mount_registers_exactly_one_listener() {
    let (spy, provider) = mount();
    assert_eq!(spy.subscribe_calls.load(Ordering::SeqCst), 1);
    assert_eq!(provider.method(), AuthMethod::Firebase);
    assert_eq!(
        provider.store().state().status(),
        SessionStatus::Uninitialized
    );
    provider.unmount().await.unwrap();
}

#[tokio::test]
async fn test_signed_out_then_signed_in_mapping() {
    let (spy, provider) = mount();
    let mut observer = provider.store().subscribe();

    spy.emit(None);
    observer.changed().await.unwrap();
    let state = observer.borrow_and_update().clone();
    assert_eq!(state.status(), SessionStatus::Unauthenticated);
    assert_eq!(state.principal(), None);

    spy.emit(Some(alice()));
    observer.changed().await.unwrap();
    let state = observer.borrow_and_update().clone();
    assert_eq!(state.status(), SessionStatus::Authenticated);
    assert_eq!(
        state.principal(),
        Some(&Principal {
            id: "u1".to_string(),
            email: Some("a@b.com".to_string()),
            avatar: None,
            name: Some("a@b.com".to_string()),
        })
    );

    provider.unmount().await.unwrap();
}

#[tokio::test]
async fn test_display_name_and_avatar_carried_over() {
    let (spy, provider) = mount();
    let context = provider.context();

    spy.emit(Some(carl()));
    let state = context.initialized().await.unwrap();

    assert_eq!(
        state.principal(),
        Some(&Principal {
            id: "u2".to_string(),
            email: Some("c@d.com".to_string()),
            avatar: Some("http://x/p.png".to_string()),
            name: Some("Carl".to_string()),
        })
    );
    assert!(context.is_authenticated());
    provider.unmount().await.unwrap();
}

#[tokio::test]
async fn test_status_never_returns_to_uninitialized() {
    let (spy, provider) = mount();
    let mut observer = provider.store().subscribe();

    let changes = [None, Some(alice()), None, Some(carl()), Some(alice()), None];
    for change in changes {
        spy.emit(change);
        observer.changed().await.unwrap();
        let state = observer.borrow_and_update().clone();
        assert!(state.is_initialized());
        assert_eq!(state.is_authenticated(), state.principal().is_some());
    }

    provider.unmount().await.unwrap();
}

#[tokio::test]
async fn test_rejected_sign_in_leaves_state_unchanged() {
    let (spy, provider) = mount();
    let context = provider.context();
    spy.emit(None);
    let before = context.initialized().await.unwrap();
    let mut observer = context.subscribe();

    spy.respond_with(Err(AuthError::invalid_credential()));
    let err = context
        .actions()
        .sign_in_with_email("a@b.com", "wrong")
        .await
        .unwrap_err();

    assert_eq!(err.code(), codes::INVALID_CREDENTIAL);
    assert_eq!(
        *spy.password_calls.lock().unwrap(),
        vec![("a@b.com".to_string(), "wrong".to_string())]
    );
    assert!(!observer.has_changed().unwrap());
    assert_eq!(context.state(), before);

    provider.unmount().await.unwrap();
}

#[tokio::test]
async fn test_accepted_sign_in_waits_for_notification() {
    let (spy, provider) = mount();
    let context = provider.context();
    spy.emit(None);
    context.initialized().await.unwrap();
    let mut observer = context.subscribe();

    spy.respond_with(Ok(alice()));
    let principal = context
        .actions()
        .sign_in_with_email("a@b.com", "secret")
        .await
        .unwrap();
    assert_eq!(principal.id, "u1");

    // The call alone does not authenticate the session.
    assert!(!context.is_authenticated());
    assert!(!observer.has_changed().unwrap());

    spy.emit(Some(alice()));
    observer.changed().await.unwrap();
    assert_eq!(context.principal(), Some(principal));

    provider.unmount().await.unwrap();
}

#[tokio::test]
async fn test_blank_credentials_never_reach_provider() {
    let (spy, provider) = mount();
    let actions = provider.actions();

    let err = actions.sign_in_with_email("", "secret").await.unwrap_err();
    assert_eq!(err.code(), codes::MISSING_EMAIL);

    let err = actions
        .register("a@b.com", "alice", "")
        .await
        .unwrap_err();
    assert_eq!(err.code(), codes::MISSING_PASSWORD);

    assert!(spy.password_calls.lock().unwrap().is_empty());
    assert!(spy.account_calls.lock().unwrap().is_empty());
    provider.unmount().await.unwrap();
}

#[tokio::test]
async fn test_register_forwards_email_and_password_only() {
    let (spy, provider) = mount();

    spy.respond_with(Ok(alice()));
    let principal = provider
        .actions()
        .register("a@b.com", "alice", "secret1")
        .await
        .unwrap();

    assert_eq!(principal.name.as_deref(), Some("a@b.com"));
    assert_eq!(
        *spy.account_calls.lock().unwrap(),
        vec![("a@b.com".to_string(), "secret1".to_string())]
    );
    provider.unmount().await.unwrap();
}

#[tokio::test]
async fn test_federated_cancellation_propagates() {
    let (spy, provider) = mount();

    spy.respond_with(Err(AuthError::cancelled()));
    let err = provider
        .actions()
        .sign_in_with_provider(&FederatedProvider::Google)
        .await
        .unwrap_err();

    assert_eq!(err.code(), codes::POPUP_CLOSED_BY_USER);
    assert_eq!(
        *spy.interactive_calls.lock().unwrap(),
        vec!["google.com".to_string()]
    );
    provider.unmount().await.unwrap();
}

#[tokio::test]
async fn test_failed_sign_out_keeps_session() {
    let (spy, provider) = mount();
    let context = provider.context();
    spy.emit(Some(alice()));
    context.initialized().await.unwrap();

    *spy.sign_out_response.lock().unwrap() = Some(AuthError::network("offline"));
    let err = context.actions().sign_out().await.unwrap_err();

    assert!(err.is_transient());
    assert!(context.is_authenticated());
    assert_eq!(spy.sign_out_calls.load(Ordering::SeqCst), 1);
    provider.unmount().await.unwrap();
}

#[tokio::test]
async fn test_sign_out_completes_on_notification() {
    let (spy, provider) = mount();
    let context = provider.context();
    spy.emit(Some(alice()));
    context.initialized().await.unwrap();
    let mut observer = context.subscribe();

    context.actions().sign_out().await.unwrap();
    assert!(context.is_authenticated());

    spy.emit(None);
    observer.changed().await.unwrap();
    assert_eq!(context.state().status(), SessionStatus::Unauthenticated);
    assert_eq!(context.principal(), None);
    provider.unmount().await.unwrap();
}

#[tokio::test]
async fn test_unmount_releases_listener_once_and_freezes_state() {
    let (spy, provider) = mount();
    let store = provider.store().clone();
    let mut observer = store.subscribe();

    spy.emit(Some(alice()));
    observer.changed().await.unwrap();

    provider.unmount().await.unwrap();
    assert_eq!(spy.unsubscribe_calls.load(Ordering::SeqCst), 1);

    spy.emit(None);
    tokio::task::yield_now().await;

    assert!(!store.is_live());
    assert_eq!(store.state().status(), SessionStatus::Authenticated);
    assert_eq!(spy.unsubscribe_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_initialized_fails_after_unmount() {
    let (_spy, provider) = mount();
    let context = provider.context();
    provider.unmount().await.unwrap();

    let err = context.initialized().await.unwrap_err();
    assert!(matches!(err, ApplicationError::ProviderStopped));
}
