//! Session store flows against scripted collaborators and real storage.

mod helpers;

use std::sync::Arc;

use tokio::sync::Notify;

use shiphub_auth::{AuthFailure, SessionStore};
use shiphub_core::error::ErrorKind;
use shiphub_core::traits::storage::{DurableStorage, read_json, write_json};
use shiphub_entity::session::StoredCredentials;
use shiphub_entity::user::{User, UserRole};
use shiphub_storage::keys;
use shiphub_storage::local::LocalFileStorage;

use helpers::{ScriptedAuthApi, SessionFixture, accepted, rejected};

#[tokio::test]
async fn test_login_persists_before_authenticating() {
    let fixture = SessionFixture::new(accepted(UserRole::Merchant, "tok-1"));

    let user = fixture
        .session
        .login("merchant@ship.test", "secret")
        .await
        .unwrap();
    assert_eq!(user.role, UserRole::Merchant);

    let writes = fixture.storage.writes();
    let keys_written: Vec<_> = writes.iter().map(|w| w.key.as_str()).collect();
    assert_eq!(keys_written, [keys::CREDENTIALS, keys::USER]);
    assert!(writes.iter().all(|w| !w.authenticated_at_write));

    let state = fixture.session.state();
    assert!(state.is_authenticated);
    assert!(state.is_consistent());
    assert_eq!(state.token.as_deref(), Some("tok-1"));
    assert!(!state.is_loading);
    assert!(state.initialized);
}

#[tokio::test]
async fn test_rejected_login_surfaces_server_message() {
    let fixture = SessionFixture::new(rejected("Invalid credentials"));

    let err = fixture
        .session
        .login("merchant@ship.test", "wrong")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);

    let state = fixture.session.state();
    assert!(!state.is_authenticated);
    assert!(!state.is_loading);
    assert_eq!(state.error.as_deref(), Some("Invalid credentials"));
    assert!(fixture.storage.writes().is_empty());
}

#[tokio::test]
async fn test_unreachable_service_uses_generic_message() {
    let fixture = SessionFixture::new(Err(AuthFailure::Transport("connection refused".into())));

    let err = fixture
        .session
        .login("merchant@ship.test", "secret")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ExternalService);
    assert_eq!(
        fixture.session.state().error.as_deref(),
        Some(shiphub_auth::client::DEFAULT_LOGIN_ERROR)
    );
}

#[tokio::test]
async fn test_invalid_email_never_reaches_service() {
    let fixture = SessionFixture::new(accepted(UserRole::Merchant, "tok-1"));

    let err = fixture.session.login("not-an-email", "secret").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(fixture.api.sign_in_calls(), 0);
    assert!(fixture.session.state().error.is_some());
}

#[tokio::test]
async fn test_clear_error_keeps_session_fields() {
    let fixture = SessionFixture::new(rejected("Invalid credentials"));
    let _ = fixture.session.login("merchant@ship.test", "wrong").await;

    fixture.session.clear_error();
    let state = fixture.session.state();
    assert!(state.error.is_none());
    assert!(!state.is_authenticated);
    assert!(state.initialized);
}

#[tokio::test]
async fn test_corrupt_user_record_clears_session() {
    let fixture = SessionFixture::new(accepted(UserRole::Courier, "tok-1"));
    write_json(
        fixture.storage.as_ref(),
        keys::CREDENTIALS,
        &StoredCredentials::new("tok-stale", UserRole::Courier),
    )
    .await
    .unwrap();
    fixture.storage.set(keys::USER, "{not json").await.unwrap();

    let state = fixture.session.check_auth().await;

    assert!(!state.is_authenticated);
    assert!(state.initialized);
    assert!(fixture.storage.is_empty());
}

#[tokio::test]
async fn test_partial_session_is_wiped() {
    let fixture = SessionFixture::new(accepted(UserRole::Courier, "tok-1"));
    write_json(
        fixture.storage.as_ref(),
        keys::CREDENTIALS,
        &StoredCredentials::new("tok-orphan", UserRole::Courier),
    )
    .await
    .unwrap();

    let state = fixture.session.check_auth().await;

    assert!(!state.is_authenticated);
    assert!(fixture.storage.is_empty());
}

#[tokio::test]
async fn test_empty_storage_resolves_signed_out() {
    let fixture = SessionFixture::new(accepted(UserRole::Admin, "tok-1"));
    assert!(!fixture.session.state().initialized);

    let state = fixture.session.check_auth().await;

    assert!(!state.is_authenticated);
    assert!(state.initialized);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_session_survives_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    {
        let storage: Arc<dyn DurableStorage> = Arc::new(LocalFileStorage::open(&path).await.unwrap());
        let api = Arc::new(ScriptedAuthApi::new(
            storage.clone(),
            accepted(UserRole::Admin, "tok-disk"),
        ));
        let session = SessionStore::new(api, storage);
        session.login("admin@ship.test", "secret").await.unwrap();
    }

    let storage: Arc<dyn DurableStorage> = Arc::new(LocalFileStorage::open(&path).await.unwrap());
    let api = Arc::new(ScriptedAuthApi::new(
        storage.clone(),
        rejected("should not be called"),
    ));
    let session = SessionStore::new(api.clone(), storage.clone());

    let state = session.check_auth().await;

    assert!(state.is_authenticated);
    assert_eq!(state.token.as_deref(), Some("tok-disk"));
    assert_eq!(state.role(), Some(UserRole::Admin));
    assert_eq!(api.sign_in_calls(), 0);

    let stored: User = read_json(storage.as_ref(), keys::USER).await.unwrap().unwrap();
    assert_eq!(stored.email, "admin@ship.test");
}

#[tokio::test]
async fn test_concurrent_login_is_rejected() {
    let gate = Arc::new(Notify::new());
    let fixture = SessionFixture::with_api({
        let gate = gate.clone();
        move |storage| {
            ScriptedAuthApi::new(storage, accepted(UserRole::Merchant, "tok-1")).gated(gate)
        }
    });

    let first = {
        let session = fixture.session.clone();
        tokio::spawn(async move { session.login("merchant@ship.test", "secret").await })
    };
    helpers::eventually("first login in flight", || fixture.api.sign_in_calls() == 1).await;

    let err = fixture
        .session
        .login("merchant@ship.test", "secret")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(fixture.api.sign_in_calls(), 1);

    gate.notify_one();
    first.await.unwrap().unwrap();
    assert!(fixture.session.is_authenticated());
}

#[tokio::test]
async fn test_logout_clears_storage_even_when_collaborator_fails() {
    let fixture = SessionFixture::with_api(|storage| {
        ScriptedAuthApi::new(storage, accepted(UserRole::Courier, "tok-1")).failing_sign_out()
    });
    fixture
        .session
        .login("courier@ship.test", "secret")
        .await
        .unwrap();
    assert!(!fixture.storage.is_empty());

    fixture.session.logout().await;

    let state = fixture.session.state();
    assert!(!state.is_authenticated);
    assert!(state.user.is_none());
    assert!(state.token.is_none());
    assert!(fixture.storage.is_empty());
}

#[tokio::test]
async fn test_set_user_keeps_token() {
    let fixture = SessionFixture::new(accepted(UserRole::Merchant, "tok-1"));
    let mut user = fixture
        .session
        .login("merchant@ship.test", "secret")
        .await
        .unwrap();

    user.name = Some("Renamed Shop".to_string());
    fixture.session.set_user(user).await.unwrap();

    let state = fixture.session.state();
    assert_eq!(state.token.as_deref(), Some("tok-1"));
    assert_eq!(state.user.unwrap().name.as_deref(), Some("Renamed Shop"));

    let stored: User = read_json(fixture.storage.as_ref(), keys::USER)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name.as_deref(), Some("Renamed Shop"));
}
