//! End-to-end tests: builder → platform store → controller → HTTP client.

use latchkey::api::Method;
use latchkey::prelude::*;
use std::sync::Arc;

use latchkey::store::{
    KeyValueStore, MemoryStorage, PlatformStore, SharedStorage, SyncStorage, WebStore,
};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =========================================================================
// Helpers
// =========================================================================

async fn mount_login(server: &MockServer, token: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": token,
            "user": {"id": "1", "name": "Ada", "memberSince": "2023"}
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn native_app(server: &MockServer, dir: &std::path::Path) -> Latchkey {
    Latchkey::builder()
        .platform(Platform::Native)
        .store_config(StoreConfig::new(dir))
        .base_url(server.uri())
        .build()
        .await
        .unwrap()
}

fn bearer(client: &ApiClient) -> Option<String> {
    client
        .auth_header()
        .map(|v| v.to_str().unwrap().to_string())
}

// =========================================================================
// Native platform
// =========================================================================

#[tokio::test]
async fn test_native_sign_in_survives_restart() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_login(&server, "t1", 1).await;

    let first = native_app(&server, dir.path()).await;
    let state = first.ready().await;
    assert_eq!(state.phase(), Phase::Anonymous);

    first.context().sign_in("a@b.com", "pw").await.unwrap();
    assert_eq!(bearer(first.api()).as_deref(), Some("Bearer t1"));
    assert!(dir.path().join("session_token.enc").exists());
    drop(first);

    // Restart: no login call this time (the mock expects exactly one).
    let second = native_app(&server, dir.path()).await;
    let state = second.ready().await;

    assert_eq!(state.phase(), Phase::Authenticated);
    assert_eq!(state.session.unwrap().as_str(), "t1");
    let user = state.user.unwrap();
    assert_eq!(user.name, "Ada");
    assert_eq!(user.member_since.as_deref(), Some("2023"));
    assert_eq!(bearer(second.api()).as_deref(), Some("Bearer t1"));
}

#[tokio::test]
async fn test_native_sign_out_survives_restart() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_login(&server, "t1", 1).await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let first = native_app(&server, dir.path()).await;
    first.ready().await;
    let session = first.context();
    session.sign_in("a@b.com", "pw").await.unwrap();
    session.sign_out().await;
    drop(session);
    drop(first);

    let second = native_app(&server, dir.path()).await;
    let state = second.ready().await;

    assert_eq!(state.phase(), Phase::Anonymous);
    assert_eq!(state.user, Some(UserProfile::guest()));
    assert!(bearer(second.api()).is_none());
}

#[tokio::test]
async fn test_app_requests_carry_session_header() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_login(&server, "t1", 1).await;
    Mock::given(method("GET"))
        .and(path("/bookings"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let app = native_app(&server, dir.path()).await;
    app.ready().await;
    app.context().sign_in("a@b.com", "pw").await.unwrap();

    let response = app
        .api()
        .request(Method::GET, "/bookings")
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_native_store_is_encrypted_at_rest() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_login(&server, "plain-token-value", 1).await;

    let app = native_app(&server, dir.path()).await;
    app.ready().await;
    app.context().sign_in("a@b.com", "pw").await.unwrap();

    let bytes = std::fs::read(dir.path().join("session_token.enc")).unwrap();
    let needle = b"plain-token-value";
    assert!(!bytes.windows(needle.len()).any(|w| w == needle));

    let profile = std::fs::read(dir.path().join("user_profile.enc")).unwrap();
    assert!(!profile.windows(3).any(|w| w == b"Ada"));
}

// =========================================================================
// Web platform
// =========================================================================

#[tokio::test]
async fn test_web_session_does_not_outlive_process() {
    let server = MockServer::start().await;
    mount_login(&server, "t1", 1).await;

    let first = Latchkey::builder()
        .platform(Platform::Web)
        .base_url(server.uri())
        .build()
        .await
        .unwrap();
    first.ready().await;
    first.context().sign_in("a@b.com", "pw").await.unwrap();
    assert!(first.context().snapshot().is_authenticated());
    drop(first);

    let second = Latchkey::builder()
        .platform(Platform::Web)
        .base_url(server.uri())
        .build()
        .await
        .unwrap();
    let state = second.ready().await;

    assert_eq!(state.phase(), Phase::Anonymous);
}

#[tokio::test]
async fn test_web_injected_storage_carries_session_across_builds() {
    let server = MockServer::start().await;
    mount_login(&server, "t1", 1).await;
    let area: SharedStorage = Arc::new(MemoryStorage::new());

    let first = Latchkey::builder()
        .platform(Platform::Web)
        .web_store(WebStore::with_backend(Arc::clone(&area)))
        .base_url(server.uri())
        .build()
        .await
        .unwrap();
    first.ready().await;
    first.context().sign_in("a@b.com", "pw").await.unwrap();
    assert_eq!(area.get_item("session_token").unwrap().as_deref(), Some("t1"));
    drop(first);

    // Same storage area, new app: a page reload in the same tab.
    let second = Latchkey::builder()
        .platform(Platform::Web)
        .web_store(WebStore::with_backend(Arc::clone(&area)))
        .base_url(server.uri())
        .build()
        .await
        .unwrap();
    let state = second.ready().await;

    assert_eq!(state.phase(), Phase::Authenticated);
    assert_eq!(bearer(second.api()).as_deref(), Some("Bearer t1"));
}

#[tokio::test]
async fn test_web_unavailable_storage_signs_in_without_persisting() {
    let server = MockServer::start().await;
    mount_login(&server, "t1", 1).await;

    let app = Latchkey::builder()
        .platform(Platform::Web)
        .web_store(WebStore::from_backend(None))
        .base_url(server.uri())
        .build()
        .await
        .unwrap();
    let state = app.ready().await;
    assert_eq!(state.phase(), Phase::Anonymous);

    let user = app.context().sign_in("a@b.com", "pw").await.unwrap();

    assert_eq!(user.name, "Ada");
    assert!(app.context().snapshot().is_authenticated());
    assert_eq!(bearer(app.api()).as_deref(), Some("Bearer t1"));
}

// =========================================================================
// Startup failures
// =========================================================================

#[tokio::test]
async fn test_build_with_invalid_base_url_is_api_error() {
    let result = Latchkey::builder()
        .platform(Platform::Web)
        .base_url("not a url")
        .build()
        .await;

    assert!(matches!(result, Err(LatchkeyError::Api(_))));
}

#[tokio::test]
async fn test_build_with_corrupt_key_file_is_store_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("store.key"), b"too short").unwrap();

    let result = Latchkey::builder()
        .platform(Platform::Native)
        .store_config(StoreConfig::new(dir.path()))
        .build()
        .await;

    assert!(matches!(result, Err(LatchkeyError::Store(_))));
}

#[tokio::test]
async fn test_corrupt_stored_token_starts_anonymous_and_is_discarded() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    // Seed a sealed token, then damage it on disk.
    {
        let store = PlatformStore::open(
            Platform::Native,
            &StoreConfig::new(dir.path()),
        )
        .await
        .unwrap();
        store.set("session_token", Some("abc")).await.unwrap();
    }
    let file = dir.path().join("session_token.enc");
    let mut bytes = std::fs::read(&file).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    std::fs::write(&file, bytes).unwrap();

    let app = native_app(&server, dir.path()).await;
    let state = app.ready().await;

    assert_eq!(state.phase(), Phase::Anonymous);
    assert!(!file.exists());
}
