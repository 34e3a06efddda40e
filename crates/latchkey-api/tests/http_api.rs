//! Integration tests for the HTTP auth endpoints against a mock backend.

use std::sync::Arc;

use latchkey_api::{ApiClient, ApiConfig, HttpAuthApi};
use latchkey_protocol::{Credentials, SignUpFields};
use latchkey_session::{AuthApi, SessionConfig, SessionController, SessionError};
use latchkey_store::WebStore;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =========================================================================
// Helpers
// =========================================================================

fn api_for(server: &MockServer) -> HttpAuthApi {
    let client = ApiClient::new(&ApiConfig::new(server.uri())).unwrap();
    HttpAuthApi::new(client)
}

fn credentials() -> Credentials {
    Credentials::new("a@b.com", "pw")
}

// =========================================================================
// Login
// =========================================================================

#[tokio::test]
async fn test_login_success_returns_token_and_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"email": "a@b.com", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "t1",
            "user": {"id": "1", "name": "Ada", "role": "staff"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = api_for(&server).login(&credentials()).await.unwrap();

    assert_eq!(response.token.as_str(), "t1");
    assert_eq!(response.user.name, "Ada");
    assert_eq!(response.user.extra["role"], "staff");
}

#[tokio::test]
async fn test_login_401_with_message_is_rejected_with_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"message": "Invalid email or password"})),
        )
        .mount(&server)
        .await;

    let err = api_for(&server).login(&credentials()).await.unwrap_err();

    match err {
        SessionError::Rejected { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message.as_deref(), Some("Invalid email or password"));
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_login_500_plain_text_is_rejected_without_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let err = api_for(&server).login(&credentials()).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(err.user_message("generic"), "generic");
}

#[tokio::test]
async fn test_login_malformed_success_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": {"id": "1"}})))
        .mount(&server)
        .await;

    let err = api_for(&server).login(&credentials()).await.unwrap_err();

    assert!(matches!(err, SessionError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_login_unusable_token_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "two words",
            "user": {"id": "1"}
        })))
        .mount(&server)
        .await;

    let err = api_for(&server).login(&credentials()).await.unwrap_err();

    assert!(matches!(err, SessionError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_login_unreachable_server_is_network_error() {
    // Port 1 is reserved and nothing listens on it.
    let client = ApiClient::new(&ApiConfig::new("http://127.0.0.1:1")).unwrap();
    let api = HttpAuthApi::new(client);

    let err = api.login(&credentials()).await.unwrap_err();

    assert!(matches!(err, SessionError::Network(_)));
}

// =========================================================================
// Sign-up and logout
// =========================================================================

#[tokio::test]
async fn test_sign_up_posts_fields_including_extras() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/signup"))
        .and(body_json(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "hunter2",
            "vehicle": "EV"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "token": "fresh",
            "user": {"id": 7, "name": "Ada"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fields: SignUpFields = serde_json::from_value(json!({
        "name": "Ada",
        "email": "ada@example.com",
        "password": "hunter2",
        "vehicle": "EV"
    }))
    .unwrap();

    let response = api_for(&server).sign_up(&fields).await.unwrap();

    assert_eq!(response.token.as_str(), "fresh");
    assert_eq!(response.user.id, "7");
}

#[tokio::test]
async fn test_logout_error_status_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = api_for(&server).logout().await.unwrap_err();

    assert_eq!(err.status(), Some(503));
}

// =========================================================================
// Controller + real client: the header follows the session
// =========================================================================

#[tokio::test]
async fn test_controller_sign_in_then_logout_carries_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "t1",
            "user": {"id": "1"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(&ApiConfig::new(server.uri())).unwrap();
    let controller = Arc::new(SessionController::new(
        WebStore::new(),
        HttpAuthApi::new(client.clone()),
        client.clone(),
        SessionConfig::default(),
    ));
    let ctx = controller.context();
    controller.hydrate().await;

    ctx.sign_in("a@b.com", "pw").await.unwrap();
    assert_eq!(client.auth_header().unwrap().to_str().unwrap(), "Bearer t1");

    ctx.sign_out().await;
    assert!(client.auth_header().is_none());
    assert!(ctx.session().is_none());
}

#[tokio::test]
async fn test_controller_sign_in_401_sets_error_from_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Account locked"})),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(&ApiConfig::new(server.uri())).unwrap();
    let controller = Arc::new(SessionController::new(
        WebStore::new(),
        HttpAuthApi::new(client.clone()),
        client.clone(),
        SessionConfig::default(),
    ));
    controller.hydrate().await;

    let result = controller.sign_in("a@b.com", "pw").await;

    assert!(result.is_err());
    assert_eq!(controller.snapshot().error.as_deref(), Some("Account locked"));
    assert!(client.auth_header().is_none());
}
