use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::router::auth_routes;
use shared_config::AppConfig;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

fn create_test_app(config: AppConfig) -> Router {
    auth_routes(Arc::new(config))
}

fn test_config(mock_server: &MockServer) -> AppConfig {
    let mut config = TestConfig::default().to_app_config();
    config.supabase_url = mock_server.uri();
    config
}

async fn read_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn session_response() -> Value {
    json!({
        "access_token": "token-from-credential-service",
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "refresh",
        "user": { "id": "user-id", "email": "ada@example.com" }
    })
}

#[tokio::test]
async fn register_proxies_signup() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(test_config(&mock_server));

    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .and(body_partial_json(json!({
            "email": "ada@example.com",
            "data": { "role": "patient" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_response()))
        .mount(&mock_server)
        .await;

    let request = json_request(
        "/register",
        json!({
            "email": "ada@example.com",
            "password": "long-enough-password",
            "role": "patient",
        }),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_body(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(
        body["data"]["access_token"],
        json!("token-from-credential-service")
    );
}

#[tokio::test]
async fn register_duplicate_email_conflicts() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(test_config(&mock_server));

    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "msg": "User already registered"
        })))
        .mount(&mock_server)
        .await;

    let request = json_request(
        "/register",
        json!({
            "email": "ada@example.com",
            "password": "long-enough-password",
            "role": "patient",
        }),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn register_rejects_bad_role_locally() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(test_config(&mock_server));

    let request = json_request(
        "/register",
        json!({
            "email": "ada@example.com",
            "password": "long-enough-password",
            "role": "admin",
        }),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    // Nothing reached the credential service
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn login_maps_bad_credentials_to_401() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(test_config(&mock_server));

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant"
        })))
        .mount(&mock_server)
        .await;

    let request = json_request(
        "/login",
        json!({
            "email": "ada@example.com",
            "password": "wrong-password",
        }),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn validate_accepts_a_good_token() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server);
    let app = create_test_app(config.clone());

    let user = TestUser::patient("ada@example.com");
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));

    let request = Request::builder()
        .method("POST")
        .uri("/validate")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_body(response).await;
    assert_eq!(body["valid"], json!(true));
    assert_eq!(body["user_id"], json!(user.id));
}

#[tokio::test]
async fn validate_rejects_a_forged_token() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(test_config(&mock_server));

    let user = TestUser::patient("ada@example.com");
    let token = JwtTestUtils::create_invalid_signature_token(&user);

    let request = Request::builder()
        .method("POST")
        .uri("/validate")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
