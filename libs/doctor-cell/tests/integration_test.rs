use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::router::doctor_routes;
use shared_config::AppConfig;
use shared_utils::test_utils::{JwtTestUtils, MockStoreResponses, TestConfig, TestUser};

fn create_test_app(config: AppConfig) -> Router {
    doctor_routes(Arc::new(config))
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

fn request_with_token(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json");
    match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn create_body(availability: Value) -> Value {
    json!({
        "first_name": "Niamh",
        "last_name": "Kelly",
        "email": "niamh@example.com",
        "phone": "+353870000002",
        "specialization": "Dermatology",
        "qualification": "MB BCh BAO",
        "consultation_fee": 140.0,
        "availability": availability,
    })
}

#[tokio::test]
async fn create_doctor_success() {
    let mock_server = MockServer::start().await;
    let user = TestUser::doctor("niamh@example.com");
    let config = test_config(&mock_server);

    let app = create_test_app(config.clone());
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/next_sequence"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(1)))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreResponses::doctor_row(&Uuid::new_v4().to_string(), &user.id, Some(140.0))
        ])))
        .mount(&mock_server)
        .await;

    let availability = json!([
        { "day_of_week": 1, "start_time": "09:00:00", "end_time": "17:00:00" }
    ]);
    let request = request_with_token("POST", "/", &token, Some(create_body(availability)));
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_body(response).await;
    assert_eq!(body["data"]["doctor_number"], json!("DOC000001"));
}

#[tokio::test]
async fn create_doctor_rejects_inverted_window() {
    let mock_server = MockServer::start().await;
    let user = TestUser::doctor("niamh@example.com");
    let config = test_config(&mock_server);

    let app = create_test_app(config.clone());
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let availability = json!([
        { "day_of_week": 1, "start_time": "17:00:00", "end_time": "09:00:00" }
    ]);
    let request = request_with_token("POST", "/", &token, Some(create_body(availability)));
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_doctor_requires_doctor_role() {
    let mock_server = MockServer::start().await;
    let user = TestUser::patient("pat@example.com");
    let config = test_config(&mock_server);

    let app = create_test_app(config.clone());
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));

    let request = request_with_token("POST", "/", &token, Some(create_body(json!([]))));
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn any_authenticated_user_can_read_a_doctor() {
    let mock_server = MockServer::start().await;
    let user = TestUser::patient("pat@example.com");
    let config = test_config(&mock_server);

    let app = create_test_app(config.clone());
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));

    let doctor_id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::doctor_row(&doctor_id.to_string(), &Uuid::new_v4().to_string(), None)
        ])))
        .mount(&mock_server)
        .await;

    let request = request_with_token("GET", &format!("/{}", doctor_id), &token, None);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn search_clamps_limit_and_orders_by_last_name() {
    let mock_server = MockServer::start().await;
    let user = TestUser::patient("pat@example.com");
    let config = test_config(&mock_server);

    let app = create_test_app(config.clone());
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("is_verified", "eq.true"))
        .and(query_param("limit", "100"))
        .and(query_param("order", "last_name.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::doctor_row(&Uuid::new_v4().to_string(), &Uuid::new_v4().to_string(), None)
        ])))
        .mount(&mock_server)
        .await;

    let request = request_with_token(
        "GET",
        "/search?verified_only=true&limit=500",
        &token,
        None,
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_body(response).await;
    assert_eq!(body["total"], json!(1));
}

#[tokio::test]
async fn update_doctor_is_owner_only() {
    let mock_server = MockServer::start().await;
    let user = TestUser::doctor("other@example.com");
    let config = test_config(&mock_server);

    let app = create_test_app(config.clone());
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));

    let doctor_id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::doctor_row(&doctor_id.to_string(), &Uuid::new_v4().to_string(), None)
        ])))
        .mount(&mock_server)
        .await;

    let request = request_with_token(
        "PUT",
        &format!("/{}", doctor_id),
        &token,
        Some(json!({"consultation_fee": 90.0})),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn replace_availability_validates_days() {
    let mock_server = MockServer::start().await;
    let user = TestUser::doctor("niamh@example.com");
    let config = test_config(&mock_server);

    let app = create_test_app(config.clone());
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));

    let doctor_id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::doctor_row(&doctor_id.to_string(), &user.id, None)
        ])))
        .mount(&mock_server)
        .await;

    let request = request_with_token(
        "PUT",
        &format!("/{}/availability", doctor_id),
        &token,
        Some(json!({
            "availability": [
                { "day_of_week": 7, "start_time": "09:00:00", "end_time": "17:00:00" }
            ]
        })),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
