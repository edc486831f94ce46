use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};

use homeswap_api::router::build_router;
use homeswap_api::state::AppState;

use crate::helpers::TEST_SECRET;

/// Router over a disconnected database: only paths that fail before touching
/// storage are exercised here.
fn server() -> TestServer {
    let state = AppState {
        db: DatabaseConnection::Disconnected,
        jwt_secret: TEST_SECRET.to_owned(),
        access_token_ttl_secs: 3_600,
    };
    TestServer::new(build_router(state)).unwrap()
}

#[tokio::test]
async fn should_report_liveness_with_request_id() {
    let response = server().get("/healthz").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.headers().get("x-request-id").is_some());
}

#[tokio::test]
async fn should_echo_caller_request_id() {
    let response = server()
        .get("/healthz")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("req-42"),
        )
        .await;
    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "req-42"
    );
}

#[tokio::test]
async fn should_report_not_ready_without_database() {
    let response = server().get("/readyz").await;
    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn should_reject_missing_bearer() {
    let response = server().get("/users/me").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["kind"], "MISSING_TOKEN");
}

#[tokio::test]
async fn should_guard_user_deletion() {
    let response = server()
        .delete("/users/0190a6b1-7c3e-7d8a-9e4f-123456789abc")
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["kind"], "MISSING_TOKEN");
}

#[tokio::test]
async fn should_reject_non_bearer_scheme() {
    let response = server()
        .post("/auth/logout")
        .add_header(
            HeaderName::from_static("authorization"),
            HeaderValue::from_static("Basic dXNlcjpwdw=="),
        )
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["kind"], "MISSING_TOKEN");
}

#[tokio::test]
async fn should_reject_forged_bearer() {
    let response = server()
        .patch("/auth/change-password")
        .authorization_bearer("not.a.jwt")
        .json(&json!({ "currentPassword": "a", "newPassword": "bbbbbb" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["kind"], "INVALID_TOKEN");
    assert_eq!(body["message"], "invalid or expired token");
}

#[tokio::test]
async fn should_validate_registration_form() {
    let server = server();

    let response = server
        .post("/auth/register")
        .json(&json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "not-an-email",
            "password": "password123",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["kind"], "VALIDATION");
    assert_eq!(body["message"], "email is invalid");

    let response = server
        .post("/auth/register")
        .json(&json!({
            "lastName": "Lovelace",
            "email": "ada@x.com",
            "password": "password123",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["message"], "firstName is required");

    let response = server
        .post("/auth/register")
        .json(&json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@x.com",
            "password": "abc",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn should_validate_otp_requests() {
    let server = server();

    let response = server
        .post("/auth/send-otp")
        .json(&json!({ "userId": "abc", "method": "email" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = server
        .post("/auth/resend-otp")
        .json(&json!({
            "userId": "0192f0c4-3c1e-7a3e-9b1a-1f2e3d4c5b6a",
            "method": "sms",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["message"], "method must be email or phone");

    let response = server
        .post("/auth/verify-otp")
        .json(&json!({
            "userId": "0192f0c4-3c1e-7a3e-9b1a-1f2e3d4c5b6a",
            "otp": "12a4",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["message"], "otp must be 4 digits");
}
