#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use fitout_api::auth::jwt::{generate_access_token, generate_client_token, JwtConfig};
use fitout_api::auth::password::hash_password;
use fitout_api::config::{ServerConfig, DEFAULT_MAX_UPLOAD_BYTES};
use fitout_api::router::build_app_router;
use fitout_api::state::AppState;
use fitout_db::models::admin_user::{AdminUser, CreateAdminUser};
use fitout_db::repositories::AdminUserRepo;

pub const ADMIN_PASSWORD: &str = "correct-horse-battery";

/// Build a test `ServerConfig` with safe defaults and a throwaway upload dir.
pub fn test_config() -> ServerConfig {
    let upload_dir = std::env::temp_dir().join(format!("fitout-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&upload_dir).expect("create test upload dir");
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        upload_dir,
        max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        invitation_expiry_days: 14,
        admin_bootstrap: None,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// The application router with the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Auth helpers
// ---------------------------------------------------------------------------

pub async fn create_admin(pool: &PgPool, email: &str) -> AdminUser {
    let input = CreateAdminUser {
        email: email.to_string(),
        name: "Test Admin".to_string(),
        password_hash: hash_password(ADMIN_PASSWORD).expect("hashing should succeed"),
    };
    AdminUserRepo::create(pool, &input)
        .await
        .expect("admin creation should succeed")
}

/// Seed an admin and return a signed admin token.
pub async fn admin_token(pool: &PgPool) -> String {
    let admin = create_admin(pool, "admin@example.com").await;
    generate_access_token(admin.id, &test_config().jwt).expect("token should sign")
}

pub fn client_token(unit_id: i64, client_id: Option<i64>) -> String {
    generate_client_token(unit_id, client_id, &test_config().jwt).expect("token should sign")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("request should complete")
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("valid request")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, empty_request(Method::GET, uri, None)).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, json_request(Method::POST, uri, None, body)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, empty_request(Method::GET, uri, Some(token))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, empty_request(Method::DELETE, uri, Some(token))).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, json_request(Method::POST, uri, Some(token), body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, json_request(Method::PUT, uri, Some(token), body)).await
}

/// Multipart upload of a single `file` field.
pub async fn upload_auth(
    app: Router,
    uri: &str,
    token: &str,
    filename: &str,
    bytes: &[u8],
) -> Response<Body> {
    let boundary = "fitout-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .expect("valid request");
    send(app, request).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

// ---------------------------------------------------------------------------
// Seed helpers (through the API, as an admin would)
// ---------------------------------------------------------------------------

/// POST and return `data` from a 201 response.
pub async fn create(pool: &PgPool, token: &str, uri: &str, body: serde_json::Value) -> serde_json::Value {
    let response = post_json_auth(build_test_app(pool.clone()), uri, token, body).await;
    let status = response.status();
    let json = body_json(response).await;
    assert_eq!(status, axum::http::StatusCode::CREATED, "unexpected response: {json}");
    json["data"].clone()
}

pub async fn create_project(pool: &PgPool, token: &str, name: &str) -> i64 {
    let data = create(pool, token, "/api/v1/projects", serde_json::json!({ "name": name })).await;
    data["id"].as_i64().expect("project id")
}

/// Create a unit and return `(unit_id, username, password)`.
pub async fn create_unit(
    pool: &PgPool,
    token: &str,
    project_id: i64,
    unit_number: &str,
    unit_type_id: Option<i64>,
) -> (i64, String, String) {
    let data = create(
        pool,
        token,
        &format!("/api/v1/projects/{project_id}/units"),
        serde_json::json!({ "unit_number": unit_number, "unit_type_id": unit_type_id }),
    )
    .await;
    (
        data["unit"]["id"].as_i64().expect("unit id"),
        data["username"].as_str().expect("username").to_string(),
        data["password"].as_str().expect("password").to_string(),
    )
}
