//! Admin and unit login, invitation acceptance, and role enforcement.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{
    body_json, build_test_app, client_token, create, create_admin, create_project, create_unit,
    get, get_auth, post_json, post_json_auth, put_json_auth, ADMIN_PASSWORD,
};
use fitout_db::repositories::InvitationRepo;
use serde_json::json;
use sqlx::PgPool;

async fn client_login(pool: &PgPool, username: &str, password: &str) -> axum::http::Response<axum::body::Body> {
    post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/client/login",
        json!({ "username": username, "password": password }),
    )
    .await
}

// ---------------------------------------------------------------------------
// Admin login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_login_success(pool: PgPool) {
    let admin = create_admin(&pool, "sales@example.com").await;
    let app = build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/auth/admin/login",
        json!({ "email": "sales@example.com", "password": ADMIN_PASSWORD }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert_eq!(json["token_type"], "Bearer");
    assert_eq!(json["expires_in"], 15 * 60);
    assert_eq!(json["user"]["id"], admin.id);
    assert_eq!(json["user"]["role"], "admin");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_login_wrong_password(pool: PgPool) {
    create_admin(&pool, "sales@example.com").await;
    let app = build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/auth/admin/login",
        json!({ "email": "sales@example.com", "password": "not-the-password" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_login_unknown_email(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/admin/login",
        json!({ "email": "ghost@example.com", "password": "whatever" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Role enforcement
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_routes_require_token(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(app, "/api/v1/projects").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_client_token_cannot_reach_admin_routes(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let project_id = create_project(&pool, &token, "Harbour View").await;
    let (unit_id, _, _) = create_unit(&pool, &token, project_id, "1A", None).await;

    let app = build_test_app(pool);
    let response = get_auth(app, "/api/v1/projects", &client_token(unit_id, None)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_token_cannot_reach_portal(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let app = build_test_app(pool);
    let response = get_auth(app, "/api/v1/portal/unit", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_garbage_token_is_rejected(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get_auth(app, "/api/v1/auth/me", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Unit login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unit_login_with_generated_credentials(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let project_id = create_project(&pool, &token, "Harbour View").await;
    let (unit_id, username, password) = create_unit(&pool, &token, project_id, "12B", None).await;

    assert_eq!(username, "harbour-view-12b");
    assert_eq!(password.len(), 12);

    let response = client_login(&pool, &username, &password).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["role"], "client");
    assert_eq!(json["user"]["id"], unit_id);
    assert_eq!(json["user"]["project_id"], project_id);

    let access = json["access_token"].as_str().unwrap().to_string();
    let me = get_auth(build_test_app(pool), "/api/v1/auth/me", &access).await;
    assert_eq!(me.status(), StatusCode::OK);
    let me = body_json(me).await;
    assert_eq!(me["data"]["name"], "12B");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unit_password_never_serialized(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let project_id = create_project(&pool, &token, "Harbour View").await;
    let (unit_id, _, _) = create_unit(&pool, &token, project_id, "3", None).await;

    let response = get_auth(
        build_test_app(pool),
        &format!("/api/v1/projects/{project_id}/units/{unit_id}"),
        &token,
    )
    .await;
    let json = body_json(response).await;
    assert!(json["data"].get("password_hash").is_none());
    assert!(json["data"].get("portal_token").is_none());
    assert!(json["data"].get("password").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_credential_reset_invalidates_old_password(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let project_id = create_project(&pool, &token, "Harbour View").await;
    let (unit_id, username, old_password) = create_unit(&pool, &token, project_id, "4", None).await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/projects/{project_id}/units/{unit_id}/credentials"),
        &token,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let new_password = json["data"]["password"].as_str().unwrap().to_string();
    assert_ne!(new_password, old_password);

    let old = client_login(&pool, &username, &old_password).await;
    assert_eq!(old.status(), StatusCode::UNAUTHORIZED);
    let new = client_login(&pool, &username, &new_password).await;
    assert_eq!(new.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_inactive_unit_cannot_log_in(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let project_id = create_project(&pool, &token, "Harbour View").await;
    let (unit_id, username, password) = create_unit(&pool, &token, project_id, "5", None).await;

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/projects/{project_id}/units/{unit_id}"),
        &token,
        json!({ "status": "inactive" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client_login(&pool, &username, &password).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Invitations
// ---------------------------------------------------------------------------

async fn invite(pool: &PgPool, token: &str) -> (i64, i64, i64, serde_json::Value) {
    let project_id = create_project(pool, token, "Harbour View").await;
    let (unit_id, _, _) = create_unit(pool, token, project_id, "7", None).await;
    let client = create(
        pool,
        token,
        &format!("/api/v1/projects/{project_id}/clients"),
        json!({ "name": "Aroha Smith", "email": "aroha@example.com" }),
    )
    .await;
    let client_id = client["id"].as_i64().unwrap();
    let invitation = create(
        pool,
        token,
        &format!("/api/v1/projects/{project_id}/invitations"),
        json!({ "client_id": client_id, "unit_id": unit_id }),
    )
    .await;
    (project_id, unit_id, client_id, invitation)
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_accept_invitation_issues_client_session(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let (_, unit_id, client_id, invitation) = invite(&pool, &token).await;
    assert_eq!(invitation["state"], "pending");

    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/invitations/accept",
        json!({ "token": invitation["token"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["id"], unit_id);
    assert_eq!(json["user"]["client_id"], client_id);

    let stored = InvitationRepo::find_by_token(&pool, invitation["token"].as_str().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert!(stored.accepted_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_revoked_invitation_is_forbidden(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let (project_id, _, _, invitation) = invite(&pool, &token).await;
    let id = invitation["id"].as_i64().unwrap();

    let response = common::delete_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/projects/{project_id}/invitations/{id}"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(
        build_test_app(pool),
        "/api/v1/invitations/accept",
        json!({ "token": invitation["token"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_expired_invitation_is_forbidden(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let (_, unit_id, client_id, _) = invite(&pool, &token).await;

    let expired = InvitationRepo::create(
        &pool,
        client_id,
        unit_id,
        "expired-token-0000000000000000000000000000000000",
        Utc::now() - Duration::days(1),
    )
    .await
    .unwrap();

    let response = post_json(
        build_test_app(pool),
        "/api/v1/invitations/accept",
        json!({ "token": expired.token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_accepted_invitation_stops_working_after_expiry(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let (_, _, _, invitation) = invite(&pool, &token).await;
    let body = json!({ "token": invitation["token"] });

    for _ in 0..2 {
        let response = post_json(
            build_test_app(pool.clone()),
            "/api/v1/invitations/accept",
            body.clone(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK, "reusable while unexpired");
    }

    sqlx::query("UPDATE invitations SET expires_at = NOW() - INTERVAL '1 minute' WHERE id = $1")
        .bind(invitation["id"].as_i64().unwrap())
        .execute(&pool)
        .await
        .unwrap();

    let response = post_json(build_test_app(pool), "/api/v1/invitations/accept", body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_invitation_token(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(app, "/api/v1/invitations/accept", json!({ "token": "nope" })).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invitation_expiry_is_bounded(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let (project_id, unit_id, client_id, _) = invite(&pool, &token).await;

    let response = post_json_auth(
        build_test_app(pool),
        &format!("/api/v1/projects/{project_id}/invitations"),
        &token,
        json!({ "client_id": client_id, "unit_id": unit_id, "expires_in_days": 0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
