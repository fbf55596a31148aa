//! HTTP-level tests for the admin submission views and document exports.

mod common;

use std::io::{Cursor, Read};

use axum::http::StatusCode;
use common::{
    body_bytes, body_json, build_test_app, client_token, create, create_project, create_unit,
    get_auth, post_json_auth, put_json_auth,
};
use serde_json::json;
use sqlx::PgPool;

struct Fixture {
    token: String,
    project_id: i64,
    submitted_unit: i64,
    draft_unit: i64,
}

/// Two units with a purchaser each: one submitted, one left as a draft.
async fn seed(pool: &PgPool) -> Fixture {
    let token = common::admin_token(pool).await;
    let project_id = create_project(pool, &token, "Harbour View").await;
    let base = format!("/api/v1/projects/{project_id}");

    let (submitted_unit, _, _) = create_unit(pool, &token, project_id, "12B", None).await;
    let (draft_unit, _, _) = create_unit(pool, &token, project_id, "14", None).await;

    let client = create(pool, &token, &format!("{base}/clients"), json!({ "name": "Aroha Smith" })).await;
    create(
        pool,
        &token,
        &format!("{base}/clients/{}/units", client["id"]),
        json!({ "unit_id": submitted_unit }),
    )
    .await;

    let scheme = create(
        pool,
        &token,
        &format!("{base}/color-schemes"),
        json!({
            "name": "Coastal",
            "materials": {
                "paint": { "value": "Alabaster" },
                "kitchen_benchtop": { "value": "White Quartz" }
            }
        }),
    )
    .await;
    let light = create(
        pool,
        &token,
        &format!("{base}/upgrade-options"),
        json!({ "name": "Pendant Light", "category": "Electrical", "price": 350.0, "max_quantity": 4 }),
    )
    .await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/portal/submit",
        &client_token(submitted_unit, None),
        json!({
            "color_scheme_id": scheme["id"],
            "upgrades": [{
                "upgrade_option_id": light["id"],
                "quantity": 1,
                "points": [{ "x": 0.4, "y": 0.6, "label": "Dining" }]
            }]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = put_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/portal/selection",
        &client_token(draft_unit, None),
        json!({ "current_step": 1, "color_scheme_id": scheme["id"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    Fixture {
        token,
        project_id,
        submitted_unit,
        draft_unit,
    }
}

async fn submission_id_for(pool: &PgPool, fx: &Fixture, unit_id: i64) -> i64 {
    let response = get_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/projects/{}/submissions", fx.project_id),
        &fx.token,
    )
    .await;
    let json = body_json(response).await;
    json["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["unit_id"] == unit_id)
        .and_then(|s| s["id"].as_i64())
        .expect("submission for unit")
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_submissions_with_status_filter(pool: PgPool) {
    let fx = seed(&pool).await;
    let base = format!("/api/v1/projects/{}/submissions", fx.project_id);

    let response = get_auth(build_test_app(pool.clone()), &base, &fx.token).await;
    let json = body_json(response).await;
    let items = json["data"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    let draft = items.iter().find(|s| s["unit_id"] == fx.draft_unit).unwrap();
    assert_eq!(draft["status"], "draft");
    assert!(draft["submitted_at"].is_null());

    let response = get_auth(build_test_app(pool.clone()), &format!("{base}?status=submitted"), &fx.token).await;
    let json = body_json(response).await;
    let items = json["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["unit_number"], "12B");
    assert_eq!(items[0]["client_name"], "Aroha Smith");
    assert_eq!(items[0]["total_incl_gst"].as_f64().unwrap(), 402.5);

    let response = get_auth(build_test_app(pool), &format!("{base}?status=archived"), &fx.token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_submission_detail(pool: PgPool) {
    let fx = seed(&pool).await;
    let id = submission_id_for(&pool, &fx, fx.submitted_unit).await;

    let response = get_auth(
        build_test_app(pool),
        &format!("/api/v1/projects/{}/submissions/{id}", fx.project_id),
        &fx.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "submitted");
    assert_eq!(json["data"]["color_scheme_name"], "Coastal");
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_summary_and_floor_plan_pdfs(pool: PgPool) {
    let fx = seed(&pool).await;
    let id = submission_id_for(&pool, &fx, fx.submitted_unit).await;
    let base = format!("/api/v1/projects/{}/submissions/{id}", fx.project_id);

    let response = get_auth(build_test_app(pool.clone()), &format!("{base}/pdf"), &fx.token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/pdf");
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"unit-12b-summary.pdf\""
    );
    let pdf = body_bytes(response).await;
    assert!(pdf.starts_with(b"%PDF-"));
    assert!(pdf.ends_with(b"%%EOF\n"));

    let response = get_auth(build_test_app(pool), &format!("{base}/floor-plan.pdf"), &fx.token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"unit-12b-floor-plan.pdf\""
    );
    assert!(body_bytes(response).await.starts_with(b"%PDF-"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_pdf_for_other_project_is_404(pool: PgPool) {
    let fx = seed(&pool).await;
    let id = submission_id_for(&pool, &fx, fx.submitted_unit).await;
    let other = create_project(&pool, &fx.token, "Elsewhere").await;

    let response = get_auth(
        build_test_app(pool),
        &format!("/api/v1/projects/{other}/submissions/{id}/pdf"),
        &fx.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_zip_export_contains_submitted_only(pool: PgPool) {
    let fx = seed(&pool).await;

    let response = get_auth(
        build_test_app(pool),
        &format!("/api/v1/projects/{}/submissions/export.zip", fx.project_id),
        &fx.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/zip");
    let bytes = body_bytes(response).await;

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(
        names,
        vec!["unit-12b-floor-plan.pdf".to_string(), "unit-12b-summary.pdf".to_string()]
    );

    let mut summary = Vec::new();
    archive
        .by_name("unit-12b-summary.pdf")
        .expect("summary entry")
        .read_to_end(&mut summary)
        .expect("readable entry");
    assert!(summary.starts_with(b"%PDF-"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_zip_export_keeps_similar_unit_numbers_apart(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let project_id = create_project(&pool, &token, "Twin Towers").await;
    let scheme = create(
        &pool,
        &token,
        &format!("/api/v1/projects/{project_id}/color-schemes"),
        json!({ "name": "Coastal", "materials": { "paint": { "value": "Alabaster" } } }),
    )
    .await;

    let (upper, _, _) = create_unit(&pool, &token, project_id, "A1", None).await;
    let (lower, _, _) = create_unit(&pool, &token, project_id, "a1", None).await;
    for unit_id in [upper, lower] {
        let response = post_json_auth(
            build_test_app(pool.clone()),
            "/api/v1/portal/submit",
            &client_token(unit_id, None),
            json!({ "color_scheme_id": scheme["id"], "upgrades": [] }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = get_auth(
        build_test_app(pool),
        &format!("/api/v1/projects/{project_id}/submissions/export.zip"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let archive = zip::ZipArchive::new(Cursor::new(body_bytes(response).await)).expect("valid zip");
    assert_eq!(archive.len(), 4);
    let names: Vec<&str> = archive.file_names().collect();
    assert!(names.contains(&"unit-a1-summary.pdf"));
    // Which unit keeps the plain name depends on collation order.
    let suffixed = [upper, lower].map(|id| format!("unit-a1-{id}-summary.pdf"));
    assert_eq!(suffixed.iter().filter(|n| names.contains(&n.as_str())).count(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_zip_export_empty_project(pool: PgPool) {
    let token = common::admin_token(&pool).await;
    let project_id = create_project(&pool, &token, "Quiet").await;

    let response = get_auth(
        build_test_app(pool),
        &format!("/api/v1/projects/{project_id}/submissions/export.zip"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let archive = zip::ZipArchive::new(Cursor::new(body_bytes(response).await)).expect("valid zip");
    assert_eq!(archive.len(), 0);
}
