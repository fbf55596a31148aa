//! HTTP-level tests for the client portal wizard and submission.

mod common;

use axum::http::StatusCode;
use common::{
    body_bytes, body_json, build_test_app, client_token, create, create_project, create_unit,
    delete_auth, get_auth, post_json_auth, put_json_auth,
};
use serde_json::{json, Value};
use sqlx::PgPool;

/// A project with one unit type, one unit of that type, a scheme and
/// three upgrades (one electrical).
struct Fixture {
    admin_token: String,
    project_id: i64,
    one_bed_id: i64,
    unit_id: i64,
    scheme_id: i64,
    heat_pump_id: i64,
    downlight_id: i64,
    other_type_upgrade_id: i64,
}

async fn seed(pool: &PgPool) -> Fixture {
    let token = common::admin_token(pool).await;
    let project_id = create_project(pool, &token, "Harbour View").await;
    let base = format!("/api/v1/projects/{project_id}");

    let one_bed = create(pool, &token, &format!("{base}/unit-types"), json!({ "name": "One Bed" })).await;
    let two_bed = create(pool, &token, &format!("{base}/unit-types"), json!({ "name": "Two Bed" })).await;
    let one_bed_id = one_bed["id"].as_i64().unwrap();

    let (unit_id, _, _) = create_unit(pool, &token, project_id, "12B", Some(one_bed_id)).await;

    let scheme = create(
        pool,
        &token,
        &format!("{base}/color-schemes"),
        json!({ "name": "Coastal", "materials": { "paint": { "value": "Alabaster" } } }),
    )
    .await;

    let upgrades = format!("{base}/upgrade-options");
    let heat_pump = create(
        pool,
        &token,
        &upgrades,
        json!({ "name": "Heat Pump", "category": "Climate", "price": 2500.0, "max_quantity": 2 }),
    )
    .await;
    let downlight = create(
        pool,
        &token,
        &upgrades,
        json!({
            "name": "Downlight",
            "category": "Lighting",
            "price": 120.0,
            "max_quantity": 10,
            "unit_type_ids": [one_bed_id]
        }),
    )
    .await;
    let other = create(
        pool,
        &token,
        &upgrades,
        json!({
            "name": "Second Bathroom Fan",
            "category": "Ventilation",
            "price": 300.0,
            "unit_type_ids": [two_bed["id"]]
        }),
    )
    .await;

    Fixture {
        admin_token: token,
        project_id,
        one_bed_id,
        unit_id,
        scheme_id: scheme["id"].as_i64().unwrap(),
        heat_pump_id: heat_pump["id"].as_i64().unwrap(),
        downlight_id: downlight["id"].as_i64().unwrap(),
        other_type_upgrade_id: other["id"].as_i64().unwrap(),
    }
}

fn f(value: &Value) -> f64 {
    value.as_f64().expect("numeric value")
}

// ---------------------------------------------------------------------------
// Unit and options
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_portal_unit_and_filtered_options(pool: PgPool) {
    let fx = seed(&pool).await;
    let token = client_token(fx.unit_id, None);

    let response = get_auth(build_test_app(pool.clone()), "/api/v1/portal/unit", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["unit"]["unit_number"], "12B");
    assert_eq!(json["data"]["unit_type"]["name"], "One Bed");
    assert_eq!(json["data"]["project"]["name"], "Harbour View");

    let response = get_auth(build_test_app(pool), "/api/v1/portal/options", &token).await;
    let json = body_json(response).await;
    let ids: Vec<i64> = json["data"]["upgrade_options"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["id"].as_i64().unwrap())
        .collect();
    assert!(ids.contains(&fx.heat_pump_id), "unlinked upgrades apply to every type");
    assert!(ids.contains(&fx.downlight_id));
    assert!(!ids.contains(&fx.other_type_upgrade_id));
    assert_eq!(json["data"]["color_schemes"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_empty_selection_starts_at_step_one(pool: PgPool) {
    let fx = seed(&pool).await;
    let token = client_token(fx.unit_id, None);

    let response = get_auth(build_test_app(pool), "/api/v1/portal/selection", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "draft");
    assert_eq!(json["data"]["current_step"], 1);
    assert_eq!(json["data"]["step_label"], "Colour Scheme");
    assert_eq!(f(&json["data"]["summary"]["total"]), 0.0);
}

// ---------------------------------------------------------------------------
// Wizard navigation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_advance_requires_colour_scheme(pool: PgPool) {
    let fx = seed(&pool).await;
    let token = client_token(fx.unit_id, None);

    let response = post_json_auth(
        build_test_app(pool),
        "/api/v1/portal/wizard/advance",
        &token,
        json!({ "current_step": 1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_advance_skips_floor_plan_without_electrical(pool: PgPool) {
    let fx = seed(&pool).await;
    let token = client_token(fx.unit_id, None);

    let response = post_json_auth(
        build_test_app(pool),
        "/api/v1/portal/wizard/advance",
        &token,
        json!({
            "current_step": 2,
            "selection": {
                "color_scheme_id": fx.scheme_id,
                "upgrades": [{ "upgrade_option_id": fx.heat_pump_id, "quantity": 2 }]
            }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["next_step"], 4);
    assert_eq!(json["data"]["requires_floor_plan"], false);
    assert_eq!(f(&json["data"]["summary"]["subtotal"]), 5000.0);
    assert_eq!(f(&json["data"]["summary"]["gst"]), 750.0);
    assert_eq!(f(&json["data"]["summary"]["total"]), 5750.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_advance_visits_floor_plan_for_lighting(pool: PgPool) {
    let fx = seed(&pool).await;
    let token = client_token(fx.unit_id, None);
    let selection = json!({
        "color_scheme_id": fx.scheme_id,
        "upgrades": [{ "upgrade_option_id": fx.downlight_id, "quantity": 2 }]
    });

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/portal/wizard/advance",
        &token,
        json!({ "current_step": 2, "selection": selection }),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["next_step"], 3);
    assert_eq!(json["data"]["requires_floor_plan"], true);

    // Placement step refuses to advance until every light is placed.
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/portal/wizard/advance",
        &token,
        json!({ "current_step": 3, "selection": selection }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        build_test_app(pool),
        "/api/v1/portal/wizard/back",
        &token,
        json!({ "current_step": 4, "selection": selection }),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["previous_step"], 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_quantity_above_maximum_rejected(pool: PgPool) {
    let fx = seed(&pool).await;
    let token = client_token(fx.unit_id, None);

    let response = post_json_auth(
        build_test_app(pool),
        "/api/v1/portal/wizard/advance",
        &token,
        json!({
            "current_step": 2,
            "selection": {
                "color_scheme_id": fx.scheme_id,
                "upgrades": [{ "upgrade_option_id": fx.heat_pump_id, "quantity": 3 }]
            }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upgrade_for_other_unit_type_rejected(pool: PgPool) {
    let fx = seed(&pool).await;
    let token = client_token(fx.unit_id, None);

    let response = post_json_auth(
        build_test_app(pool),
        "/api/v1/portal/wizard/advance",
        &token,
        json!({
            "current_step": 2,
            "selection": {
                "color_scheme_id": fx.scheme_id,
                "upgrades": [{ "upgrade_option_id": fx.other_type_upgrade_id, "quantity": 1 }]
            }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Drafts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_draft_save_and_reload(pool: PgPool) {
    let fx = seed(&pool).await;
    let token = client_token(fx.unit_id, None);

    let response = put_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/portal/selection",
        &token,
        json!({ "current_step": 2, "color_scheme_id": fx.scheme_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = put_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/portal/selection",
        &token,
        json!({
            "current_step": 2,
            "color_scheme_id": fx.scheme_id,
            "upgrades": [{ "upgrade_option_id": fx.heat_pump_id, "quantity": 1 }]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(build_test_app(pool), "/api/v1/portal/selection", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "draft");
    assert_eq!(json["data"]["current_step"], 2);
    assert_eq!(json["data"]["can_advance"], true);
    assert_eq!(json["data"]["color_scheme_name"], "Coastal");
    assert_eq!(json["data"]["upgrades"][0]["name"], "Heat Pump");
    assert_eq!(f(&json["data"]["upgrades"][0]["price"]), 2500.0);
    assert_eq!(f(&json["data"]["summary"]["total"]), 2875.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_draft_save_checks_quantity_bounds(pool: PgPool) {
    let fx = seed(&pool).await;
    let token = client_token(fx.unit_id, None);

    for quantity in [9, -4, 0] {
        let response = put_json_auth(
            build_test_app(pool.clone()),
            "/api/v1/portal/selection",
            &token,
            json!({
                "current_step": 2,
                "color_scheme_id": fx.scheme_id,
                "upgrades": [{ "upgrade_option_id": fx.heat_pump_id, "quantity": quantity }]
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "quantity {quantity}");
    }

    // Going back does not bypass the bounds either.
    let response = put_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/portal/selection",
        &token,
        json!({
            "current_step": 1,
            "color_scheme_id": fx.scheme_id,
            "upgrades": [{ "upgrade_option_id": fx.heat_pump_id, "quantity": 9 }]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get_auth(build_test_app(pool), "/api/v1/portal/selection", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["current_step"], 1, "nothing was stored");
    assert_eq!(f(&json["data"]["summary"]["total"]), 0.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_draft_save_limits_points_to_quantity(pool: PgPool) {
    let fx = seed(&pool).await;
    let token = client_token(fx.unit_id, None);

    let save = |points: Value| {
        json!({
            "current_step": 3,
            "color_scheme_id": fx.scheme_id,
            "upgrades": [{ "upgrade_option_id": fx.downlight_id, "quantity": 2, "points": points }]
        })
    };

    let response = put_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/portal/selection",
        &token,
        json!({ "current_step": 1, "color_scheme_id": fx.scheme_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = put_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/portal/selection",
        &token,
        json!({
            "current_step": 2,
            "color_scheme_id": fx.scheme_id,
            "upgrades": [{ "upgrade_option_id": fx.downlight_id, "quantity": 2 }]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // A partly placed floor plan is a valid draft.
    let response = put_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/portal/selection",
        &token,
        save(json!([{ "x": 0.2, "y": 0.2 }])),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = put_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/portal/selection",
        &token,
        save(json!([{ "x": 0.2, "y": 0.2 }, { "x": 0.4, "y": 0.4 }, { "x": 0.6, "y": 0.6 }])),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json_auth(
        build_test_app(pool),
        "/api/v1/portal/selection",
        &token,
        json!({
            "current_step": 2,
            "color_scheme_id": fx.scheme_id,
            "upgrades": [{
                "upgrade_option_id": fx.heat_pump_id,
                "quantity": 1,
                "points": [{ "x": 0.5, "y": 0.5 }]
            }]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_draft_cannot_skip_incomplete_step(pool: PgPool) {
    let fx = seed(&pool).await;
    let token = client_token(fx.unit_id, None);

    // No scheme chosen yet, so step 1 is incomplete.
    let response = put_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/portal/selection",
        &token,
        json!({ "current_step": 2 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json_auth(
        build_test_app(pool),
        "/api/v1/portal/selection",
        &token,
        json!({ "current_step": 4, "color_scheme_id": fx.scheme_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_draft_cannot_confirm(pool: PgPool) {
    let fx = seed(&pool).await;
    let token = client_token(fx.unit_id, None);

    let response = put_json_auth(
        build_test_app(pool),
        "/api/v1/portal/selection",
        &token,
        json!({ "current_step": 5, "color_scheme_id": fx.scheme_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submit_requires_placements(pool: PgPool) {
    let fx = seed(&pool).await;
    let token = client_token(fx.unit_id, None);

    let response = post_json_auth(
        build_test_app(pool),
        "/api/v1/portal/submit",
        &token,
        json!({
            "color_scheme_id": fx.scheme_id,
            "upgrades": [{
                "upgrade_option_id": fx.downlight_id,
                "quantity": 2,
                "points": [{ "x": 0.25, "y": 0.5 }]
            }]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submit_freezes_selection(pool: PgPool) {
    let fx = seed(&pool).await;
    let token = client_token(fx.unit_id, None);
    let selection = json!({
        "color_scheme_id": fx.scheme_id,
        "upgrades": [
            { "upgrade_option_id": fx.heat_pump_id, "quantity": 1 },
            {
                "upgrade_option_id": fx.downlight_id,
                "quantity": 2,
                "points": [{ "x": 0.25, "y": 0.5 }, { "x": 0.75, "y": 0.5, "label": "Lounge" }]
            }
        ]
    });

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/portal/submit",
        &token,
        selection.clone(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "submitted");
    assert_eq!(json["data"]["current_step"], 5);
    assert!(json["data"]["submitted_at"].is_string());
    // 2500 + 2 * 120 = 2740, plus 15% GST.
    assert_eq!(f(&json["data"]["summary"]["subtotal"]), 2740.0);
    assert_eq!(f(&json["data"]["summary"]["total"]), 3151.0);

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/portal/submit",
        &token,
        selection,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = put_json_auth(
        build_test_app(pool),
        "/api/v1/portal/selection",
        &token,
        json!({ "current_step": 1, "color_scheme_id": fx.scheme_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_client_summary_pdf(pool: PgPool) {
    let fx = seed(&pool).await;
    let token = client_token(fx.unit_id, None);

    let response = get_auth(build_test_app(pool.clone()), "/api/v1/portal/submission/pdf", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    put_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/portal/selection",
        &token,
        json!({ "current_step": 1, "color_scheme_id": fx.scheme_id }),
    )
    .await;

    let response = get_auth(build_test_app(pool), "/api/v1/portal/submission/pdf", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/pdf");
    let disposition = response.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.contains("12b-summary.pdf"), "got {disposition}");
    assert!(body_bytes(response).await.starts_with(b"%PDF-"));
}

// ---------------------------------------------------------------------------
// Catalog changes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleted_colour_scheme_leaves_the_portal(pool: PgPool) {
    let fx = seed(&pool).await;
    let token = client_token(fx.unit_id, None);

    let response = put_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/portal/selection",
        &token,
        json!({ "current_step": 1, "color_scheme_id": fx.scheme_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["can_advance"], true);

    let response = delete_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/projects/{}/color-schemes/{}", fx.project_id, fx.scheme_id),
        &fx.admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(build_test_app(pool.clone()), "/api/v1/portal/options", &token).await;
    let json = body_json(response).await;
    assert!(json["data"]["color_schemes"].as_array().unwrap().is_empty());

    // The stored draft loses its scheme and must choose again.
    let response = get_auth(build_test_app(pool.clone()), "/api/v1/portal/selection", &token).await;
    let json = body_json(response).await;
    assert!(json["data"]["color_scheme_id"].is_null());
    assert_eq!(json["data"]["can_advance"], false);

    let response = post_json_auth(
        build_test_app(pool),
        "/api/v1/portal/wizard/advance",
        &token,
        json!({
            "current_step": 1,
            "selection": { "color_scheme_id": fx.scheme_id, "upgrades": [] }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleted_unit_type_does_not_widen_options(pool: PgPool) {
    let fx = seed(&pool).await;
    let token = client_token(fx.unit_id, None);

    let response = delete_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/projects/{}/unit-types/{}", fx.project_id, fx.one_bed_id),
        &fx.admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(build_test_app(pool), "/api/v1/portal/options", &token).await;
    let json = body_json(response).await;
    let ids: Vec<i64> = json["data"]["upgrade_options"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![fx.heat_pump_id]);
}
