//! Integration tests for submission upsert and freezing.

use fitout_core::status::SubmissionStatus;
use fitout_db::models::project::CreateProject;
use fitout_db::models::submission::SubmissionSnapshot;
use fitout_db::models::unit::NewUnit;
use fitout_db::repositories::{ProjectRepo, SubmissionRepo, UnitRepo};
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;

async fn seed_unit(pool: &PgPool) -> (i64, i64, String) {
    let project = ProjectRepo::create(
        pool,
        &CreateProject {
            name: "Submissions".to_string(),
            development_company: None,
            address: None,
            description: None,
        },
    )
    .await
    .unwrap();
    let unit = UnitRepo::create(
        pool,
        &NewUnit {
            project_id: project.id,
            unit_type_id: None,
            unit_number: "12".to_string(),
            status: "active".to_string(),
            username: "submissions-12".to_string(),
            password_hash: "hash".to_string(),
            portal_token: "portal-token-12".to_string(),
        },
    )
    .await
    .unwrap();
    (project.id, unit.id, unit.portal_token)
}

fn snapshot(token: &str, unit_id: i64, step: i16, total_cents: i64) -> SubmissionSnapshot {
    let subtotal = Decimal::new(total_cents, 2);
    let gst = subtotal * Decimal::new(15, 2);
    SubmissionSnapshot {
        token: token.to_string(),
        unit_id,
        client_id: None,
        color_scheme_id: None,
        color_scheme_name: Some("Coastal".to_string()),
        selected_upgrades: json!([]),
        upgrade_total: subtotal,
        gst,
        total_incl_gst: subtotal + gst,
        current_step: step,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_draft_upsert_updates_in_place(pool: PgPool) {
    let (project_id, unit_id, token) = seed_unit(&pool).await;

    let first = SubmissionRepo::upsert_draft(&pool, &snapshot(&token, unit_id, 1, 0))
        .await
        .unwrap()
        .expect("draft written");
    let second = SubmissionRepo::upsert_draft(&pool, &snapshot(&token, unit_id, 2, 10_000))
        .await
        .unwrap()
        .expect("draft overwritten");

    assert_eq!(first.id, second.id);
    assert_eq!(second.current_step, 2);
    assert_eq!(second.status, "draft");
    assert!(second.submitted_at.is_none());

    let listed = SubmissionRepo::list_by_project(&pool, project_id, None, 50, 0)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].unit_number, "12");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_gst_stored_without_rounding(pool: PgPool) {
    let (_, unit_id, token) = seed_unit(&pool).await;

    // 0.15 * 10.01 = 1.5015
    let saved = SubmissionRepo::upsert_draft(&pool, &snapshot(&token, unit_id, 2, 1_001))
        .await
        .unwrap()
        .expect("draft written");
    assert_eq!(saved.gst, Decimal::new(15_015, 4));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submitted_row_is_frozen(pool: PgPool) {
    let (project_id, unit_id, token) = seed_unit(&pool).await;
    SubmissionRepo::upsert_draft(&pool, &snapshot(&token, unit_id, 4, 5_000))
        .await
        .unwrap();

    let submitted = SubmissionRepo::submit(&pool, &snapshot(&token, unit_id, 5, 5_000))
        .await
        .unwrap()
        .expect("submitted");
    assert_eq!(submitted.status, "submitted");
    assert!(submitted.submitted_at.is_some());

    let draft_again = SubmissionRepo::upsert_draft(&pool, &snapshot(&token, unit_id, 2, 0))
        .await
        .unwrap();
    assert!(draft_again.is_none());
    let resubmit = SubmissionRepo::submit(&pool, &snapshot(&token, unit_id, 5, 1))
        .await
        .unwrap();
    assert!(resubmit.is_none());

    let stored = SubmissionRepo::find_by_token(&pool, &token)
        .await
        .unwrap()
        .expect("row kept");
    assert_eq!(stored.upgrade_total, Decimal::new(5_000, 2));

    let exported = SubmissionRepo::list_submitted_by_project(&pool, project_id)
        .await
        .unwrap();
    assert_eq!(exported.len(), 1);

    let drafts = SubmissionRepo::list_by_project(
        &pool,
        project_id,
        Some(SubmissionStatus::Draft),
        50,
        0,
    )
    .await
    .unwrap();
    assert!(drafts.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_by_id_scoped_to_project(pool: PgPool) {
    let (project_id, unit_id, token) = seed_unit(&pool).await;
    let saved = SubmissionRepo::upsert_draft(&pool, &snapshot(&token, unit_id, 1, 0))
        .await
        .unwrap()
        .expect("draft written");

    assert!(SubmissionRepo::find_by_id(&pool, project_id, saved.id).await.unwrap().is_some());
    assert!(SubmissionRepo::find_by_id(&pool, project_id + 1, saved.id).await.unwrap().is_none());
}
