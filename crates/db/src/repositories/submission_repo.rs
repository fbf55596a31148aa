//! Repository for the `submissions` table.
//!
//! A unit has at most one submission, keyed by the unit's portal token.
//! Drafts are overwritten in place; once submitted, the row is frozen and
//! both writers below return `None`.

use fitout_core::status::SubmissionStatus;
use fitout_core::types::DbId;
use sqlx::PgPool;

use crate::models::submission::{Submission, SubmissionListItem, SubmissionSnapshot};

const COLUMNS: &str = "id, token, unit_id, client_id, color_scheme_id, color_scheme_name, \
    selected_upgrades, upgrade_total, gst, total_incl_gst, current_step, status, submitted_at, \
    created_at, updated_at";

const LIST_SELECT: &str = "SELECT s.id, s.unit_id, u.unit_number, s.client_id, c.name AS client_name, \
    s.color_scheme_name, s.upgrade_total, s.total_incl_gst, s.current_step, s.status, \
    s.submitted_at, s.updated_at \
    FROM submissions s \
    JOIN units u ON u.id = s.unit_id \
    LEFT JOIN clients c ON c.id = s.client_id";

pub struct SubmissionRepo;

impl SubmissionRepo {
    /// Insert or overwrite the draft for `snapshot.token`.
    pub async fn upsert_draft(
        pool: &PgPool,
        snapshot: &SubmissionSnapshot,
    ) -> Result<Option<Submission>, sqlx::Error> {
        upsert(pool, snapshot, SubmissionStatus::Draft).await
    }

    /// Write the final snapshot and mark it submitted.
    pub async fn submit(
        pool: &PgPool,
        snapshot: &SubmissionSnapshot,
    ) -> Result<Option<Submission>, sqlx::Error> {
        upsert(pool, snapshot, SubmissionStatus::Submitted).await
    }

    pub async fn find_by_token(pool: &PgPool, token: &str) -> Result<Option<Submission>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM submissions WHERE token = $1");
        sqlx::query_as::<_, Submission>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// Find a submission belonging to a unit of the project.
    pub async fn find_by_id(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<Submission>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM submissions
             WHERE id = $1 AND unit_id IN (SELECT id FROM units WHERE project_id = $2)"
        );
        sqlx::query_as::<_, Submission>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// Paginated listing, optionally filtered by status.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
        status: Option<SubmissionStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SubmissionListItem>, sqlx::Error> {
        let query = format!(
            "{LIST_SELECT}
             WHERE u.project_id = $1 AND ($2::TEXT IS NULL OR s.status = $2)
             ORDER BY s.updated_at DESC, s.id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, SubmissionListItem>(&query)
            .bind(project_id)
            .bind(status.map(|s| s.as_str()))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Every submitted submission of the project, in unit order (export).
    pub async fn list_submitted_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Submission>, sqlx::Error> {
        let query = format!(
            "SELECT s.id, s.token, s.unit_id, s.client_id, s.color_scheme_id, s.color_scheme_name,
                    s.selected_upgrades, s.upgrade_total, s.gst, s.total_incl_gst, s.current_step,
                    s.status, s.submitted_at, s.created_at, s.updated_at
             FROM submissions s JOIN units u ON u.id = s.unit_id
             WHERE u.project_id = $1 AND s.status = $2
             ORDER BY u.unit_number, s.id"
        );
        sqlx::query_as::<_, Submission>(&query)
            .bind(project_id)
            .bind(SubmissionStatus::Submitted.as_str())
            .fetch_all(pool)
            .await
    }
}

async fn upsert(
    pool: &PgPool,
    snapshot: &SubmissionSnapshot,
    status: SubmissionStatus,
) -> Result<Option<Submission>, sqlx::Error> {
    let query = format!(
        "INSERT INTO submissions
            (token, unit_id, client_id, color_scheme_id, color_scheme_name, selected_upgrades,
             upgrade_total, gst, total_incl_gst, current_step, status, submitted_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                 CASE WHEN $11 = 'submitted' THEN NOW() END)
         ON CONFLICT (token) DO UPDATE SET
            client_id = EXCLUDED.client_id,
            color_scheme_id = EXCLUDED.color_scheme_id,
            color_scheme_name = EXCLUDED.color_scheme_name,
            selected_upgrades = EXCLUDED.selected_upgrades,
            upgrade_total = EXCLUDED.upgrade_total,
            gst = EXCLUDED.gst,
            total_incl_gst = EXCLUDED.total_incl_gst,
            current_step = EXCLUDED.current_step,
            status = EXCLUDED.status,
            submitted_at = EXCLUDED.submitted_at
         WHERE submissions.status = 'draft'
         RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Submission>(&query)
        .bind(&snapshot.token)
        .bind(snapshot.unit_id)
        .bind(snapshot.client_id)
        .bind(snapshot.color_scheme_id)
        .bind(&snapshot.color_scheme_name)
        .bind(&snapshot.selected_upgrades)
        .bind(snapshot.upgrade_total)
        .bind(snapshot.gst)
        .bind(snapshot.total_incl_gst)
        .bind(snapshot.current_step)
        .bind(status.as_str())
        .fetch_optional(pool)
        .await
}
