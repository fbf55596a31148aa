//! Admin handlers for client submissions and their PDF / zip exports.

use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use fitout_core::status::SubmissionStatus;
use fitout_core::types::DbId;
use fitout_db::models::submission::{Submission, SubmissionListItem};
use fitout_db::repositories::SubmissionRepo;
use fitout_db::{clamp_limit, clamp_offset, DbPool};

use crate::error::{AppError, AppResult};
use crate::export::{self, attachment};
use crate::middleware::rbac::RequireAdmin;
use crate::query::SubmissionListParams;
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

async fn load_submission(pool: &DbPool, project_id: DbId, id: DbId) -> AppResult<Submission> {
    SubmissionRepo::find_by_id(pool, project_id, id)
        .await?
        .ok_or(AppError::not_found("Submission", id))
}

/// GET /api/v1/projects/{project_id}/submissions
///
/// Optional `?status=draft|submitted`, paginated with `limit`/`offset`.
pub async fn list_by_project(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Query(params): Query<SubmissionListParams>,
) -> AppResult<Json<DataResponse<Vec<SubmissionListItem>>>> {
    super::load_project(&state.pool, project_id).await?;
    let status = params
        .status
        .as_deref()
        .map(SubmissionStatus::from_str_db)
        .transpose()?;

    let items = SubmissionRepo::list_by_project(
        &state.pool,
        project_id,
        status,
        clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT),
        clamp_offset(params.offset),
    )
    .await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/projects/{project_id}/submissions/{id}
pub async fn get_by_id(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Submission>>> {
    let submission = load_submission(&state.pool, project_id, id).await?;
    Ok(Json(DataResponse { data: submission }))
}

/// GET /api/v1/projects/{project_id}/submissions/{id}/pdf
pub async fn summary_pdf(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Response> {
    let project = super::load_project(&state.pool, project_id).await?;
    let submission = load_submission(&state.pool, project_id, id).await?;
    let ctx = export::load_context(&state.pool, &project, &submission).await?;

    let filename = format!("{}-summary.pdf", export::file_stem(&ctx.unit.unit_number));
    Ok(attachment(
        export::summary_pdf(&ctx, &submission),
        "application/pdf",
        &filename,
    ))
}

/// GET /api/v1/projects/{project_id}/submissions/{id}/floor-plan.pdf
pub async fn floor_plan_pdf(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Response> {
    let project = super::load_project(&state.pool, project_id).await?;
    let submission = load_submission(&state.pool, project_id, id).await?;
    let ctx = export::load_context(&state.pool, &project, &submission).await?;

    let filename = format!("{}-floor-plan.pdf", export::file_stem(&ctx.unit.unit_number));
    Ok(attachment(
        export::floor_plan_pdf(&ctx),
        "application/pdf",
        &filename,
    ))
}

/// GET /api/v1/projects/{project_id}/submissions/export.zip
///
/// Summary and floor-plan PDFs for every submitted selection. Drafts are
/// left out; a project with none yields an empty archive.
pub async fn export_zip(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Response> {
    let project = super::load_project(&state.pool, project_id).await?;
    let submissions = SubmissionRepo::list_submitted_by_project(&state.pool, project_id).await?;

    let mut contexts = Vec::with_capacity(submissions.len());
    for submission in &submissions {
        contexts.push(export::load_context(&state.pool, &project, submission).await?);
    }
    let stems = export::archive_stems(
        contexts
            .iter()
            .map(|ctx| (ctx.unit.id, ctx.unit.unit_number.as_str())),
    );

    let mut entries = Vec::with_capacity(submissions.len() * 2);
    for ((submission, ctx), stem) in submissions.iter().zip(&contexts).zip(&stems) {
        entries.push((format!("{stem}-summary.pdf"), export::summary_pdf(ctx, submission)));
        entries.push((format!("{stem}-floor-plan.pdf"), export::floor_plan_pdf(ctx)));
    }

    let bytes = export::build_zip(&entries)
        .map_err(|e| AppError::InternalError(format!("Zip export failed: {e}")))?;

    tracing::info!(project_id, submissions = submissions.len(), bytes = bytes.len(), "Exported submissions");
    let filename = format!("project-{project_id}-submissions.zip");
    Ok(attachment(bytes, "application/zip", &filename))
}
