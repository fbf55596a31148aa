//! Handlers for sales-list versions: save, list, inspect, restore, compare.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use fitout_core::types::DbId;
use fitout_core::validation::{validate_name, MAX_NAME_LENGTH};
use fitout_core::versioning::{compare_snapshots, UnitPriceRow, VersionComparison};
use fitout_db::models::sales_list_version::{
    CreateSalesListVersion, RestoreOutcome, RestoreSalesListVersion, SalesListVersion,
    SalesListVersionDetail,
};
use fitout_db::repositories::{AdminUserRepo, SalesListRepo, SalesListVersionRepo};
use fitout_db::DbPool;
use serde::Serialize;

use super::sales_list::load_list;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::CompareParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// The admin's email, recorded as the version author.
async fn author(pool: &DbPool, admin: &AuthUser) -> AppResult<Option<String>> {
    Ok(AdminUserRepo::find_by_id(pool, admin.user_id)
        .await?
        .map(|a| a.email))
}

/// GET /api/v1/projects/{project_id}/sales-lists/{id}/versions
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Vec<SalesListVersion>>>> {
    load_list(&state.pool, project_id, id).await?;
    let versions = SalesListVersionRepo::list_by_list(&state.pool, id).await?;
    Ok(Json(DataResponse { data: versions }))
}

/// POST /api/v1/projects/{project_id}/sales-lists/{id}/versions
///
/// Capture the list's current rows as a new numbered version.
pub async fn save(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<CreateSalesListVersion>,
) -> AppResult<(StatusCode, Json<DataResponse<SalesListVersion>>)> {
    validate_name("Version label", &input.label, MAX_NAME_LENGTH)?;
    load_list(&state.pool, project_id, id).await?;
    let created_by = author(&state.pool, &admin).await?;

    let version = SalesListVersionRepo::create_snapshot(
        &state.pool,
        id,
        input.label.trim(),
        input.notes.as_deref(),
        created_by.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: version })))
}

/// GET /api/v1/projects/{project_id}/sales-lists/{id}/versions/{version_id}
pub async fn get_by_id(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id, version_id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<Json<DataResponse<SalesListVersionDetail>>> {
    load_list(&state.pool, project_id, id).await?;
    let detail = SalesListVersionRepo::find_with_units(&state.pool, id, version_id)
        .await?
        .ok_or(AppError::not_found("SalesListVersion", version_id))?;
    Ok(Json(DataResponse { data: detail }))
}

/// POST /api/v1/projects/{project_id}/sales-lists/{id}/versions/{version_id}/restore
///
/// Overwrite the live rows with the version's rows. With `save_current`
/// the live state is snapshotted first.
pub async fn restore(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id, version_id)): Path<(DbId, DbId, DbId)>,
    Json(input): Json<RestoreSalesListVersion>,
) -> AppResult<Json<DataResponse<RestoreOutcome>>> {
    load_list(&state.pool, project_id, id).await?;
    let created_by = author(&state.pool, &admin).await?;

    let outcome = SalesListVersionRepo::restore(
        &state.pool,
        id,
        version_id,
        input.save_current,
        created_by.as_deref(),
    )
    .await?
    .ok_or(AppError::not_found("SalesListVersion", version_id))?;

    tracing::info!(
        sales_list_id = id,
        version_id,
        backup = outcome.backup.as_ref().map(|b| b.id),
        skipped = outcome.skipped_unit_ids.len(),
        "Sales list restored"
    );
    Ok(Json(DataResponse { data: outcome }))
}

#[derive(Debug, Serialize)]
pub struct ComparisonResponse {
    pub from: SalesListVersion,
    /// `None` when compared against the live list.
    pub to: Option<SalesListVersion>,
    pub comparison: VersionComparison,
}

async fn version_rows(
    pool: &DbPool,
    list_id: DbId,
    version_id: DbId,
) -> AppResult<(SalesListVersion, Vec<UnitPriceRow>)> {
    let version = SalesListVersionRepo::find_by_id(pool, list_id, version_id)
        .await?
        .ok_or(AppError::not_found("SalesListVersion", version_id))?;
    let rows = SalesListVersionRepo::snapshot_rows(pool, version_id)
        .await?
        .iter()
        .map(|r| r.to_price_row())
        .collect();
    Ok((version, rows))
}

/// GET /api/v1/projects/{project_id}/sales-lists/{id}/versions/compare?from=&to=
///
/// Omitting `to` compares `from` against the list's current rows.
pub async fn compare(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
    Query(params): Query<CompareParams>,
) -> AppResult<Json<DataResponse<ComparisonResponse>>> {
    load_list(&state.pool, project_id, id).await?;

    let (from, from_rows) = version_rows(&state.pool, id, params.from).await?;
    let (to, to_rows) = match params.to {
        Some(to_id) => {
            let (version, rows) = version_rows(&state.pool, id, to_id).await?;
            (Some(version), rows)
        }
        None => (None, SalesListRepo::current_rows(&state.pool, id).await?),
    };

    let comparison = compare_snapshots(&from_rows, &to_rows);
    Ok(Json(DataResponse {
        data: ComparisonResponse {
            from,
            to,
            comparison,
        },
    }))
}
