//! Handlers for `/projects/{project_id}/color-schemes`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use fitout_core::materials::parse_materials;
use fitout_core::types::DbId;
use fitout_core::validation::{validate_name, MAX_NAME_LENGTH};
use fitout_db::models::color_scheme::{ColorScheme, CreateColorScheme, UpdateColorScheme};
use fitout_db::repositories::ColorSchemeRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/projects/{project_id}/color-schemes
pub async fn list_by_project(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ColorScheme>>>> {
    super::load_project(&state.pool, project_id).await?;
    let schemes = ColorSchemeRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: schemes }))
}

/// POST /api/v1/projects/{project_id}/color-schemes
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(mut input): Json<CreateColorScheme>,
) -> AppResult<(StatusCode, Json<DataResponse<ColorScheme>>)> {
    validate_name("Colour scheme name", &input.name, MAX_NAME_LENGTH)?;
    parse_materials(&input.materials)?;
    super::load_project(&state.pool, project_id).await?;
    input.unit_type_ids = super::check_unit_types(&state.pool, project_id, &input.unit_type_ids).await?;

    let scheme = ColorSchemeRepo::create(&state.pool, project_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: scheme })))
}

/// GET /api/v1/projects/{project_id}/color-schemes/{id}
pub async fn get_by_id(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<ColorScheme>>> {
    let scheme = ColorSchemeRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or(AppError::not_found("ColorScheme", id))?;
    Ok(Json(DataResponse { data: scheme }))
}

/// PUT /api/v1/projects/{project_id}/color-schemes/{id}
///
/// `unit_type_ids`, when present, replaces the full set of links.
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
    Json(mut input): Json<UpdateColorScheme>,
) -> AppResult<Json<DataResponse<ColorScheme>>> {
    if let Some(name) = &input.name {
        validate_name("Colour scheme name", name, MAX_NAME_LENGTH)?;
    }
    if let Some(materials) = &input.materials {
        parse_materials(materials)?;
    }
    if let Some(ids) = &input.unit_type_ids {
        input.unit_type_ids = Some(super::check_unit_types(&state.pool, project_id, ids).await?);
    }

    let scheme = ColorSchemeRepo::update(&state.pool, project_id, id, &input)
        .await?
        .ok_or(AppError::not_found("ColorScheme", id))?;
    Ok(Json(DataResponse { data: scheme }))
}

/// DELETE /api/v1/projects/{project_id}/color-schemes/{id}
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if ColorSchemeRepo::delete(&state.pool, project_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("ColorScheme", id))
    }
}
