//! Handlers for `/projects/{project_id}/unit-types`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use fitout_core::error::CoreError;
use fitout_core::types::DbId;
use fitout_core::validation::{validate_name, MAX_NAME_LENGTH};
use fitout_db::models::unit_type::{CreateUnitType, UnitType, UpdateUnitType};
use fitout_db::repositories::UnitTypeRepo;
use rust_decimal::Decimal;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

fn validate_layout(
    bedrooms: Option<i16>,
    bathrooms: Option<i16>,
    size_sqm: Option<Decimal>,
) -> Result<(), CoreError> {
    if bedrooms.is_some_and(|n| n < 0) || bathrooms.is_some_and(|n| n < 0) {
        return Err(CoreError::Validation(
            "Bedroom and bathroom counts must not be negative".into(),
        ));
    }
    if size_sqm.is_some_and(|s| s <= Decimal::ZERO) {
        return Err(CoreError::Validation("Size must be positive".into()));
    }
    Ok(())
}

/// GET /api/v1/projects/{project_id}/unit-types
pub async fn list_by_project(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<UnitType>>>> {
    super::load_project(&state.pool, project_id).await?;
    let unit_types = UnitTypeRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: unit_types }))
}

/// POST /api/v1/projects/{project_id}/unit-types
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateUnitType>,
) -> AppResult<(StatusCode, Json<DataResponse<UnitType>>)> {
    validate_name("Unit type name", &input.name, MAX_NAME_LENGTH)?;
    validate_layout(Some(input.bedrooms), Some(input.bathrooms), input.size_sqm)?;
    super::load_project(&state.pool, project_id).await?;

    let unit_type = UnitTypeRepo::create(&state.pool, project_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: unit_type })))
}

/// GET /api/v1/projects/{project_id}/unit-types/{id}
pub async fn get_by_id(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<UnitType>>> {
    let unit_type = UnitTypeRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or(AppError::not_found("UnitType", id))?;
    Ok(Json(DataResponse { data: unit_type }))
}

/// PUT /api/v1/projects/{project_id}/unit-types/{id}
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateUnitType>,
) -> AppResult<Json<DataResponse<UnitType>>> {
    if let Some(name) = &input.name {
        validate_name("Unit type name", name, MAX_NAME_LENGTH)?;
    }
    validate_layout(input.bedrooms, input.bathrooms, input.size_sqm)?;

    let unit_type = UnitTypeRepo::update(&state.pool, project_id, id, &input)
        .await?
        .ok_or(AppError::not_found("UnitType", id))?;
    Ok(Json(DataResponse { data: unit_type }))
}

/// DELETE /api/v1/projects/{project_id}/unit-types/{id}
///
/// Units of this type become untyped; scheme and upgrade links are removed.
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if UnitTypeRepo::delete(&state.pool, project_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("UnitType", id))
    }
}
