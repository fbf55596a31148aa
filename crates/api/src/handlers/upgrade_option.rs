//! Handlers for `/projects/{project_id}/upgrade-options`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use fitout_core::error::CoreError;
use fitout_core::pricing::{validate_max_quantity, validate_price};
use fitout_core::types::DbId;
use fitout_core::validation::{validate_name, MAX_NAME_LENGTH};
use fitout_db::models::upgrade_option::{CreateUpgradeOption, UpdateUpgradeOption, UpgradeOption};
use fitout_db::repositories::UpgradeOptionRepo;
use fitout_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

async fn ensure_name_free(
    pool: &DbPool,
    project_id: DbId,
    name: &str,
    exclude_id: Option<DbId>,
) -> AppResult<()> {
    if UpgradeOptionRepo::exists_name(pool, project_id, name, exclude_id).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "An upgrade named '{}' already exists in this project",
            name.trim()
        ))));
    }
    Ok(())
}

/// GET /api/v1/projects/{project_id}/upgrade-options
pub async fn list_by_project(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<UpgradeOption>>>> {
    super::load_project(&state.pool, project_id).await?;
    let options = UpgradeOptionRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: options }))
}

/// POST /api/v1/projects/{project_id}/upgrade-options
///
/// Names are unique per project, ignoring case.
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(mut input): Json<CreateUpgradeOption>,
) -> AppResult<(StatusCode, Json<DataResponse<UpgradeOption>>)> {
    validate_name("Upgrade name", &input.name, MAX_NAME_LENGTH)?;
    validate_name("Category", &input.category, MAX_NAME_LENGTH)?;
    validate_price(input.price)?;
    if let Some(max) = input.max_quantity {
        validate_max_quantity(max)?;
    }
    super::load_project(&state.pool, project_id).await?;
    ensure_name_free(&state.pool, project_id, &input.name, None).await?;
    input.unit_type_ids = super::check_unit_types(&state.pool, project_id, &input.unit_type_ids).await?;

    let option = UpgradeOptionRepo::create(&state.pool, project_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: option })))
}

/// GET /api/v1/projects/{project_id}/upgrade-options/{id}
pub async fn get_by_id(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<UpgradeOption>>> {
    let option = UpgradeOptionRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or(AppError::not_found("UpgradeOption", id))?;
    Ok(Json(DataResponse { data: option }))
}

/// PUT /api/v1/projects/{project_id}/upgrade-options/{id}
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
    Json(mut input): Json<UpdateUpgradeOption>,
) -> AppResult<Json<DataResponse<UpgradeOption>>> {
    if let Some(name) = &input.name {
        validate_name("Upgrade name", name, MAX_NAME_LENGTH)?;
        ensure_name_free(&state.pool, project_id, name, Some(id)).await?;
    }
    if let Some(category) = &input.category {
        validate_name("Category", category, MAX_NAME_LENGTH)?;
    }
    if let Some(price) = input.price {
        validate_price(price)?;
    }
    if let Some(max) = input.max_quantity {
        validate_max_quantity(max)?;
    }
    if let Some(ids) = &input.unit_type_ids {
        input.unit_type_ids = Some(super::check_unit_types(&state.pool, project_id, ids).await?);
    }

    let option = UpgradeOptionRepo::update(&state.pool, project_id, id, &input)
        .await?
        .ok_or(AppError::not_found("UpgradeOption", id))?;
    Ok(Json(DataResponse { data: option }))
}

/// DELETE /api/v1/projects/{project_id}/upgrade-options/{id}
///
/// Submissions keep their flattened copy of the upgrade.
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if UpgradeOptionRepo::delete(&state.pool, project_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("UpgradeOption", id))
    }
}
