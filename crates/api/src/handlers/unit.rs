//! Handlers for `/projects/{project_id}/units`, including portal
//! credentials and floor-plan files.

use std::path::PathBuf;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use fitout_core::credentials::{generate_password, generate_token, unit_username};
use fitout_core::error::CoreError;
use fitout_core::status::UnitStatus;
use fitout_core::types::DbId;
use fitout_core::validation::validate_unit_number;
use fitout_db::models::unit::{CreateUnit, NewUnit, Unit, UpdateUnit};
use fitout_db::repositories::{UnitRepo, UnitTypeRepo};
use fitout_db::DbPool;
use serde::Serialize;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::export::attachment;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::storage::{content_type_for, floor_plan_extension, remove_quietly, store_floor_plan};

/// Usernames are retried with a numeric suffix this many times.
const MAX_USERNAME_ATTEMPTS: u32 = 50;

/// A unit together with its freshly generated portal password.
///
/// The plaintext password appears only in this response.
#[derive(Debug, Serialize)]
pub struct UnitWithCredentials {
    pub unit: Unit,
    pub username: String,
    pub password: String,
}

fn parse_status(status: Option<&str>) -> Result<Option<UnitStatus>, CoreError> {
    status.map(UnitStatus::from_str_db).transpose()
}

async fn check_unit_type(pool: &DbPool, project_id: DbId, unit_type_id: Option<DbId>) -> AppResult<()> {
    if let Some(id) = unit_type_id {
        UnitTypeRepo::find_by_id(pool, project_id, id)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Validation(format!(
                    "Unit type {id} does not belong to this project"
                )))
            })?;
    }
    Ok(())
}

/// First free username derived from project and unit.
async fn available_username(pool: &DbPool, project_name: &str, unit_number: &str) -> AppResult<String> {
    let base = unit_username(project_name, unit_number);
    if !UnitRepo::exists_username(pool, &base).await? {
        return Ok(base);
    }
    for n in 2..=MAX_USERNAME_ATTEMPTS {
        let candidate = format!("{base}-{n}");
        if !UnitRepo::exists_username(pool, &candidate).await? {
            return Ok(candidate);
        }
    }
    Err(AppError::Core(CoreError::Conflict(format!(
        "No free username for '{base}'"
    ))))
}

fn hash(password: &str) -> AppResult<String> {
    hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))
}

/// GET /api/v1/projects/{project_id}/units
pub async fn list_by_project(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Unit>>>> {
    super::load_project(&state.pool, project_id).await?;
    let units = UnitRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: units }))
}

/// POST /api/v1/projects/{project_id}/units
///
/// Generates the portal username, password and submission token. A unit
/// number already used in the project is rejected with 409.
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateUnit>,
) -> AppResult<(StatusCode, Json<DataResponse<UnitWithCredentials>>)> {
    validate_unit_number(&input.unit_number)?;
    let status = parse_status(input.status.as_deref())?.unwrap_or(UnitStatus::Active);
    let project = super::load_project(&state.pool, project_id).await?;
    check_unit_type(&state.pool, project_id, input.unit_type_id).await?;

    let unit_number = input.unit_number.trim().to_string();
    if UnitRepo::exists_unit_number(&state.pool, project_id, &unit_number, None).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Unit number '{unit_number}' already exists in this project"
        ))));
    }

    let username = available_username(&state.pool, &project.name, &unit_number).await?;
    let password = generate_password();

    let unit = UnitRepo::create(
        &state.pool,
        &NewUnit {
            project_id,
            unit_type_id: input.unit_type_id,
            unit_number,
            status: status.as_str().to_string(),
            username: username.clone(),
            password_hash: hash(&password)?,
            portal_token: generate_token(),
        },
    )
    .await?;

    tracing::info!(
        unit_id = unit.id,
        project_id,
        admin_id = admin.user_id,
        "Unit created"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UnitWithCredentials {
                unit,
                username,
                password,
            },
        }),
    ))
}

/// GET /api/v1/projects/{project_id}/units/{id}
pub async fn get_by_id(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Unit>>> {
    let unit = UnitRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or(AppError::not_found("Unit", id))?;
    Ok(Json(DataResponse { data: unit }))
}

/// PUT /api/v1/projects/{project_id}/units/{id}
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
    Json(mut input): Json<UpdateUnit>,
) -> AppResult<Json<DataResponse<Unit>>> {
    if let Some(number) = &input.unit_number {
        validate_unit_number(number)?;
        if UnitRepo::exists_unit_number(&state.pool, project_id, number, Some(id)).await? {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Unit number '{}' already exists in this project",
                number.trim()
            ))));
        }
    }
    input.status = parse_status(input.status.as_deref())?.map(|s| s.as_str().to_string());
    check_unit_type(&state.pool, project_id, input.unit_type_id).await?;

    let unit = UnitRepo::update(&state.pool, project_id, id, &input)
        .await?
        .ok_or(AppError::not_found("Unit", id))?;
    Ok(Json(DataResponse { data: unit }))
}

/// DELETE /api/v1/projects/{project_id}/units/{id}
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let unit = UnitRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or(AppError::not_found("Unit", id))?;

    if !UnitRepo::delete(&state.pool, project_id, id).await? {
        return Err(AppError::not_found("Unit", id));
    }
    if let Some(path) = &unit.floor_plan_path {
        remove_quietly(&PathBuf::from(path)).await;
    }

    tracing::info!(unit_id = id, project_id, admin_id = admin.user_id, "Unit deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/projects/{project_id}/units/{id}/credentials
///
/// Issue a new portal password. The old one stops working immediately.
pub async fn reset_credentials(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<UnitWithCredentials>>> {
    let password = generate_password();
    if !UnitRepo::set_password_hash(&state.pool, project_id, id, &hash(&password)?).await? {
        return Err(AppError::not_found("Unit", id));
    }
    let unit = UnitRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or(AppError::not_found("Unit", id))?;

    tracing::info!(unit_id = id, admin_id = admin.user_id, "Unit credentials reset");
    Ok(Json(DataResponse {
        data: UnitWithCredentials {
            username: unit.username.clone(),
            unit,
            password,
        },
    }))
}

/// POST /api/v1/projects/{project_id}/units/{id}/floor-plan
///
/// Accepts a multipart form with a required `file` field (pdf, png, jpg).
/// Replaces any previous floor plan.
pub async fn upload_floor_plan(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
    mut multipart: Multipart,
) -> AppResult<Json<DataResponse<Unit>>> {
    UnitRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or(AppError::not_found("Unit", id))?;

    let mut file_data: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            file_data = Some((filename, data.to_vec()));
        }
    }

    let (filename, data) =
        file_data.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;
    if data.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".into()));
    }
    let ext = floor_plan_extension(&filename)?;

    let path = store_floor_plan(&state.config.upload_dir, project_id, id, &ext, &data)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store floor plan: {e}")))?;
    let path_str = path.to_string_lossy().to_string();

    let previous = match UnitRepo::set_floor_plan(
        &state.pool,
        project_id,
        id,
        &path_str,
        content_type_for(&ext),
    )
    .await
    {
        Ok(Some(previous)) => previous,
        Ok(None) => {
            remove_quietly(&path).await;
            return Err(AppError::not_found("Unit", id));
        }
        Err(e) => {
            tracing::error!(unit_id = id, error = %e, "Floor plan update failed, removing file");
            remove_quietly(&path).await;
            return Err(e.into());
        }
    };

    if let Some(old) = previous.filter(|old| *old != path_str) {
        remove_quietly(&PathBuf::from(old)).await;
    }

    tracing::info!(unit_id = id, bytes = data.len(), "Floor plan stored");

    let unit = UnitRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or(AppError::not_found("Unit", id))?;
    Ok(Json(DataResponse { data: unit }))
}

/// GET /api/v1/projects/{project_id}/units/{id}/floor-plan
pub async fn download_floor_plan(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Response> {
    let unit = UnitRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or(AppError::not_found("Unit", id))?;
    let (Some(path), content_type) = (unit.floor_plan_path.as_deref(), unit.floor_plan_content_type.as_deref()) else {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "FloorPlan",
            id,
        }));
    };

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to read floor plan: {e}")))?;
    let filename = std::path::Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("floor-plan");

    Ok(attachment(
        bytes,
        content_type.unwrap_or("application/octet-stream"),
        filename,
    ))
}
