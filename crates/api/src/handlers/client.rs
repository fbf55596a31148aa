//! Handlers for `/projects/{project_id}/clients` and their unit links.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use fitout_core::error::CoreError;
use fitout_core::pricing::validate_amount;
use fitout_core::status::ClientRole;
use fitout_core::types::DbId;
use fitout_core::validation::{validate_email, validate_name, MAX_NAME_LENGTH};
use fitout_db::models::client::{Client, CreateClient, LinkUnit, UnitClient, UpdateClient};
use fitout_db::repositories::{ClientRepo, UnitRepo};
use fitout_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

fn validate_contact(email: Option<&str>) -> Result<(), CoreError> {
    match email {
        Some(email) if !email.trim().is_empty() => validate_email(email),
        _ => Ok(()),
    }
}

async fn load_client(pool: &DbPool, project_id: DbId, id: DbId) -> AppResult<Client> {
    ClientRepo::find_by_id(pool, project_id, id)
        .await?
        .ok_or(AppError::not_found("Client", id))
}

/// GET /api/v1/projects/{project_id}/clients
pub async fn list_by_project(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Client>>>> {
    super::load_project(&state.pool, project_id).await?;
    let clients = ClientRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: clients }))
}

/// POST /api/v1/projects/{project_id}/clients
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateClient>,
) -> AppResult<(StatusCode, Json<DataResponse<Client>>)> {
    validate_name("Client name", &input.name, MAX_NAME_LENGTH)?;
    validate_contact(input.email.as_deref())?;
    super::load_project(&state.pool, project_id).await?;

    let client = ClientRepo::create(&state.pool, project_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: client })))
}

/// GET /api/v1/projects/{project_id}/clients/{id}
pub async fn get_by_id(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Client>>> {
    let client = load_client(&state.pool, project_id, id).await?;
    Ok(Json(DataResponse { data: client }))
}

/// PUT /api/v1/projects/{project_id}/clients/{id}
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateClient>,
) -> AppResult<Json<DataResponse<Client>>> {
    if let Some(name) = &input.name {
        validate_name("Client name", name, MAX_NAME_LENGTH)?;
    }
    validate_contact(input.email.as_deref())?;

    let client = ClientRepo::update(&state.pool, project_id, id, &input)
        .await?
        .ok_or(AppError::not_found("Client", id))?;
    Ok(Json(DataResponse { data: client }))
}

/// DELETE /api/v1/projects/{project_id}/clients/{id}
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if ClientRepo::delete(&state.pool, project_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Client", id))
    }
}

/// GET /api/v1/projects/{project_id}/clients/{id}/units
pub async fn list_units(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Vec<UnitClient>>>> {
    load_client(&state.pool, project_id, id).await?;
    let links = ClientRepo::list_units_for_client(&state.pool, id).await?;
    Ok(Json(DataResponse { data: links }))
}

/// POST /api/v1/projects/{project_id}/clients/{id}/units
///
/// Link the client to a unit of the same project. Re-linking updates the
/// reservation details.
pub async fn link_unit(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
    Json(mut input): Json<LinkUnit>,
) -> AppResult<(StatusCode, Json<DataResponse<UnitClient>>)> {
    load_client(&state.pool, project_id, id).await?;
    UnitRepo::find_by_id(&state.pool, project_id, input.unit_id)
        .await?
        .ok_or(AppError::not_found("Unit", input.unit_id))?;

    let role = input
        .role
        .as_deref()
        .map(ClientRole::from_str_db)
        .transpose()?
        .unwrap_or(ClientRole::Purchaser);
    input.role = Some(role.as_str().to_string());

    if let Some(deposit) = input.deposit {
        validate_amount("Deposit", deposit)?;
    }

    let link = ClientRepo::link_unit(&state.pool, id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: link })))
}

/// DELETE /api/v1/projects/{project_id}/clients/{id}/units/{unit_id}
pub async fn unlink_unit(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id, unit_id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<StatusCode> {
    load_client(&state.pool, project_id, id).await?;
    if ClientRepo::unlink_unit(&state.pool, id, unit_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("UnitClient", unit_id))
    }
}
