//! Handlers for `/projects/{project_id}/sales-lists` and their unit rows.

use std::collections::BTreeSet;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use fitout_core::error::CoreError;
use fitout_core::pricing::validate_price;
use fitout_core::status::SaleStatus;
use fitout_core::types::DbId;
use fitout_core::validation::{validate_name, MAX_NAME_LENGTH};
use fitout_db::models::sales_list::{
    AddSalesListUnits, CreateSalesList, SalesList, SalesListUnit, UpdateSalesList,
    UpdateSalesListUnit,
};
use fitout_db::repositories::{ClientRepo, SalesListRepo, UnitRepo};
use fitout_db::DbPool;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Load a list scoped to its project, or 404.
pub(crate) async fn load_list(pool: &DbPool, project_id: DbId, id: DbId) -> AppResult<SalesList> {
    SalesListRepo::find_by_id(pool, project_id, id)
        .await?
        .ok_or(AppError::not_found("SalesList", id))
}

async fn check_units_in_project(pool: &DbPool, project_id: DbId, ids: &[DbId]) -> AppResult<()> {
    let unique: BTreeSet<DbId> = ids.iter().copied().collect();
    if unique.is_empty() {
        return Ok(());
    }
    let unique: Vec<DbId> = unique.into_iter().collect();
    let found = UnitRepo::count_in_project(pool, project_id, &unique).await?;
    if found != unique.len() as i64 {
        return Err(AppError::Core(CoreError::Validation(
            "One or more units do not belong to this project".into(),
        )));
    }
    Ok(())
}

/// GET /api/v1/projects/{project_id}/sales-lists
pub async fn list_by_project(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<SalesList>>>> {
    super::load_project(&state.pool, project_id).await?;
    let lists = SalesListRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: lists }))
}

/// POST /api/v1/projects/{project_id}/sales-lists
///
/// Seeds the list with every project unit, or with `unit_ids` when
/// `includes_all_units` is false.
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateSalesList>,
) -> AppResult<(StatusCode, Json<DataResponse<SalesList>>)> {
    validate_name("Sales list name", &input.name, MAX_NAME_LENGTH)?;
    super::load_project(&state.pool, project_id).await?;
    if !input.includes_all_units {
        check_units_in_project(&state.pool, project_id, &input.unit_ids).await?;
    }

    let list = SalesListRepo::create(&state.pool, project_id, &input).await?;
    tracing::info!(project_id, sales_list_id = list.id, units = list.unit_count, "Sales list created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: list })))
}

/// GET /api/v1/projects/{project_id}/sales-lists/{id}
pub async fn get_by_id(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<SalesList>>> {
    let list = load_list(&state.pool, project_id, id).await?;
    Ok(Json(DataResponse { data: list }))
}

/// PUT /api/v1/projects/{project_id}/sales-lists/{id}
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateSalesList>,
) -> AppResult<Json<DataResponse<SalesList>>> {
    if let Some(name) = &input.name {
        validate_name("Sales list name", name, MAX_NAME_LENGTH)?;
    }
    let list = SalesListRepo::update(&state.pool, project_id, id, &input)
        .await?
        .ok_or(AppError::not_found("SalesList", id))?;
    Ok(Json(DataResponse { data: list }))
}

/// DELETE /api/v1/projects/{project_id}/sales-lists/{id}
///
/// Versions are removed with the list.
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if SalesListRepo::delete(&state.pool, project_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("SalesList", id))
    }
}

// ---------------------------------------------------------------------------
// Unit rows
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct AddUnitsResponse {
    pub added: u64,
}

/// GET /api/v1/projects/{project_id}/sales-lists/{id}/units
pub async fn list_units(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Vec<SalesListUnit>>>> {
    load_list(&state.pool, project_id, id).await?;
    let units = SalesListRepo::list_units(&state.pool, id).await?;
    Ok(Json(DataResponse { data: units }))
}

/// POST /api/v1/projects/{project_id}/sales-lists/{id}/units
///
/// Units already on the list are skipped.
pub async fn add_units(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<AddSalesListUnits>,
) -> AppResult<Json<DataResponse<AddUnitsResponse>>> {
    load_list(&state.pool, project_id, id).await?;
    if input.unit_ids.is_empty() {
        return Err(AppError::BadRequest("unit_ids must not be empty".into()));
    }
    check_units_in_project(&state.pool, project_id, &input.unit_ids).await?;

    let added = SalesListRepo::add_units(&state.pool, project_id, id, &input.unit_ids).await?;
    Ok(Json(DataResponse {
        data: AddUnitsResponse { added },
    }))
}

/// PUT /api/v1/projects/{project_id}/sales-lists/{id}/units
///
/// Apply a batch of pricing edits. The whole batch fails if any row is
/// invalid or not on the list.
pub async fn bulk_update_units(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
    Json(mut updates): Json<Vec<UpdateSalesListUnit>>,
) -> AppResult<Json<DataResponse<Vec<SalesListUnit>>>> {
    load_list(&state.pool, project_id, id).await?;
    if updates.is_empty() {
        return Err(AppError::BadRequest("At least one unit update is required".into()));
    }

    let mut client_ids = BTreeSet::new();
    for update in &mut updates {
        for price in [update.list_price, update.sold_price].into_iter().flatten() {
            validate_price(price)?;
        }
        if let Some(status) = &update.sale_status {
            update.sale_status = Some(SaleStatus::from_str_db(status)?.as_str().to_string());
        }
        if let Some(client_id) = update.client_id {
            client_ids.insert(client_id);
        }
    }
    for client_id in client_ids {
        ClientRepo::find_by_id(&state.pool, project_id, client_id)
            .await?
            .ok_or(AppError::not_found("Client", client_id))?;
    }

    let rows = SalesListRepo::bulk_update_units(&state.pool, id, &updates).await?;
    tracing::info!(sales_list_id = id, rows = rows.len(), "Sales list prices updated");
    Ok(Json(DataResponse { data: rows }))
}

/// DELETE /api/v1/projects/{project_id}/sales-lists/{id}/units/{unit_id}
pub async fn remove_unit(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id, unit_id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<StatusCode> {
    load_list(&state.pool, project_id, id).await?;
    if SalesListRepo::remove_unit(&state.pool, id, unit_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("SalesListUnit", unit_id))
    }
}
