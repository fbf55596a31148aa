//! Handlers for portal invitations: admin issue/list/revoke and public accept.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use fitout_core::credentials::{generate_token, invitation_expiry, InvitationState};
use fitout_core::error::CoreError;
use fitout_core::types::{DbId, Timestamp};
use fitout_db::models::invitation::{CreateInvitation, Invitation};
use fitout_db::repositories::{ClientRepo, InvitationRepo, UnitRepo};
use serde::{Deserialize, Serialize};

use super::auth::{client_auth_response, ensure_unit_active, AuthResponse};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Longest validity an admin may give an invitation.
const MAX_EXPIRY_DAYS: i64 = 365;

/// An invitation with its derived state.
#[derive(Debug, Serialize)]
pub struct InvitationView {
    #[serde(flatten)]
    pub invitation: Invitation,
    pub state: InvitationState,
}

impl InvitationView {
    fn at(invitation: Invitation, now: Timestamp) -> Self {
        let state = invitation.state(now);
        Self { invitation, state }
    }
}

/// Request body for `POST /invitations/accept`.
#[derive(Debug, Deserialize)]
pub struct AcceptInvitation {
    pub token: String,
}

/// GET /api/v1/projects/{project_id}/invitations
pub async fn list_by_project(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<InvitationView>>>> {
    super::load_project(&state.pool, project_id).await?;
    let now = Utc::now();
    let invitations = InvitationRepo::list_by_project(&state.pool, project_id)
        .await?
        .into_iter()
        .map(|i| InvitationView::at(i, now))
        .collect();
    Ok(Json(DataResponse { data: invitations }))
}

/// POST /api/v1/projects/{project_id}/invitations
///
/// Invite a client to the portal for one of their project's units.
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateInvitation>,
) -> AppResult<(StatusCode, Json<DataResponse<InvitationView>>)> {
    let days = input
        .expires_in_days
        .unwrap_or(state.config.invitation_expiry_days);
    if !(1..=MAX_EXPIRY_DAYS).contains(&days) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "expires_in_days must be between 1 and {MAX_EXPIRY_DAYS}"
        ))));
    }

    ClientRepo::find_by_id(&state.pool, project_id, input.client_id)
        .await?
        .ok_or(AppError::not_found("Client", input.client_id))?;
    UnitRepo::find_by_id(&state.pool, project_id, input.unit_id)
        .await?
        .ok_or(AppError::not_found("Unit", input.unit_id))?;

    let now = Utc::now();
    let invitation = InvitationRepo::create(
        &state.pool,
        input.client_id,
        input.unit_id,
        &generate_token(),
        invitation_expiry(now, days),
    )
    .await?;

    tracing::info!(
        invitation_id = invitation.id,
        client_id = input.client_id,
        unit_id = input.unit_id,
        days,
        "Invitation issued"
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: InvitationView::at(invitation, now),
        }),
    ))
}

/// DELETE /api/v1/projects/{project_id}/invitations/{id}
pub async fn revoke(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if InvitationRepo::revoke(&state.pool, project_id, id).await? {
        tracing::info!(invitation_id = id, "Invitation revoked");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Invitation", id))
    }
}

/// POST /api/v1/invitations/accept
///
/// Exchange an invitation token for a portal session bound to the
/// invited client. Accepted invitations may be reused until they expire
/// or are revoked.
pub async fn accept(
    State(state): State<AppState>,
    Json(input): Json<AcceptInvitation>,
) -> AppResult<Json<AuthResponse>> {
    let invitation = InvitationRepo::find_by_token(&state.pool, input.token.trim())
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Invalid invitation token".into()))
        })?;

    let current = invitation.state(Utc::now());
    if !current.grants_access() {
        let reason = match current {
            InvitationState::Revoked => "revoked",
            _ => "expired",
        };
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "This invitation is {reason}"
        ))));
    }

    let unit = UnitRepo::find_by_id_unscoped(&state.pool, invitation.unit_id)
        .await?
        .ok_or(AppError::not_found("Unit", invitation.unit_id))?;
    ensure_unit_active(&unit)?;

    InvitationRepo::mark_accepted(&state.pool, invitation.id).await?;
    tracing::info!(
        invitation_id = invitation.id,
        unit_id = unit.id,
        client_id = invitation.client_id,
        "Invitation accepted"
    );

    Ok(Json(client_auth_response(
        &state,
        &unit,
        Some(invitation.client_id),
    )?))
}
