//! Handlers for the `/auth` resource (admin login, unit login, session info).

use axum::extract::State;
use axum::Json;
use fitout_core::error::CoreError;
use fitout_core::roles::ROLE_ADMIN;
use fitout_core::status::UnitStatus;
use fitout_core::types::DbId;
use fitout_db::models::unit::Unit;
use fitout_db::repositories::{AdminUserRepo, UnitRepo};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{generate_access_token, generate_client_token};
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/admin/login`.
#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/client/login`.
#[derive(Debug, Deserialize)]
pub struct ClientLoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful authentication response for admins and portal clients.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: SessionInfo,
}

/// Who a token was issued to.
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub role: String,
    /// Admin id, or unit id for portal sessions.
    pub id: DbId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<DbId>,
}

impl SessionInfo {
    pub(crate) fn for_unit(unit: &Unit, client_id: Option<DbId>) -> Self {
        Self {
            role: fitout_core::roles::ROLE_CLIENT.to_string(),
            id: unit.id,
            name: unit.unit_number.clone(),
            email: None,
            project_id: Some(unit.project_id),
            client_id,
        }
    }
}

fn invalid_credentials(what: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(format!("Invalid {what} or password")))
}

fn verify(password: &str, hash: &str) -> AppResult<bool> {
    verify_password(password, hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))
}

/// Reject portal access for units that have been switched off.
pub(crate) fn ensure_unit_active(unit: &Unit) -> AppResult<()> {
    if unit.status != UnitStatus::Active.as_str() {
        return Err(AppError::Core(CoreError::Forbidden(
            "This unit is not active in the portal".into(),
        )));
    }
    Ok(())
}

/// Sign a portal token for `unit` and build the response.
pub(crate) fn client_auth_response(
    state: &AppState,
    unit: &Unit,
    client_id: Option<DbId>,
) -> AppResult<AuthResponse> {
    let access_token = generate_client_token(unit.id, client_id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    Ok(AuthResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user: SessionInfo::for_unit(unit, client_id),
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/admin/login
pub async fn admin_login(
    State(state): State<AppState>,
    Json(input): Json<AdminLoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let admin = AdminUserRepo::find_by_email(&state.pool, input.email.trim())
        .await?
        .ok_or_else(|| invalid_credentials("email"))?;

    if !admin.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    if !verify(&input.password, &admin.password_hash)? {
        tracing::warn!(admin_id = admin.id, "Failed admin login");
        return Err(invalid_credentials("email"));
    }

    let access_token = generate_access_token(admin.id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(admin_id = admin.id, "Admin logged in");
    Ok(Json(AuthResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user: SessionInfo {
            role: ROLE_ADMIN.to_string(),
            id: admin.id,
            name: admin.name,
            email: Some(admin.email),
            project_id: None,
            client_id: None,
        },
    }))
}

/// POST /api/v1/auth/client/login
///
/// Log in with a unit's generated username and password.
pub async fn client_login(
    State(state): State<AppState>,
    Json(input): Json<ClientLoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let username = input.username.trim().to_lowercase();
    let unit = UnitRepo::find_by_username(&state.pool, &username)
        .await?
        .ok_or_else(|| invalid_credentials("username"))?;

    if !verify(&input.password, &unit.password_hash)? {
        tracing::warn!(unit_id = unit.id, "Failed unit login");
        return Err(invalid_credentials("username"));
    }
    ensure_unit_active(&unit)?;

    tracing::info!(unit_id = unit.id, "Unit logged in");
    Ok(Json(client_auth_response(&state, &unit, None)?))
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<SessionInfo>>> {
    let info = if user.role == ROLE_ADMIN {
        let admin = AdminUserRepo::find_by_id(&state.pool, user.user_id)
            .await?
            .ok_or(AppError::not_found("AdminUser", user.user_id))?;
        SessionInfo {
            role: ROLE_ADMIN.to_string(),
            id: admin.id,
            name: admin.name,
            email: Some(admin.email),
            project_id: None,
            client_id: None,
        }
    } else {
        let unit = UnitRepo::find_by_id_unscoped(&state.pool, user.user_id)
            .await?
            .ok_or(AppError::not_found("Unit", user.user_id))?;
        SessionInfo::for_unit(&unit, user.client_id)
    };
    Ok(Json(DataResponse { data: info }))
}
