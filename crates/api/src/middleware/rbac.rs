//! Role-based access control extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does
//! not match, so handlers enforce authorization at the type level.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use fitout_core::error::CoreError;
use fitout_core::roles::{ROLE_ADMIN, ROLE_CLIENT};
use fitout_core::types::DbId;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// A portal session: the unit the token was issued for.
#[derive(Debug, Clone, Copy)]
pub struct PortalSession {
    pub unit_id: DbId,
    pub client_id: Option<DbId>,
}

/// Requires the `client` role. Rejects with 403 Forbidden otherwise.
pub struct RequireClient(pub PortalSession);

impl FromRequestParts<AppState> for RequireClient {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_CLIENT {
            return Err(AppError::Core(CoreError::Forbidden(
                "Portal session required".into(),
            )));
        }
        Ok(RequireClient(PortalSession {
            unit_id: user.user_id,
            client_id: user.client_id,
        }))
    }
}
