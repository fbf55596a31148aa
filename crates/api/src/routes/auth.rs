//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /admin/login   -> admin_login
/// POST /client/login  -> client_login
/// GET  /me            -> me (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/login", post(auth::admin_login))
        .route("/client/login", post(auth::client_login))
        .route("/me", get(auth::me))
}
