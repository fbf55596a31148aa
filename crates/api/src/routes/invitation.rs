//! Public invitation routes, mounted at `/invitations`.

use axum::routing::post;
use axum::Router;

use crate::handlers::invitation;
use crate::state::AppState;

/// ```text
/// POST /accept   -> accept (public)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/accept", post(invitation::accept))
}
