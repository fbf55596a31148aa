//! Route definitions for the client portal, mounted at `/portal`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::portal;
use crate::state::AppState;

/// Routes mounted at `/portal`. All require a client token.
///
/// ```text
/// GET  /unit               -> get_unit
/// GET  /options            -> get_options
/// GET  /selection          -> get_selection
/// PUT  /selection          -> save_selection
/// POST /wizard/advance     -> advance
/// POST /wizard/back        -> back
/// POST /submit             -> submit
/// GET  /submission/pdf     -> submission_pdf
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/unit", get(portal::get_unit))
        .route("/options", get(portal::get_options))
        .route(
            "/selection",
            get(portal::get_selection).put(portal::save_selection),
        )
        .route("/wizard/advance", post(portal::advance))
        .route("/wizard/back", post(portal::back))
        .route("/submit", post(portal::submit))
        .route("/submission/pdf", get(portal::submission_pdf))
}
