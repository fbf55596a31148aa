use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when every dependency is usable, otherwise `degraded`.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Whether the floor-plan upload directory exists.
    pub storage_ready: bool,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = fitout_db::health_check(&state.pool).await.is_ok();
    let storage_ready = tokio::fs::metadata(&state.config.upload_dir)
        .await
        .is_ok_and(|m| m.is_dir());

    if !storage_ready {
        tracing::warn!(upload_dir = %state.config.upload_dir.display(), "Upload directory missing");
    }

    Json(HealthResponse {
        status: if db_healthy && storage_ready { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        storage_ready,
    })
}

/// Mounted at the root, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
