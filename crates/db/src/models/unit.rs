//! Unit entity model and DTOs.

use fitout_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A sellable unit. Credentials are hashed; the portal token keys the
/// unit's submission.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Unit {
    pub id: DbId,
    pub project_id: DbId,
    pub unit_type_id: Option<DbId>,
    pub unit_number: String,
    pub status: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub portal_token: String,
    pub floor_plan_path: Option<String>,
    pub floor_plan_content_type: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for creating a unit. Credentials are generated server-side.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUnit {
    pub unit_number: String,
    pub unit_type_id: Option<DbId>,
    /// Defaults to `active`.
    pub status: Option<String>,
}

/// Insert DTO with generated credentials.
#[derive(Debug, Clone)]
pub struct NewUnit {
    pub project_id: DbId,
    pub unit_type_id: Option<DbId>,
    pub unit_number: String,
    pub status: String,
    pub username: String,
    pub password_hash: String,
    pub portal_token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUnit {
    pub unit_number: Option<String>,
    pub unit_type_id: Option<DbId>,
    pub status: Option<String>,
}
