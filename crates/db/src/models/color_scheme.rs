//! Colour scheme model and DTOs.

use fitout_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A named finish package. `unit_type_ids` is aggregated from the join table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ColorScheme {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub materials: serde_json::Value,
    /// Inactive schemes stay in the admin catalog but leave the portal.
    pub is_active: bool,
    pub unit_type_ids: Vec<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateColorScheme {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "empty_object")]
    pub materials: serde_json::Value,
    pub is_active: Option<bool>,
    #[serde(default)]
    pub unit_type_ids: Vec<DbId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateColorScheme {
    pub name: Option<String>,
    pub description: Option<String>,
    pub materials: Option<serde_json::Value>,
    pub is_active: Option<bool>,
    /// Replaces the full set when present.
    pub unit_type_ids: Option<Vec<DbId>>,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}
