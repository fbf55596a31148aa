//! Upgrade option model and DTOs.

use fitout_core::types::{DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UpgradeOption {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub price: Money,
    pub max_quantity: i32,
    pub is_active: bool,
    pub unit_type_ids: Vec<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUpgradeOption {
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub price: Money,
    /// Defaults to 1.
    pub max_quantity: Option<i32>,
    pub is_active: Option<bool>,
    #[serde(default)]
    pub unit_type_ids: Vec<DbId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUpgradeOption {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub max_quantity: Option<i32>,
    pub is_active: Option<bool>,
    /// Replaces the full set when present.
    pub unit_type_ids: Option<Vec<DbId>>,
}
