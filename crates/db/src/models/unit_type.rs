//! Unit type (bedroom/bathroom/size template) model and DTOs.

use fitout_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UnitType {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub bedrooms: i16,
    pub bathrooms: i16,
    pub size_sqm: Option<Decimal>,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUnitType {
    pub name: String,
    #[serde(default)]
    pub bedrooms: i16,
    #[serde(default)]
    pub bathrooms: i16,
    pub size_sqm: Option<Decimal>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUnitType {
    pub name: Option<String>,
    pub bedrooms: Option<i16>,
    pub bathrooms: Option<i16>,
    pub size_sqm: Option<Decimal>,
    pub description: Option<String>,
}
