//! Client (purchaser) model, DTOs, and the unit link.

use fitout_core::types::{DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Client {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateClient {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateClient {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// A row from `unit_clients`, joined with the unit number.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UnitClient {
    pub id: DbId,
    pub unit_id: DbId,
    pub unit_number: String,
    pub client_id: DbId,
    pub role: String,
    pub reserved_at: Option<Timestamp>,
    pub purchased_at: Option<Timestamp>,
    pub deposit: Option<Money>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkUnit {
    pub unit_id: DbId,
    /// Defaults to `purchaser`.
    pub role: Option<String>,
    pub reserved_at: Option<Timestamp>,
    pub purchased_at: Option<Timestamp>,
    pub deposit: Option<Money>,
    pub notes: Option<String>,
}
