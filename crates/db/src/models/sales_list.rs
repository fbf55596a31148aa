//! Sales list and sales-list unit models.

use fitout_core::status::SaleStatus;
use fitout_core::types::{DbId, Money, Timestamp};
use fitout_core::versioning::UnitPriceRow;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SalesList {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub includes_all_units: bool,
    pub unit_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSalesList {
    pub name: String,
    pub description: Option<String>,
    /// When true every project unit is on the list, including units created
    /// later.
    #[serde(default = "default_true")]
    pub includes_all_units: bool,
    /// Explicit subset, used when `includes_all_units` is false.
    #[serde(default)]
    pub unit_ids: Vec<DbId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSalesList {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// A unit's row within a sales list, joined with its unit number.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SalesListUnit {
    pub id: DbId,
    pub sales_list_id: DbId,
    pub unit_id: DbId,
    pub unit_number: String,
    pub list_price: Option<Money>,
    pub sold_price: Option<Money>,
    pub sale_status: String,
    pub client_id: Option<DbId>,
    pub notes: Option<String>,
    pub updated_at: Timestamp,
}

/// One entry of a bulk pricing update. `None` leaves a field untouched,
/// except `client_id`/`notes` which are replaced when `clear_*` is set.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSalesListUnit {
    pub unit_id: DbId,
    pub list_price: Option<Money>,
    pub sold_price: Option<Money>,
    pub sale_status: Option<String>,
    pub client_id: Option<DbId>,
    pub notes: Option<String>,
    #[serde(default)]
    pub clear_client: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddSalesListUnits {
    pub unit_ids: Vec<DbId>,
}

/// Convert a stored status string, falling back to `Available` only for
/// values the CHECK constraint would already have rejected.
pub(crate) fn parse_sale_status(s: &str) -> SaleStatus {
    SaleStatus::from_str_db(s).unwrap_or_else(|_| {
        tracing::warn!(status = s, "Unexpected sale status in database");
        SaleStatus::Available
    })
}

impl SalesListUnit {
    pub fn to_price_row(&self) -> UnitPriceRow {
        UnitPriceRow {
            unit_id: self.unit_id,
            unit_number: self.unit_number.clone(),
            list_price: self.list_price,
            sold_price: self.sold_price,
            sale_status: parse_sale_status(&self.sale_status),
            client_id: self.client_id,
        }
    }
}

fn default_true() -> bool {
    true
}
