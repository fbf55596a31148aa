//! Sales-list version (snapshot) models.

use fitout_core::types::{DbId, Money, Timestamp};
use fitout_core::versioning::UnitPriceRow;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::sales_list::parse_sale_status;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SalesListVersion {
    pub id: DbId,
    pub sales_list_id: DbId,
    pub version_number: i32,
    pub label: String,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub unit_count: i64,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SalesListVersionUnit {
    pub id: DbId,
    pub version_id: DbId,
    pub unit_id: DbId,
    pub unit_number: String,
    pub list_price: Option<Money>,
    pub sold_price: Option<Money>,
    pub sale_status: String,
    pub client_id: Option<DbId>,
    pub notes: Option<String>,
}

impl SalesListVersionUnit {
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

/// A version together with its captured rows.
#[derive(Debug, Clone, Serialize)]
pub struct SalesListVersionDetail {
    #[serde(flatten)]
    pub version: SalesListVersion,
    pub units: Vec<SalesListVersionUnit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSalesListVersion {
    pub label: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestoreSalesListVersion {
    /// Snapshot the live state before overwriting it.
    #[serde(default)]
    pub save_current: bool,
}

/// Result of restoring a version onto its live list.
#[derive(Debug, Clone, Serialize)]
pub struct RestoreOutcome {
    pub restored: SalesListVersion,
    /// Snapshot of the live state taken just before the restore, if requested.
    pub backup: Option<SalesListVersion>,
    /// Units captured in the version that no longer exist.
    pub skipped_unit_ids: Vec<DbId>,
}
