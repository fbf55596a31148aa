//! Client selection submission model and DTOs.

use fitout_core::types::{DbId, Money, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A draft or final selection for one unit, keyed by an opaque token.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Submission {
    pub id: DbId,
    #[serde(skip_serializing)]
    pub token: String,
    pub unit_id: DbId,
    pub client_id: Option<DbId>,
    pub color_scheme_id: Option<DbId>,
    pub color_scheme_name: Option<String>,
    pub selected_upgrades: serde_json::Value,
    pub upgrade_total: Money,
    pub gst: Money,
    pub total_incl_gst: Money,
    pub current_step: i16,
    pub status: String,
    pub submitted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Submission row joined with unit number, for admin listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubmissionListItem {
    pub id: DbId,
    pub unit_id: DbId,
    pub unit_number: String,
    pub client_id: Option<DbId>,
    pub client_name: Option<String>,
    pub color_scheme_name: Option<String>,
    pub upgrade_total: Money,
    pub total_incl_gst: Money,
    pub current_step: i16,
    pub status: String,
    pub submitted_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

/// Flattened snapshot written by draft saves and final submission.
#[derive(Debug, Clone)]
pub struct SubmissionSnapshot {
    pub token: String,
    pub unit_id: DbId,
    pub client_id: Option<DbId>,
    pub color_scheme_id: Option<DbId>,
    pub color_scheme_name: Option<String>,
    pub selected_upgrades: serde_json::Value,
    pub upgrade_total: Money,
    pub gst: Money,
    pub total_incl_gst: Money,
    pub current_step: i16,
}
