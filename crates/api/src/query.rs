//! Shared query parameter types for API handlers.

use fitout_core::types::DbId;
use serde::Deserialize;

/// `?status=&limit=&offset=` for submission listings.
#[derive(Debug, Deserialize)]
pub struct SubmissionListParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `?from=&to=` for version comparison. A missing `to` means the live list.
#[derive(Debug, Deserialize)]
pub struct CompareParams {
    pub from: DbId,
    pub to: Option<DbId>,
}
