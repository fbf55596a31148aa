//! Portal invitation model and DTOs.

use fitout_core::credentials::InvitationState;
use fitout_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An invitation joined with the client name and unit number.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Invitation {
    pub id: DbId,
    pub client_id: DbId,
    pub client_name: String,
    pub unit_id: DbId,
    pub unit_number: String,
    pub token: String,
    pub expires_at: Timestamp,
    pub accepted_at: Option<Timestamp>,
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl Invitation {
    pub fn state(&self, now: Timestamp) -> InvitationState {
        InvitationState::derive(now, self.expires_at, self.accepted_at, self.revoked_at)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvitation {
    pub client_id: DbId,
    pub unit_id: DbId,
    pub expires_in_days: Option<i64>,
}
