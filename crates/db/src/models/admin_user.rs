//! Back-office administrator accounts.

use fitout_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `admin_users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdminUser {
    pub id: DbId,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert DTO. The password is already hashed by the caller.
#[derive(Debug, Clone)]
pub struct CreateAdminUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
}
