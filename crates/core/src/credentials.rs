//! Portal credential and token generation.
//!
//! Passwords and tokens are random alphanumeric strings. Only hashes of unit
//! passwords are ever stored; the plaintext is returned to the admin once.

use chrono::Duration;
use rand::Rng;
use serde::Serialize;

use crate::types::Timestamp;

/// Length of generated unit passwords.
pub const PASSWORD_LENGTH: usize = 12;

/// Length of invitation and portal tokens.
pub const TOKEN_LENGTH: usize = 48;

/// Default invitation lifetime.
pub const DEFAULT_INVITATION_EXPIRY_DAYS: i64 = 14;

fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Random password for a unit login.
pub fn generate_password() -> String {
    random_alphanumeric(PASSWORD_LENGTH)
}

/// Random opaque token (invitations, submission keys).
pub fn generate_token() -> String {
    random_alphanumeric(TOKEN_LENGTH)
}

/// Lowercase, ASCII alphanumerics separated by single hyphens.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Login name for a unit: `<project-slug>-<unit-slug>`.
pub fn unit_username(project_name: &str, unit_number: &str) -> String {
    let project = slugify(project_name);
    let unit = slugify(unit_number);
    match (project.is_empty(), unit.is_empty()) {
        (true, _) => format!("unit-{unit}"),
        (false, true) => format!("{project}-unit"),
        (false, false) => format!("{project}-{unit}"),
    }
}

pub fn invitation_expiry(now: Timestamp, days: i64) -> Timestamp {
    now + Duration::days(days)
}

/// Derived state of an invitation row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationState {
    Pending,
    Accepted,
    Revoked,
    Expired,
}

impl InvitationState {
    /// Revoked, then expired, then accepted. Acceptance does not extend the
    /// expiry.
    pub fn derive(
        now: Timestamp,
        expires_at: Timestamp,
        accepted_at: Option<Timestamp>,
        revoked_at: Option<Timestamp>,
    ) -> Self {
        if revoked_at.is_some() {
            Self::Revoked
        } else if expires_at <= now {
            Self::Expired
        } else if accepted_at.is_some() {
            Self::Accepted
        } else {
            Self::Pending
        }
    }

    /// Pending and accepted invitations both grant portal access.
    pub fn grants_access(self) -> bool {
        matches!(self, Self::Pending | Self::Accepted)
    }
}
