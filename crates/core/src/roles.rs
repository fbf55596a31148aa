//! Well-known role name constants embedded in access tokens.

/// Back-office staff managing projects, pricing and catalogs.
pub const ROLE_ADMIN: &str = "admin";

/// A unit purchaser using the customization portal.
pub const ROLE_CLIENT: &str = "client";
