//! Domain logic for the Fitout sales and customization portal.
//!
//! Everything in this crate is pure: no database, no HTTP. The `db` and
//! `api` crates build on these types and validation rules.

pub mod credentials;
pub mod diff;
pub mod error;
pub mod materials;
pub mod pdf;
pub mod pricing;
pub mod roles;
pub mod status;
pub mod types;
pub mod validation;
pub mod versioning;
pub mod wizard;
