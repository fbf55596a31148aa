//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod admin_user;
pub mod client;
pub mod color_scheme;
pub mod invitation;
pub mod project;
pub mod sales_list;
pub mod sales_list_version;
pub mod submission;
pub mod unit;
pub mod unit_type;
pub mod upgrade_option;
