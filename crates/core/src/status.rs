//! Status enumerations stored as text columns.
//!
//! Each enum round-trips through the database representation via
//! `as_str` / `from_str_db` and serializes as snake_case JSON.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Generates `as_str`, `from_str_db`, `ALL` and `Display` for a unit-only enum.
macro_rules! db_enum {
    ($name:ident, $label:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Convert to the database string.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            /// Parse the database string.
            pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(CoreError::Validation(format!(
                        concat!("Invalid ", $label, " '{}'. Must be one of: {}"),
                        s,
                        [$($text),+].join(", ")
                    ))),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Whether a unit is offered in the portal and sales lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    Active,
    Inactive,
}

db_enum!(UnitStatus, "unit status", {
    Active => "active",
    Inactive => "inactive",
});

/// Sale state of a unit within a sales list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Available,
    Reserved,
    Sold,
    Withdrawn,
}

db_enum!(SaleStatus, "sale status", {
    Available => "available",
    Reserved => "reserved",
    Sold => "sold",
    Withdrawn => "withdrawn",
});

impl SaleStatus {
    /// Sold and reserved units must be attributable to a purchaser price.
    pub fn counts_as_committed(self) -> bool {
        matches!(self, Self::Reserved | Self::Sold)
    }
}

/// Lifecycle of a client's selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Draft,
    Submitted,
}

db_enum!(SubmissionStatus, "submission status", {
    Draft => "draft",
    Submitted => "submitted",
});

/// Relationship between a client and a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientRole {
    Purchaser,
}

db_enum!(ClientRole, "client role", {
    Purchaser => "purchaser",
});
