//! Colour-scheme material maps.
//!
//! A scheme's materials are stored as a JSON object keyed by field name
//! (`paint`, `carpet`, `kitchen_floor`, ...). Each entry carries the chosen
//! finish and an optional supplier link.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

static FIELD_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]{0,63}$").expect("valid field key regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialEntry {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_url: Option<String>,
}

/// Field name to finish. Ordered so rendering is stable.
pub type Materials = BTreeMap<String, MaterialEntry>;

/// Parse and validate a materials JSON value.
pub fn parse_materials(value: &serde_json::Value) -> Result<Materials, CoreError> {
    if !value.is_object() {
        return Err(CoreError::Validation(
            "Materials must be a JSON object".to_string(),
        ));
    }
    let materials: Materials = serde_json::from_value(value.clone())
        .map_err(|e| CoreError::Validation(format!("Invalid materials: {e}")))?;
    validate_materials(&materials)?;
    Ok(materials)
}

pub fn validate_materials(materials: &Materials) -> Result<(), CoreError> {
    for (key, entry) in materials {
        if !FIELD_KEY_RE.is_match(key) {
            return Err(CoreError::Validation(format!(
                "Material field '{key}' must be lowercase snake_case"
            )));
        }
        if entry.value.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Material field '{key}' must have a value"
            )));
        }
        if let Some(url) = &entry.supplier_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(CoreError::Validation(format!(
                    "Supplier link for '{key}' must be an http(s) URL"
                )));
            }
        }
    }
    Ok(())
}

/// `kitchen_floor` -> `Kitchen Floor`.
pub fn field_label(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A material row ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialRow {
    pub label: String,
    pub value: String,
    pub supplier_url: Option<String>,
}

pub fn material_rows(materials: &Materials) -> Vec<MaterialRow> {
    materials
        .iter()
        .map(|(key, entry)| MaterialRow {
            label: field_label(key),
            value: entry.value.clone(),
            supplier_url: entry.supplier_url.clone(),
        })
        .collect()
}
