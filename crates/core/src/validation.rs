//! Field-level input validation shared by handlers.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Maximum length of names (projects, schemes, upgrades, lists).
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum length of a unit number.
pub const MAX_UNIT_NUMBER_LENGTH: usize = 32;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// A trimmed, non-empty value no longer than `max_len` characters.
pub fn validate_name(field: &str, value: &str, max_len: usize) -> Result<(), CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > max_len {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(())
}

/// Unit numbers are short identifiers without internal whitespace.
pub fn validate_unit_number(value: &str) -> Result<(), CoreError> {
    validate_name("Unit number", value, MAX_UNIT_NUMBER_LENGTH)?;
    if value.trim().chars().any(char::is_whitespace) {
        return Err(CoreError::Validation(
            "Unit number must not contain spaces".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_email(value: &str) -> Result<(), CoreError> {
    if !EMAIL_RE.is_match(value.trim()) {
        return Err(CoreError::Validation(format!(
            "'{value}' is not a valid email address"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_must_have_content() {
        assert!(validate_name("Name", "Tower A", MAX_NAME_LENGTH).is_ok());
        assert!(validate_name("Name", "   ", MAX_NAME_LENGTH).is_err());
        assert!(validate_name("Name", &"x".repeat(201), MAX_NAME_LENGTH).is_err());
    }

    #[test]
    fn unit_numbers_reject_spaces() {
        assert!(validate_unit_number("G01").is_ok());
        assert!(validate_unit_number(" 12 ").is_ok());
        assert!(validate_unit_number("G 01").is_err());
    }

    #[test]
    fn emails() {
        assert!(validate_email("buyer@example.co.nz").is_ok());
        assert!(validate_email("buyer@example").is_err());
        assert!(validate_email("not an email").is_err());
    }
}
