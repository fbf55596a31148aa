use crate::types::DbId;

/// Domain failures, mapped to HTTP statuses by the api crate.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Bad input: blank names, negative prices, an incomplete wizard step.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Duplicate names or numbers, or a selection that is already submitted.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed: wrong role, inactive unit or account,
    /// revoked or expired invitation.
    #[error("Forbidden: {0}")]
    Forbidden(String),
}
