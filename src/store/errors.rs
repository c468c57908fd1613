//! # Record Store Errors
//!
//! Two tiers of failure:
//!
//! - Contract violations (`Configuration`, `Validation`) are always raised
//!   to the caller.
//! - Operational failures (`Backend`) are absorbed by the lenient
//!   operations and only surface through the `try_*` variants.
//!
//! `Connection` is the one operational failure that is raised, because it
//! happens while the store is being constructed.

use thiserror::Error;

/// Result type for record store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Record store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    // ==================
    // Contract Errors
    // ==================
    /// Missing or malformed connection settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Input rejected before reaching the backend
    #[error("Validation error: {0}")]
    Validation(String),

    // ==================
    // Operational Errors
    // ==================
    /// Liveness probe failed while constructing the store
    #[error("Unable to connect to the database: {0}")]
    Connection(String),

    /// The backend rejected or failed an operation
    #[error("Backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Configuration(_) => "SHELTER_CONFIGURATION_ERROR",
            StoreError::Validation(_) => "SHELTER_VALIDATION_ERROR",
            StoreError::Connection(_) => "SHELTER_CONNECTION_ERROR",
            StoreError::Backend(_) => "SHELTER_BACKEND_ERROR",
        }
    }

    /// Whether this error is a caller mistake rather than a runtime failure
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            StoreError::Configuration(_) | StoreError::Validation(_)
        )
    }

    pub(crate) fn validation(reason: impl Into<String>) -> Self {
        StoreError::Validation(reason.into())
    }

    pub(crate) fn backend(reason: impl std::fmt::Display) -> Self {
        StoreError::Backend(reason.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            StoreError::Configuration("x".into()),
            StoreError::Validation("x".into()),
            StoreError::Connection("x".into()),
            StoreError::Backend("x".into()),
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 4);
    }

    #[test]
    fn test_contract_violation_split() {
        assert!(StoreError::Validation("empty".into()).is_contract_violation());
        assert!(StoreError::Configuration("empty".into()).is_contract_violation());
        assert!(!StoreError::Backend("down".into()).is_contract_violation());
        assert!(!StoreError::Connection("down".into()).is_contract_violation());
    }

    #[test]
    fn test_connection_error_wraps_cause() {
        let err = StoreError::Connection("server selection timeout".into());
        assert!(err.to_string().contains("server selection timeout"));
    }
}
