//! CLI-specific error types
//!
//! Every CLI error is fatal: it is printed as `CODE: message` and the
//! process exits non-zero.

use std::fmt;
use std::io;

use crate::observability::ObservabilityError;
use crate::store::StoreError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (files, stdout)
    IoError,
    /// Malformed command argument
    InvalidArgument,
    /// Logging could not be set up
    LoggingError,
    /// Dashboard server failed
    ServeFailed,
    /// Record store error, reported with the store's own code
    Store(&'static str),
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "SHELTER_CLI_CONFIG_ERROR",
            Self::IoError => "SHELTER_CLI_IO_ERROR",
            Self::InvalidArgument => "SHELTER_CLI_INVALID_ARGUMENT",
            Self::LoggingError => "SHELTER_CLI_LOGGING_ERROR",
            Self::ServeFailed => "SHELTER_CLI_SERVE_FAILED",
            Self::Store(code) => *code,
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidArgument, msg)
    }

    pub fn serve_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ServeFailed, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        Self::new(CliErrorCode::Store(e.code()), e.to_string())
    }
}

impl From<ObservabilityError> for CliError {
    fn from(e: ObservabilityError) -> Self {
        Self::new(CliErrorCode::LoggingError, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_code_passes_through() {
        let err = CliError::from(StoreError::Configuration("username is required".into()));
        assert_eq!(err.code_str(), "SHELTER_CONFIGURATION_ERROR");
        assert!(err.to_string().starts_with("SHELTER_CONFIGURATION_ERROR: "));
    }

    #[test]
    fn test_display_format() {
        let err = CliError::invalid_argument("query is not valid JSON");
        assert_eq!(
            err.to_string(),
            "SHELTER_CLI_INVALID_ARGUMENT: query is not valid JSON"
        );
    }
}
