//! Observability for shelterdb
//!
//! Logging goes through `tracing`. Library code only emits events; the
//! binary decides where they go by calling [`init_tracing`] once at startup.
//!
//! # Usage
//!
//! ```ignore
//! use shelterdb::observability::{init_tracing, Event};
//!
//! init_tracing("info", false)?;
//! tracing::info!(event = %Event::ConfigLoaded, "{}", Event::ConfigLoaded.message());
//! ```

mod events;

pub use events::Event;

use thiserror::Error;
use tracing_subscriber::{fmt, EnvFilter};

/// Observability setup error
#[derive(Debug, Error)]
pub enum ObservabilityError {
    /// The level directive could not be parsed
    #[error("Invalid log filter '{0}': {1}")]
    InvalidFilter(String, String),

    /// A global subscriber is already installed
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Build the filter: `RUST_LOG` wins over the configured level
pub fn build_filter(level: &str) -> Result<EnvFilter, ObservabilityError> {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
            .map_err(|e| ObservabilityError::InvalidFilter(directives, e.to_string())),
        _ => EnvFilter::try_new(level)
            .map_err(|e| ObservabilityError::InvalidFilter(level.to_string(), e.to_string())),
    }
}

/// Install the global subscriber, writing to stderr
pub fn init_tracing(level: &str, json: bool) -> Result<(), ObservabilityError> {
    let filter = build_filter(level)?;
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| ObservabilityError::AlreadyInitialized(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_accepts_levels() {
        if std::env::var(EnvFilter::DEFAULT_ENV).is_ok() {
            return;
        }
        assert!(build_filter("info").is_ok());
        assert!(build_filter("shelterdb=debug,tower_http=warn").is_ok());
    }

    #[test]
    fn test_build_filter_rejects_garbage() {
        if std::env::var(EnvFilter::DEFAULT_ENV).is_ok() {
            return;
        }
        assert!(matches!(
            build_filter("shelterdb=loud"),
            Err(ObservabilityError::InvalidFilter(_, _))
        ));
    }
}
