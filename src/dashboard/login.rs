//! Credential check behind the dashboard login form
//!
//! A login builds a throwaway store from the submitted credentials and runs
//! one fixed sample query against it. The result is a message for display,
//! never an error.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::observability::Event;
use crate::store::{
    DocumentBackend, MemoryBackend, MongoBackend, Record, RecordStore, StoreConfig, StoreResult,
};

/// At most this many sample records are shown after a login
pub const LOGIN_SAMPLE_LIMIT: u64 = 3;

/// Shown when the sample query matches nothing
pub const NO_RESULTS_MESSAGE: &str = "No results found.";

/// Opens a backend for a fully populated store configuration
pub type BackendConnector =
    Arc<dyn Fn(&StoreConfig) -> StoreResult<Box<dyn DocumentBackend>> + Send + Sync>;

/// Sample query run after a successful login
pub fn sample_query() -> Value {
    json!({"animal_type": "Dog", "name": "Lucy"})
}

/// What the login form shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginOutcome {
    pub connected: bool,
    pub records: Vec<Record>,
    pub message: String,
}

/// Builds stores for submitted credentials
#[derive(Clone)]
pub struct LoginProbe {
    template: StoreConfig,
    connector: BackendConnector,
}

impl LoginProbe {
    /// Probe using `template` for everything except the credentials
    pub fn new(template: StoreConfig, connector: BackendConnector) -> Self {
        Self {
            template,
            connector,
        }
    }

    /// Probe that opens a new MongoDB client per login
    pub fn mongo(template: StoreConfig) -> Self {
        Self::new(
            template,
            Arc::new(|config: &StoreConfig| {
                MongoBackend::connect(config).map(|b| Box::new(b) as Box<dyn DocumentBackend>)
            }),
        )
    }

    /// Probe that shares an in-memory collection
    pub fn memory(template: StoreConfig, backend: MemoryBackend) -> Self {
        Self::new(
            template,
            Arc::new(move |_: &StoreConfig| {
                Ok(Box::new(backend.clone()) as Box<dyn DocumentBackend>)
            }),
        )
    }

    /// Try the credentials and describe what happened
    pub fn run(&self, username: &str, password: &str) -> LoginOutcome {
        let mut config = self.template.clone();
        config.username = username.to_string();
        config.password = password.to_string();

        let result = config
            .validate()
            .and_then(|_| (self.connector)(&config))
            .and_then(|backend| RecordStore::with_backend(&config, backend))
            .and_then(|store| store.read(&sample_query(), None, LOGIN_SAMPLE_LIMIT));

        match result {
            Ok(records) => {
                let message = if records.is_empty() {
                    NO_RESULTS_MESSAGE.to_string()
                } else {
                    records
                        .iter()
                        .map(|r| Value::Object(r.clone()).to_string())
                        .collect::<Vec<_>>()
                        .join("\n")
                };
                LoginOutcome {
                    connected: true,
                    records,
                    message,
                }
            }
            Err(e) => {
                warn!(
                    event = %Event::LoginFailed,
                    username,
                    error = %e,
                    "{}",
                    Event::LoginFailed.message()
                );
                LoginOutcome {
                    connected: false,
                    records: Vec::new(),
                    message: format!("Connection failed or error occurred:\n{}", e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    #[test]
    fn test_sample_capped_at_three() {
        let lucy = || record(json!({"animal_type": "Dog", "name": "Lucy"}));
        let backend = MemoryBackend::with_records(vec![lucy(), lucy(), lucy(), lucy()]).unwrap();
        let probe = LoginProbe::memory(StoreConfig::default(), backend);

        let outcome = probe.run("aacuser", "secret");
        assert!(outcome.connected);
        assert_eq!(outcome.records.len(), 3);
        assert_eq!(outcome.message.lines().count(), 3);
    }

    #[test]
    fn test_no_results_message() {
        let probe = LoginProbe::memory(StoreConfig::default(), MemoryBackend::new());
        let outcome = probe.run("aacuser", "secret");
        assert!(outcome.connected);
        assert_eq!(outcome.message, NO_RESULTS_MESSAGE);
    }

    #[test]
    fn test_empty_password_reports_failure() {
        let probe = LoginProbe::memory(StoreConfig::default(), MemoryBackend::new());
        let outcome = probe.run("aacuser", "");
        assert!(!outcome.connected);
        assert!(outcome.message.starts_with("Connection failed or error occurred:"));
    }

    #[test]
    fn test_unreachable_backend_reports_failure() {
        let backend = MemoryBackend::new();
        backend.set_online(false);
        let outcome = LoginProbe::memory(StoreConfig::default(), backend).run("aacuser", "secret");
        assert!(!outcome.connected);
        assert!(outcome.records.is_empty());
    }
}
