//! Connection settings for a record store
//!
//! The connection string always pins `authSource` to the target database,
//! so accounts provisioned inside that database keep working.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{StoreError, StoreResult};

/// URI option that bounds how long the driver waits for a usable server
pub const SERVER_SELECTION_TIMEOUT_OPTION: &str = "serverSelectionTimeoutMS";

/// Connection-establishment timeout applied when the caller sets none
pub const DEFAULT_SERVER_SELECTION_TIMEOUT_MS: u64 = 5000;

const URI_SCHEME: &str = "mongodb";
const AUTH_SOURCE_OPTION: &str = "authSource";

/// Record store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Account name (required, non-empty)
    #[serde(default)]
    pub username: String,

    /// Account password (required, non-empty)
    #[serde(default)]
    pub password: String,

    /// Database host (default: "127.0.0.1")
    #[serde(default = "default_host")]
    pub host: String,

    /// Database port (default: 27017)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database holding the collection, also the auth source (default: "aac")
    #[serde(default = "default_database")]
    pub database: String,

    /// Collection the store operates on (default: "animals")
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Extra driver options, rendered as URI query parameters
    #[serde(default)]
    pub options: BTreeMap<String, Value>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    27017
}

fn default_database() -> String {
    "aac".to_string()
}

fn default_collection() -> String {
    "animals".to_string()
}

impl Default for StoreConfig {
    /// Default address and namespace with no credentials
    fn default() -> Self {
        Self::new("", "")
    }
}

impl StoreConfig {
    /// Create a config for the default host, database and collection
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            host: default_host(),
            port: default_port(),
            database: default_database(),
            collection: default_collection(),
            options: BTreeMap::new(),
        }
    }

    /// Set host and port
    pub fn with_address(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    /// Set database and collection names
    pub fn with_namespace(
        mut self,
        database: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        self.database = database.into();
        self.collection = collection.into();
        self
    }

    /// Add a driver option
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Check the settings without touching the network
    pub fn validate(&self) -> StoreResult<()> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(StoreError::Configuration(
                "Both username and password are required".to_string(),
            ));
        }

        if self.host.is_empty() {
            return Err(StoreError::Configuration("host must not be empty".to_string()));
        }

        if self.database.is_empty() || self.collection.is_empty() {
            return Err(StoreError::Configuration(
                "database and collection names must not be empty".to_string(),
            ));
        }

        for (key, value) in &self.options {
            if !is_option_key(key) {
                return Err(StoreError::Configuration(format!(
                    "option name '{}' may only contain letters, digits and '_'",
                    key
                )));
            }
            if key.eq_ignore_ascii_case(AUTH_SOURCE_OPTION) {
                return Err(StoreError::Configuration(format!(
                    "'{}' is pinned to the database name and cannot be overridden",
                    key
                )));
            }
            if render_option_value(value).is_none() {
                return Err(StoreError::Configuration(format!(
                    "option '{}' must be a string, number or boolean",
                    key
                )));
            }
        }

        Ok(())
    }

    /// Effective server selection timeout in milliseconds
    pub fn server_selection_timeout_ms(&self) -> u64 {
        self.options
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(SERVER_SELECTION_TIMEOUT_OPTION))
            .and_then(|(_, v)| match v {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.parse().ok(),
                _ => None,
            })
            .unwrap_or(DEFAULT_SERVER_SELECTION_TIMEOUT_MS)
    }

    /// Render the connection string
    pub fn connection_uri(&self) -> String {
        self.render_uri(&urlencoding::encode(&self.password))
    }

    /// Render the connection string with the password masked
    pub fn connection_uri_redacted(&self) -> String {
        self.render_uri("****")
    }

    fn render_uri(&self, password: &str) -> String {
        let mut uri = format!(
            "{}://{}:{}@{}:{}/{}?{}={}",
            URI_SCHEME,
            urlencoding::encode(&self.username),
            password,
            self.host,
            self.port,
            self.database,
            AUTH_SOURCE_OPTION,
            self.database,
        );

        let has_timeout = self
            .options
            .keys()
            .any(|k| k.eq_ignore_ascii_case(SERVER_SELECTION_TIMEOUT_OPTION));
        if !has_timeout {
            uri.push_str(&format!(
                "&{}={}",
                SERVER_SELECTION_TIMEOUT_OPTION, DEFAULT_SERVER_SELECTION_TIMEOUT_MS
            ));
        }

        for (key, value) in &self.options {
            if !is_option_key(key) || key.eq_ignore_ascii_case(AUTH_SOURCE_OPTION) {
                continue;
            }
            if let Some(rendered) = render_option_value(value) {
                uri.push_str(&format!("&{}={}", key, urlencoding::encode(&rendered)));
            }
        }

        uri
    }
}

/// Driver option names are plain identifiers such as `replicaSet`
fn is_option_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn render_option_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
