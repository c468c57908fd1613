//! Application configuration file
//!
//! One JSON object: the record store settings at top level plus an optional
//! `dashboard` object. Credentials may come from the environment instead.
//!
//! ```json
//! {
//!   "username": "aacuser",
//!   "host": "nv-desktop-services.apporto.com",
//!   "port": 31580,
//!   "dashboard": { "port": 8050 }
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::dashboard::DashboardConfig;
use crate::store::StoreConfig;

/// Environment variable overriding the configured username
pub const USERNAME_ENV: &str = "SHELTERDB_USERNAME";

/// Environment variable overriding the configured password
pub const PASSWORD_ENV: &str = "SHELTERDB_PASSWORD";

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(flatten)]
    pub store: StoreConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl AppConfig {
    /// Load from `path`, or start from defaults when there is none, then
    /// apply environment overrides
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn from_file(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::config_error(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config file {:?}: {}", path, e)))
    }

    /// Replace credentials with non-empty values from `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(username) = lookup(USERNAME_ENV).filter(|v| !v.is_empty()) {
            self.store.username = username;
        }
        if let Some(password) = lookup(PASSWORD_ENV).filter(|v| !v.is_empty()) {
            self.store.password = password;
        }
    }
}
