//! CLI argument definitions using clap
//!
//! Commands:
//! - shelterdb ping
//! - shelterdb create <record>
//! - shelterdb read [query] [--projection <json>] [--limit <n>]
//! - shelterdb update <query> <fields>
//! - shelterdb delete <query>
//! - shelterdb serve [--host <host>] [--port <port>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// shelterdb - CRUD access and a dashboard for an animal shelter collection
#[derive(Parser, Debug)]
#[command(name = "shelterdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Use an in-memory collection instead of MongoDB
    #[arg(long, global = true)]
    pub memory: bool,

    /// JSON array of records to preload (with --memory)
    #[arg(long, global = true, requires = "memory")]
    pub seed: Option<PathBuf>,

    /// Log level or filter directive (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the liveness probe
    Ping,

    /// Insert one record
    Create {
        /// Record as a JSON object
        record: String,
    },

    /// Find matching records
    Read {
        /// Query as a JSON object (default: all records)
        #[arg(default_value = "{}")]
        query: String,

        /// Projection as a JSON object
        #[arg(long)]
        projection: Option<String>,

        /// Maximum records to return; 0 means no limit
        #[arg(long, default_value_t = 0)]
        limit: u64,
    },

    /// Merge fields into matching records
    Update {
        /// Query as a JSON object
        query: String,

        /// Fields to set, as a JSON object
        fields: String,
    },

    /// Remove matching records
    Delete {
        /// Query as a JSON object
        query: String,
    },

    /// Start the dashboard server
    Serve {
        /// Host to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_defaults() {
        let cli = Cli::try_parse_from(["shelterdb", "read"]).unwrap();
        match cli.command {
            Command::Read {
                query,
                projection,
                limit,
            } => {
                assert_eq!(query, "{}");
                assert!(projection.is_none());
                assert_eq!(limit, 0);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(!cli.memory);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["shelterdb", "ping", "--memory", "--log-json"]).unwrap();
        assert!(cli.memory);
        assert!(cli.log_json);
    }

    #[test]
    fn test_seed_requires_memory() {
        assert!(Cli::try_parse_from(["shelterdb", "--seed", "rows.json", "ping"]).is_err());
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::try_parse_from(["shelterdb", "serve", "--port", "9000"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Serve {
                host: None,
                port: Some(9000)
            }
        ));
    }
}
