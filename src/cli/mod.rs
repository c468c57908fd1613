//! CLI module for shelterdb
//!
//! Provides command-line access to one collection:
//! - ping, create, read, update, delete: one-shot store operations
//! - serve: run the records dashboard

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{create, delete, open_store, read, run, run_command, serve, update, DynRecordStore};
pub use config::{AppConfig, PASSWORD_ENV, USERNAME_ENV};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_json_arg, read_seed, write_json};
