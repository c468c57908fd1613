//! CLI command implementations
//!
//! Every command builds one store, runs, and prints a JSON result. Backend
//! failures follow the store's lenient contract, so `read` against an
//! unhealthy server prints `[]` rather than failing.

use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::info;

use super::args::{Cli, Command};
use super::config::AppConfig;
use super::errors::{CliError, CliResult};
use super::io::{parse_json_arg, read_seed, write_json};
use crate::dashboard::{DashboardServer, DashboardState, LoginProbe};
use crate::observability::{init_tracing, Event};
use crate::store::{DocumentBackend, MemoryBackend, MongoBackend, RecordStore};

/// Store type used by the binary
pub type DynRecordStore = RecordStore<Box<dyn DocumentBackend>>;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    init_tracing(&cli.log_level, cli.log_json)?;

    let config = AppConfig::load(cli.config.as_deref())?;
    info!(
        event = %Event::ConfigLoaded,
        uri = %config.store.connection_uri_redacted(),
        memory = cli.memory,
        "{}",
        Event::ConfigLoaded.message()
    );

    let (store, login) = open_store(&config, cli.memory, cli.seed.as_deref())?;
    run_command(cli.command, store, login, &config)
}

/// Build the store and the matching login probe
pub fn open_store(
    config: &AppConfig,
    memory: bool,
    seed: Option<&Path>,
) -> CliResult<(DynRecordStore, LoginProbe)> {
    config.store.validate()?;

    if memory {
        let records = match seed {
            Some(path) => read_seed(path)?,
            None => Vec::new(),
        };
        let backend = MemoryBackend::with_records(records)?;
        let login = LoginProbe::memory(config.store.clone(), backend.clone());
        let store = RecordStore::with_backend(&config.store, Box::new(backend) as Box<dyn DocumentBackend>)?;
        Ok((store, login))
    } else {
        let backend = MongoBackend::connect(&config.store)?;
        let login = LoginProbe::mongo(config.store.clone());
        let store = RecordStore::with_backend(&config.store, Box::new(backend) as Box<dyn DocumentBackend>)?;
        Ok((store, login))
    }
}

/// Run the appropriate command against an open store
pub fn run_command(
    cmd: Command,
    store: DynRecordStore,
    login: LoginProbe,
    config: &AppConfig,
) -> CliResult<()> {
    match cmd {
        Command::Ping => write_json(&Value::Object(store.ping())),
        Command::Create { record } => create(&store, &record),
        Command::Read {
            query,
            projection,
            limit,
        } => read(&store, &query, projection.as_deref(), limit),
        Command::Update { query, fields } => update(&store, &query, &fields),
        Command::Delete { query } => delete(&store, &query),
        Command::Serve { host, port } => serve(store, login, config, host, port),
    }
}

/// Insert one record
pub fn create(store: &DynRecordStore, record: &str) -> CliResult<()> {
    let record = parse_json_arg("record", record)?;
    let created = store.create(record)?;
    write_json(&json!({ "created": created }))
}

/// Find matching records
pub fn read(
    store: &DynRecordStore,
    query: &str,
    projection: Option<&str>,
    limit: u64,
) -> CliResult<()> {
    let query = parse_json_arg("query", query)?;
    let projection = projection
        .map(|p| parse_json_arg("projection", p))
        .transpose()?;

    let records = store.read(&query, projection.as_ref(), limit)?;
    write_json(&Value::Array(records.into_iter().map(Value::Object).collect()))
}

/// Merge fields into matching records
pub fn update(store: &DynRecordStore, query: &str, fields: &str) -> CliResult<()> {
    let query = parse_json_arg("query", query)?;
    let fields = parse_json_arg("fields", fields)?;
    let modified = store.update(&query, &fields)?;
    write_json(&json!({ "modified": modified }))
}

/// Remove matching records
pub fn delete(store: &DynRecordStore, query: &str) -> CliResult<()> {
    let query = parse_json_arg("query", query)?;
    let deleted = store.delete(&query)?;
    write_json(&json!({ "deleted": deleted }))
}

/// Serve the dashboard until interrupted
pub fn serve(
    store: DynRecordStore,
    login: LoginProbe,
    config: &AppConfig,
    host: Option<String>,
    port: Option<u16>,
) -> CliResult<()> {
    let mut dashboard = config.dashboard.clone();
    if let Some(host) = host {
        dashboard.host = host;
    }
    if let Some(port) = port {
        dashboard.port = port;
    }

    let state = Arc::new(DashboardState::new(store, login));
    let server = DashboardServer::with_config(dashboard, state);

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::serve_failed(format!("Failed to start runtime: {}", e)))?;
    runtime
        .block_on(server.start())
        .map_err(|e| CliError::serve_failed(e.to_string()))
}
