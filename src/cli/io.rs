//! JSON I/O handling for CLI
//!
//! - Arguments carrying records or queries are JSON text
//! - Output is a single JSON document on stdout
//! - Seed files hold a JSON array of objects

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde_json::Value;

use super::errors::{CliError, CliResult};
use crate::store::Record;

/// Parse a JSON command argument. Shape checks are left to the store.
pub fn parse_json_arg(name: &str, text: &str) -> CliResult<Value> {
    serde_json::from_str(text)
        .map_err(|e| CliError::invalid_argument(format!("{} is not valid JSON: {}", name, e)))
}

/// Read seed records from a file
pub fn read_seed(path: &Path) -> CliResult<Vec<Record>> {
    let text = fs::read_to_string(path)
        .map_err(|e| CliError::io_error(format!("Failed to read seed file {:?}: {}", path, e)))?;
    let value: Value = serde_json::from_str(&text)
        .map_err(|e| CliError::io_error(format!("Invalid seed file {:?}: {}", path, e)))?;

    let items = match value {
        Value::Array(items) => items,
        _ => {
            return Err(CliError::io_error(format!(
                "Seed file {:?} must hold a JSON array",
                path
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(map) => Ok(map),
            _ => Err(CliError::io_error(format!(
                "Seed entry {} in {:?} is not an object",
                i, path
            ))),
        })
        .collect()
}

/// Write a JSON value to stdout
pub fn write_json(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_json_arg() {
        assert_eq!(parse_json_arg("query", r#"{"a": 1}"#).unwrap()["a"], 1);
        let err = parse_json_arg("query", "{a: 1}").unwrap_err();
        assert_eq!(err.code_str(), "SHELTER_CLI_INVALID_ARGUMENT");
        assert!(err.message().starts_with("query is not valid JSON"));
    }

    #[test]
    fn test_read_seed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seed.json");
        fs::write(&path, r#"[{"name": "Rex"}, {"name": "Max"}]"#).unwrap();

        let records = read_seed(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["name"], "Max");
    }

    #[test]
    fn test_read_seed_rejects_non_objects() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seed.json");
        fs::write(&path, r#"[{"name": "Rex"}, 7]"#).unwrap();
        assert!(read_seed(&path).is_err());

        fs::write(&path, r#"{"name": "Rex"}"#).unwrap();
        assert!(read_seed(&path).is_err());
    }
}
