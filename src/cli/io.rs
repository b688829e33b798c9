//! JSON I/O handling for CLI
//!
//! - Input: parameter bindings from a JSON file
//! - Output: one pretty-printed JSON value on stdout

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde_json::Value;

use crate::pipeline::Params;

use super::errors::{CliError, CliResult};
use super::params::params_from_json;

/// Read parameter bindings from a JSON file
pub fn read_params(path: &Path) -> CliResult<Params> {
    let content = fs::read_to_string(path).map_err(|e| {
        CliError::params_error(format!("failed to read '{}': {}", path.display(), e))
    })?;

    let value: Value = serde_json::from_str(&content).map_err(|e| {
        CliError::params_error(format!("invalid JSON in '{}': {}", path.display(), e))
    })?;

    params_from_json(&value)
}

/// Write a JSON value to stdout
pub fn write_json(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}
