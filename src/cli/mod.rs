//! CLI module for aggc
//!
//! Provides command-line interface for:
//! - validate: Load the catalog and report problems
//! - list: Show every aggregation with its collection
//! - compile: Print the native pipeline of one aggregation

mod args;
mod commands;
mod errors;
mod io;
mod params;

pub use args::{Cli, Command};
pub use commands::{compile, list, run, run_command, validate};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_params, write_json};
pub use params::params_from_json;
