//! aggc CLI entry point
//!
//! Parses arguments and dispatches to the CLI module. Errors go to stderr
//! and the process exits with a non-zero status.

use aggc::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
