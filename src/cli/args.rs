//! CLI argument definitions using clap
//!
//! Commands:
//! - aggc validate --config <path>
//! - aggc list --config <path>
//! - aggc compile --config <path> --name <aggregation> [--params <file>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// aggc - compile declarative aggregations into native pipelines
#[derive(Parser, Debug)]
#[command(name = "aggc")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load the catalog and report problems
    Validate {
        /// Path to configuration file
        #[arg(long, default_value = "./aggc.json")]
        config: PathBuf,
    },

    /// List the aggregations in the catalog
    List {
        /// Path to configuration file
        #[arg(long, default_value = "./aggc.json")]
        config: PathBuf,
    },

    /// Compile one aggregation and print its pipeline
    Compile {
        /// Path to configuration file
        #[arg(long, default_value = "./aggc.json")]
        config: PathBuf,

        /// Aggregation name
        #[arg(long)]
        name: String,

        /// JSON file with parameter bindings
        #[arg(long)]
        params: Option<PathBuf>,
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
    fn test_parse_compile() {
        let cli = Cli::parse_from(["aggc", "compile", "--name", "orders", "--params", "p.json"]);
        match cli.command {
            Command::Compile {
                config,
                name,
                params,
            } => {
                assert_eq!(config, PathBuf::from("./aggc.json"));
                assert_eq!(name, "orders");
                assert_eq!(params, Some(PathBuf::from("p.json")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_compile_requires_name() {
        assert!(Cli::try_parse_from(["aggc", "compile"]).is_err());
    }
}
