//! CLI command implementations
//!
//! Every command follows the same boot sequence:
//! 1. Load and validate the configuration file
//! 2. Install the log subscriber at the configured level
//! 3. Load the catalog from the configured directory
//!
//! Results are written to stdout as JSON; logs go to stderr.

use std::path::Path;

use serde_json::{json, Value};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::observability::{init_logging, Event};
use crate::pipeline::{Params, PipelineCompiler};
use crate::render;

use super::args::Command;
use super::errors::CliResult;
use super::io::{read_params, write_json};
use super::CliError;

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Validate { config } => validate(&config),
        Command::List { config } => list(&config),
        Command::Compile {
            config,
            name,
            params,
        } => compile(&config, &name, params.as_deref()),
    }
}

fn boot(config_path: &Path) -> CliResult<(Config, Catalog)> {
    let config = Config::load(config_path)?;
    init_logging(config.level()?);

    tracing::info!(
        event = %Event::ConfigLoaded,
        path = %config_path.display(),
        aggregations_dir = %config.aggregations_dir.display(),
    );

    let catalog = config.catalog_loader().load()?;
    Ok((config, catalog))
}

/// Load the catalog and report problems
pub fn validate(config_path: &Path) -> CliResult<()> {
    let (_, catalog) = boot(config_path)?;
    let report = validation_report(&catalog);
    write_json(&report)?;

    let issues = catalog.validate().len();
    if issues > 0 {
        return Err(CliError::catalog_invalid(issues));
    }
    Ok(())
}

/// List the aggregations in the catalog
pub fn list(config_path: &Path) -> CliResult<()> {
    let (_, catalog) = boot(config_path)?;
    write_json(&listing(&catalog))
}

/// Compile one aggregation and print its pipeline
pub fn compile(config_path: &Path, name: &str, params_path: Option<&Path>) -> CliResult<()> {
    let (config, catalog) = boot(config_path)?;

    let params = match params_path {
        Some(path) => read_params(path)?,
        None => Params::new(),
    };

    let output = compiled(&catalog, name, &params)?;
    if config.log_pipelines {
        tracing::debug!(
            event = %Event::PipelineCompiled,
            aggregation = %name,
            pipeline = %output["pipeline"],
        );
    }

    write_json(&output)
}

fn validation_report(catalog: &Catalog) -> Value {
    let issues: Vec<String> = catalog.validate().iter().map(ToString::to_string).collect();
    json!({
        "aggregations": catalog.len(),
        "issues": issues,
    })
}

fn listing(catalog: &Catalog) -> Value {
    let entries: Vec<Value> = catalog
        .iter()
        .map(|spec| {
            json!({
                "name": spec.name,
                "collection": spec.collection,
                "stages": spec.stages.len(),
            })
        })
        .collect();
    Value::Array(entries)
}

fn compiled(catalog: &Catalog, name: &str, params: &Params) -> CliResult<Value> {
    let (spec, pipeline) = PipelineCompiler::new(catalog).compile_named(name, params)?;

    Ok(json!({
        "aggregation": spec.name,
        "collection": spec.collection,
        "pipeline": render::pipeline_values(&pipeline),
    }))
}
