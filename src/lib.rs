//! aggc - A catalog-driven aggregation pipeline compiler
//!
//! Named aggregations are declared as ordered stage lists and compiled,
//! together with caller parameters, into native MongoDB pipelines. Typed
//! filter values compile into native filter documents.
//!
//! Compilation is pure: it never touches the database. Execution goes
//! through an [`gateway::ExecutionGateway`].

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod observability;
pub mod pipeline;
pub mod render;

pub use catalog::{AggregationSpec, Catalog, StageSpec};
pub use error::{CompileError, CompileErrorCode, CompileResult};
pub use filter::{build_filter, Filter, ToFilter};
pub use pipeline::{Param, Params, PipelineCompiler};
