//! Pipeline compiler subsystem
//!
//! Compiles catalog aggregations plus per-call parameters into native,
//! ordered aggregation pipelines.
//!
//! # Design Principles
//!
//! - Deterministic: same catalog and parameters → same pipeline
//! - Ordered: stage order is execution order and is preserved exactly
//! - Fail-fast: the first failing stage aborts, no partial pipeline
//! - Bounded: union recursion is guarded against cycles per call

mod compiler;
mod operator;
mod params;

pub use compiler::{resolve_operators, CompiledPipeline, PipelineCompiler};
pub use operator::{NestedCompiler, StageKind, StageOperator, SORT_ORDER_ARG, UNION_PIPELINE_ARG};
pub use params::{Param, Params};
