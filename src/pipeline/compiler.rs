//! Pipeline compiler
//!
//! Compiles a named aggregation into its native pipeline:
//!
//! 1. Look the aggregation up in the catalog
//! 2. For each stage, in declared order, resolve the bound parameter by the
//!    stage's key (absence is not an error) and dispatch to the registry
//! 3. Append each stage document to the output
//!
//! The first failing stage aborts the compile; no partial pipeline is ever
//! returned. Union stages re-enter the compiler for the aggregation they
//! embed. Each top-level call keeps its own stack of the aggregations being
//! compiled, and an aggregation that reappears on that stack is a cycle.

use bson::Document;

use crate::catalog::{AggregationSource, AggregationSpec, Catalog, StageSpec};
use crate::error::{CompileError, CompileResult, StageTrace};
use crate::observability::Event;

use super::operator::{NestedCompiler, StageOperator};
use super::params::Params;

/// Ordered stage documents, in execution order
pub type CompiledPipeline = Vec<Document>;

/// Compiles aggregations from an [`AggregationSource`]
#[derive(Debug, Clone, Copy)]
pub struct PipelineCompiler<'a, S: AggregationSource + ?Sized = Catalog> {
    source: &'a S,
}

impl<'a, S: AggregationSource + ?Sized> PipelineCompiler<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Compiles the named aggregation with the given bindings
    pub fn compile(&self, name: &str, params: &Params) -> CompileResult<CompiledPipeline> {
        self.compile_named(name, params).map(|(_, pipeline)| pipeline)
    }

    /// Like [`compile`](Self::compile), also returning the definition so the
    /// caller knows the target collection
    pub fn compile_named(
        &self,
        name: &str,
        params: &Params,
    ) -> CompileResult<(&'a AggregationSpec, CompiledPipeline)> {
        let source: &'a S = self.source;
        let spec = source
            .aggregation(name)
            .ok_or_else(|| CompileError::not_found(name))?;
        let pipeline = self.compile_spec(spec, params)?;
        Ok((spec, pipeline))
    }

    /// Compiles a definition that need not be registered in the source.
    /// Union stages still resolve against the source.
    pub fn compile_spec(
        &self,
        spec: &AggregationSpec,
        params: &Params,
    ) -> CompileResult<CompiledPipeline> {
        let mut frame = CompileFrame {
            source: self.source,
            active: Vec::new(),
        };

        match frame.compile_spec(spec, params) {
            Ok(pipeline) => {
                tracing::debug!(
                    event = %Event::PipelineCompiled,
                    aggregation = %spec.name,
                    collection = %spec.collection,
                    stages = pipeline.len(),
                );
                Ok(pipeline)
            }
            Err(e) => {
                tracing::debug!(
                    event = %Event::PipelineRejected,
                    aggregation = %spec.name,
                    code = %e.code(),
                    error = %e,
                );
                Err(e)
            }
        }
    }
}

/// State of one top-level compile call
struct CompileFrame<'a, S: ?Sized> {
    source: &'a S,
    /// Aggregations currently being compiled, outermost first
    active: Vec<String>,
}

impl<'a, S: AggregationSource + ?Sized> CompileFrame<'a, S> {
    fn compile_spec(
        &mut self,
        spec: &AggregationSpec,
        params: &Params,
    ) -> CompileResult<CompiledPipeline> {
        if self.active.iter().any(|name| name == &spec.name) {
            let mut path: Vec<&str> = self.active.iter().map(String::as_str).collect();
            path.push(&spec.name);
            return Err(CompileError::cycle_detected(&path));
        }

        self.active.push(spec.name.clone());
        let result = self.compile_stages(spec, params);
        self.active.pop();
        result
    }

    fn compile_stages(
        &mut self,
        spec: &AggregationSpec,
        params: &Params,
    ) -> CompileResult<CompiledPipeline> {
        let mut pipeline = Vec::with_capacity(spec.stages.len());

        for (index, stage) in spec.stages.iter().enumerate() {
            let document = self.compile_stage(stage, params).map_err(|e| {
                e.at_stage(StageTrace {
                    aggregation: spec.name.clone(),
                    index,
                    key: stage.key.clone(),
                    operator: stage.operator.clone(),
                })
            })?;
            pipeline.push(document);
        }

        Ok(pipeline)
    }

    fn compile_stage(&mut self, stage: &StageSpec, params: &Params) -> CompileResult<Document> {
        let operator = resolve_operator(stage)?;

        let param = stage.param_key().and_then(|key| params.get(key));

        operator.generate(&stage.args, param, self)
    }
}

impl<'a, S: AggregationSource + ?Sized> NestedCompiler for CompileFrame<'a, S> {
    fn compile_nested(
        &mut self,
        name: &str,
        params: &Params,
    ) -> CompileResult<(String, CompiledPipeline)> {
        let source = self.source;
        let spec = source
            .aggregation(name)
            .ok_or_else(|| CompileError::not_found(name))?;
        let pipeline = self.compile_spec(spec, params)?;
        Ok((spec.collection.clone(), pipeline))
    }
}

/// Resolves the operator of every stage, failing on the first unknown token.
/// The error's trail names the offending stage.
pub fn resolve_operators(spec: &AggregationSpec) -> CompileResult<Vec<StageOperator>> {
    spec.stages
        .iter()
        .enumerate()
        .map(|(index, stage)| {
            resolve_operator(stage).map_err(|e| {
                e.at_stage(StageTrace {
                    aggregation: spec.name.clone(),
                    index,
                    key: stage.key.clone(),
                    operator: stage.operator.clone(),
                })
            })
        })
        .collect()
}

fn resolve_operator(stage: &StageSpec) -> CompileResult<StageOperator> {
    stage
        .stage_operator()
        .ok_or_else(|| CompileError::unsupported_stage_operator(stage.param_key(), &stage.operator))
}
