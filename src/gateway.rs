//! Execution gateway seam
//!
//! The compiler never runs what it produces. An [`ExecutionGateway`] owns the
//! database side: connections, retries, timeouts and I/O errors. The
//! [`QueryService`] resolves the target collection, compiles, logs and hands
//! the result to the gateway.

use std::sync::Arc;

use bson::Document;
use thiserror::Error;

use crate::catalog::Catalog;
use crate::error::CompileError;
use crate::filter::{build_filter, ToFilter};
use crate::observability::Event;
use crate::pipeline::{CompiledPipeline, Params, PipelineCompiler};
use crate::render;

/// Runs compiled pipelines and filters against the database
pub trait ExecutionGateway {
    type Output;
    type Error: std::error::Error + 'static;

    fn aggregate(
        &self,
        collection: &str,
        pipeline: CompiledPipeline,
    ) -> Result<Self::Output, Self::Error>;

    fn find(&self, collection: &str, filter: Document) -> Result<Self::Output, Self::Error>;
}

/// Failure of a [`QueryService`] call
#[derive(Debug, Error)]
pub enum ServiceError<E: std::error::Error + 'static> {
    /// Input rejected by the compiler; not retryable
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Failure reported by the gateway
    #[error("gateway error: {0}")]
    Gateway(#[source] E),
}

impl<E: std::error::Error + 'static> ServiceError<E> {
    pub fn as_compile_error(&self) -> Option<&CompileError> {
        match self {
            ServiceError::Compile(e) => Some(e),
            ServiceError::Gateway(_) => None,
        }
    }
}

/// Compiles against a shared catalog and forwards to a gateway
pub struct QueryService<G> {
    catalog: Arc<Catalog>,
    gateway: G,
    log_pipelines: bool,
}

impl<G: ExecutionGateway> QueryService<G> {
    pub fn new(catalog: Arc<Catalog>, gateway: G) -> Self {
        Self {
            catalog,
            gateway,
            log_pipelines: false,
        }
    }

    /// Log every compiled pipeline at DEBUG instead of TRACE
    pub fn with_pipeline_logging(mut self, enabled: bool) -> Self {
        self.log_pipelines = enabled;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Compiles the named aggregation and runs it on its target collection
    pub fn execute_aggregation(
        &self,
        name: &str,
        params: &Params,
    ) -> Result<G::Output, ServiceError<G::Error>> {
        let (spec, pipeline) =
            PipelineCompiler::new(self.catalog.as_ref()).compile_named(name, params)?;

        if self.log_pipelines {
            tracing::debug!(
                event = %Event::AggregationDispatched,
                aggregation = %name,
                collection = %spec.collection,
                pipeline = %render::pipeline_to_json(&pipeline),
            );
        } else {
            tracing::trace!(
                event = %Event::AggregationDispatched,
                aggregation = %name,
                collection = %spec.collection,
                pipeline = %render::pipeline_to_json(&pipeline),
            );
        }

        self.gateway
            .aggregate(&spec.collection, pipeline)
            .map_err(ServiceError::Gateway)
    }

    /// Compiles a typed filter and runs it as a find on `collection`
    pub fn execute_find<F: ToFilter + ?Sized>(
        &self,
        collection: &str,
        filter: &F,
    ) -> Result<G::Output, ServiceError<G::Error>> {
        let document = build_filter(filter)?;

        tracing::trace!(
            event = %Event::FindDispatched,
            collection = %collection,
            filter = %render::filter_to_json(&document),
        );

        self.gateway
            .find(collection, document)
            .map_err(ServiceError::Gateway)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AggregationSpec, StageSpec};
    use crate::error::CompileErrorCode;
    use crate::filter::Filter;
    use crate::pipeline::Param;
    use bson::doc;
    use std::cell::RefCell;
    use std::fmt;

    #[derive(Debug)]
    struct Unavailable;

    impl fmt::Display for Unavailable {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "database unavailable")
        }
    }

    impl std::error::Error for Unavailable {}

    #[derive(Debug, PartialEq)]
    enum Call {
        Aggregate(String, CompiledPipeline),
        Find(String, Document),
    }

    #[derive(Default)]
    struct RecordingGateway {
        calls: RefCell<Vec<Call>>,
        fail: bool,
    }

    impl ExecutionGateway for RecordingGateway {
        type Output = usize;
        type Error = Unavailable;

        fn aggregate(&self, collection: &str, pipeline: CompiledPipeline) -> Result<usize, Unavailable> {
            if self.fail {
                return Err(Unavailable);
            }
            let len = pipeline.len();
            self.calls
                .borrow_mut()
                .push(Call::Aggregate(collection.to_string(), pipeline));
            Ok(len)
        }

        fn find(&self, collection: &str, filter: Document) -> Result<usize, Unavailable> {
            if self.fail {
                return Err(Unavailable);
            }
            let len = filter.len();
            self.calls
                .borrow_mut()
                .push(Call::Find(collection.to_string(), filter));
            Ok(len)
        }
    }

    fn catalog() -> Arc<Catalog> {
        Arc::new(Catalog::from_specs([AggregationSpec::new("recent", "orders")
            .stage(StageSpec::new("$limit").with_key("limit"))]))
    }

    #[test]
    fn test_aggregation_forwarded_to_target_collection() {
        let service = QueryService::new(catalog(), RecordingGateway::default())
            .with_pipeline_logging(true);

        let out = service
            .execute_aggregation("recent", &Params::new().with("limit", Param::value(5)))
            .unwrap();

        assert_eq!(out, 1);
        assert_eq!(
            *service.gateway().calls.borrow(),
            vec![Call::Aggregate("orders".into(), vec![doc! { "$limit": 5 }])]
        );
    }

    #[test]
    fn test_compile_failure_never_reaches_gateway() {
        let service = QueryService::new(catalog(), RecordingGateway::default());

        let err = service.execute_aggregation("recent", &Params::new()).unwrap_err();
        assert_eq!(
            err.as_compile_error().map(|e| e.code()),
            Some(CompileErrorCode::TypeMismatch)
        );

        let err = service.execute_aggregation("nope", &Params::new()).unwrap_err();
        assert_eq!(
            err.as_compile_error().map(|e| e.code()),
            Some(CompileErrorCode::NotFound)
        );

        assert!(service.gateway().calls.borrow().is_empty());
    }

    #[test]
    fn test_find_forwards_compiled_filter() {
        let service = QueryService::new(catalog(), RecordingGateway::default());
        let filter = Filter::builder().gte("age", 18).build();

        service.execute_find("users", &filter).unwrap();
        assert_eq!(
            *service.gateway().calls.borrow(),
            vec![Call::Find("users".into(), doc! { "age": { "$gte": 18 } })]
        );
    }

    #[test]
    fn test_gateway_error_wrapped() {
        let gateway = RecordingGateway {
            fail: true,
            ..Default::default()
        };
        let service = QueryService::new(catalog(), gateway);

        let err = service
            .execute_find("users", &Filter::new())
            .unwrap_err();
        assert!(matches!(err, ServiceError::Gateway(Unavailable)));
        assert_eq!(err.to_string(), "gateway error: database unavailable");
    }
}
