//! Pipeline Compilation Invariant Tests
//!
//! - A definition of N stages compiles to exactly N single-key stages
//! - Stage order follows declaration order
//! - Unknown operators and names are rejected, never skipped
//! - Sort direction follows the declared order list
//! - Union stages embed the referenced aggregation; cycles are rejected
//! - Compilation is deterministic

use aggc::catalog::{AggregationSpec, Catalog, StageSpec};
use aggc::filter::{Filter, FilterTerm};
use aggc::{CompileErrorCode, Param, Params, PipelineCompiler};
use bson::{doc, Bson, Document};

// =============================================================================
// Helper Functions
// =============================================================================

fn orders_catalog() -> Catalog {
    Catalog::from_specs([
        AggregationSpec::new("recent-orders", "orders")
            .stage(StageSpec::new("$match").with_key("filter"))
            .stage(StageSpec::new("$sort").with_args(doc! {
                "order": [
                    { "field": "createdAt", "verse": "desc" },
                    { "field": "_id", "verse": "asc" },
                ]
            }))
            .stage(StageSpec::new("$skip").with_key("skip"))
            .stage(StageSpec::new("$limit").with_key("limit"))
            .stage(StageSpec::new("$project").with_args(doc! { "total": 1, "customer": 1 })),
        AggregationSpec::new("all-orders", "orders")
            .stage(StageSpec::new("$project").with_args(doc! { "_id": 1 }))
            .stage(
                StageSpec::new("$unionWith")
                    .with_key("archive")
                    .with_args(doc! { "pipeline": "archived-orders" }),
            ),
        AggregationSpec::new("archived-orders", "orders_archive")
            .stage(StageSpec::new("$limit").with_key("limit")),
    ])
}

fn adults() -> Filter {
    Filter::builder().gte("age", 18).build()
}

fn recent_params() -> Params {
    Params::new()
        .with("filter", Param::filter(adults()))
        .with("skip", Param::value(20))
        .with("limit", Param::value(10))
}

fn operator_of(stage: &Document) -> &str {
    assert_eq!(stage.len(), 1, "stage must have exactly one key: {}", stage);
    stage.keys().next().map(String::as_str).unwrap()
}

// =============================================================================
// Shape Tests
// =============================================================================

/// N declared stages produce N single-key stages in declaration order.
#[test]
fn test_stage_count_and_order() {
    let catalog = orders_catalog();
    let pipeline = PipelineCompiler::new(&catalog)
        .compile("recent-orders", &recent_params())
        .unwrap();

    let operators: Vec<&str> = pipeline.iter().map(operator_of).collect();
    assert_eq!(operators, ["$match", "$sort", "$skip", "$limit", "$project"]);
}

/// Full output of a realistic definition.
#[test]
fn test_recent_orders_pipeline() {
    let catalog = orders_catalog();
    let pipeline = PipelineCompiler::new(&catalog)
        .compile("recent-orders", &recent_params())
        .unwrap();

    assert_eq!(
        pipeline,
        vec![
            doc! { "$match": { "age": { "$gte": 18 } } },
            doc! { "$sort": { "createdAt": -1, "_id": 1 } },
            doc! { "$skip": 20 },
            doc! { "$limit": 10 },
            doc! { "$project": { "total": 1, "customer": 1 } },
        ]
    );
}

/// Sort keys keep the order of the declared list.
#[test]
fn test_sort_key_order() {
    let catalog = orders_catalog();
    let pipeline = PipelineCompiler::new(&catalog)
        .compile("recent-orders", &recent_params())
        .unwrap();

    let sort = pipeline[1].get_document("$sort").unwrap();
    let keys: Vec<&str> = sort.keys().map(String::as_str).collect();
    assert_eq!(keys, ["createdAt", "_id"]);
}

/// Only an exact "desc" verse sorts descending.
#[test]
fn test_sort_verse_values() {
    let catalog = Catalog::from_specs([AggregationSpec::new("s", "c").stage(
        StageSpec::new("$sort").with_args(doc! {
            "order": [
                { "field": "a", "verse": "desc" },
                { "field": "b", "verse": "DESC" },
                { "field": "c" },
            ]
        }),
    )]);

    let pipeline = PipelineCompiler::new(&catalog)
        .compile("s", &Params::new())
        .unwrap();
    assert_eq!(pipeline[0], doc! { "$sort": { "a": -1, "b": 1, "c": 1 } });
}

// =============================================================================
// Rejection Tests
// =============================================================================

/// An unknown operator fails the whole compilation.
#[test]
fn test_unknown_operator_rejected() {
    let catalog = Catalog::from_specs([AggregationSpec::new("bad", "c")
        .stage(StageSpec::new("$limit").with_key("limit"))
        .stage(StageSpec::new("$lookup").with_key("join"))]);

    let err = PipelineCompiler::new(&catalog)
        .compile("bad", &Params::new().with("limit", Param::value(1)))
        .unwrap_err();

    assert_eq!(err.code(), CompileErrorCode::UnsupportedOperator);
    assert_eq!(err.operator(), Some("$lookup"));
    assert_eq!(err.origin().map(|t| t.index), Some(1));
}

/// An unknown aggregation name is NotFound.
#[test]
fn test_unknown_name_rejected() {
    let catalog = orders_catalog();
    let err = PipelineCompiler::new(&catalog)
        .compile("does-not-exist", &Params::new())
        .unwrap_err();
    assert_eq!(err.code(), CompileErrorCode::NotFound);
}

/// Pass-through stages need a bound value.
#[test]
fn test_missing_pass_through_param() {
    let catalog = orders_catalog();
    let params = Params::new()
        .with("filter", Param::filter(adults()))
        .with("skip", Param::value(0));

    let err = PipelineCompiler::new(&catalog)
        .compile("recent-orders", &params)
        .unwrap_err();
    assert_eq!(err.code(), CompileErrorCode::TypeMismatch);
    assert_eq!(err.operator(), Some("$limit"));
}

/// A match stage bound to a plain value is a type mismatch.
#[test]
fn test_match_requires_filter() {
    let catalog = orders_catalog();
    let params = recent_params().with("filter", Param::value("age >= 18"));

    let err = PipelineCompiler::new(&catalog)
        .compile("recent-orders", &params)
        .unwrap_err();
    assert_eq!(err.code(), CompileErrorCode::TypeMismatch);
}

/// An unsupported filter operator inside a match stage fails compilation.
#[test]
fn test_unsupported_filter_operator_in_match() {
    let catalog = orders_catalog();
    let filter: Filter = [FilterTerm::new("name", "$regex", "^A")].into_iter().collect();
    let params = recent_params().with("filter", Param::filter(filter));

    let err = PipelineCompiler::new(&catalog)
        .compile("recent-orders", &params)
        .unwrap_err();
    assert_eq!(err.code(), CompileErrorCode::UnsupportedOperator);
    assert_eq!(err.field(), Some("name"));
}

// =============================================================================
// Union Tests
// =============================================================================

/// A union embeds the referenced aggregation with its nested parameters.
#[test]
fn test_union_embeds_nested_pipeline() {
    let catalog = orders_catalog();
    let params = Params::new().with("archive", Params::new().with("limit", Param::value(5)));

    let pipeline = PipelineCompiler::new(&catalog)
        .compile("all-orders", &params)
        .unwrap();

    assert_eq!(
        pipeline[1],
        doc! {
            "$unionWith": {
                "coll": "orders_archive",
                "pipeline": [ { "$limit": 5 } ],
            }
        }
    );
}

/// Errors from an embedded aggregation carry the outer stage in the trail.
#[test]
fn test_union_error_trail() {
    let catalog = orders_catalog();
    let err = PipelineCompiler::new(&catalog)
        .compile("all-orders", &Params::new())
        .unwrap_err();

    assert_eq!(err.code(), CompileErrorCode::TypeMismatch);
    let aggregations: Vec<&str> = err.trail().iter().map(|t| t.aggregation.as_str()).collect();
    assert_eq!(aggregations, ["archived-orders", "all-orders"]);
}

/// Mutually recursive unions are rejected instead of recursing forever.
#[test]
fn test_union_cycle_rejected() {
    let catalog = Catalog::from_specs([
        AggregationSpec::new("a", "ca")
            .stage(StageSpec::new("$unionWith").with_args(doc! { "pipeline": "b" })),
        AggregationSpec::new("b", "cb")
            .stage(StageSpec::new("$unionWith").with_args(doc! { "pipeline": "a" })),
    ]);

    let err = PipelineCompiler::new(&catalog)
        .compile("a", &Params::new())
        .unwrap_err();
    assert_eq!(err.code(), CompileErrorCode::CycleDetected);
    assert!(err.message().contains("a -> b -> a"), "{}", err.message());
}

/// The same aggregation may be embedded twice when it is not recursive.
#[test]
fn test_repeated_union_is_not_a_cycle() {
    let catalog = Catalog::from_specs([
        AggregationSpec::new("both", "c")
            .stage(StageSpec::new("$unionWith").with_args(doc! { "pipeline": "leaf" }))
            .stage(StageSpec::new("$unionWith").with_args(doc! { "pipeline": "leaf" })),
        AggregationSpec::new("leaf", "leaves")
            .stage(StageSpec::new("$project").with_args(doc! { "x": 1 })),
    ]);

    let pipeline = PipelineCompiler::new(&catalog)
        .compile("both", &Params::new())
        .unwrap();
    assert_eq!(pipeline.len(), 2);
    assert_eq!(pipeline[0], pipeline[1]);
}

// =============================================================================
// Determinism Tests
// =============================================================================

/// Same definition and parameters always produce the same pipeline.
#[test]
fn test_compilation_is_deterministic() {
    let catalog = orders_catalog();
    let compiler = PipelineCompiler::new(&catalog);
    let first = compiler.compile("recent-orders", &recent_params()).unwrap();

    for _ in 0..100 {
        assert_eq!(compiler.compile("recent-orders", &recent_params()).unwrap(), first);
    }
}

/// Static stages ignore bound parameters.
#[test]
fn test_static_stage_ignores_param() {
    let catalog = Catalog::from_specs([AggregationSpec::new("p", "c").stage(
        StageSpec::new("$project")
            .with_key("fields")
            .with_args(doc! { "a": 1 }),
    )]);

    let params = Params::new().with("fields", Param::value(Bson::Document(doc! { "b": 1 })));
    let pipeline = PipelineCompiler::new(&catalog).compile("p", &params).unwrap();
    assert_eq!(pipeline[0], doc! { "$project": { "a": 1 } });
}
