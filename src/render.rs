//! Relaxed extended JSON rendering of compiled pipelines and filters
//!
//! Used for log lines and for the `compile` command output. Rendering never
//! fails: a document that cannot be serialized renders as an empty string.

use bson::{Bson, Document};
use serde_json::{json, Value};

/// Each stage as a relaxed extended JSON value
pub fn pipeline_values(pipeline: &[Document]) -> Vec<Value> {
    pipeline
        .iter()
        .map(|stage| Bson::Document(stage.clone()).into_relaxed_extjson())
        .collect()
}

/// `{"pipeline": [...]}`, pretty printed on a fresh line
pub fn pipeline_to_json(pipeline: &[Document]) -> String {
    let stages = pipeline_values(pipeline);

    match serde_json::to_string_pretty(&json!({ "pipeline": stages })) {
        Ok(s) => format!("\n{}", s),
        Err(_) => String::new(),
    }
}

/// `{"filter": {...}}` on a single line
pub fn filter_to_json(filter: &Document) -> String {
    let value = Bson::Document(filter.clone()).into_relaxed_extjson();
    serde_json::to_string(&json!({ "filter": value })).unwrap_or_default()
}
