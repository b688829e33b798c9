//! Parameter bindings from JSON
//!
//! - A JSON object becomes a nested parameter mapping
//! - An object whose only key is `$filter` becomes a typed filter; its value
//!   is a list of `{field, operator, value, omitempty}` terms
//! - Anything else becomes a plain value

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::filter::{Filter, FilterTerm};
use crate::pipeline::{Param, Params};

use super::errors::{CliError, CliResult};

const FILTER_KEY: &str = "$filter";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TermJson {
    #[serde(default)]
    field: Option<String>,
    #[serde(default)]
    operator: Option<String>,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    omitempty: bool,
}

/// Converts a JSON object into parameter bindings
pub fn params_from_json(value: &Value) -> CliResult<Params> {
    match value {
        Value::Object(map) => params_from_object(map),
        _ => Err(CliError::params_error("parameters must be a JSON object")),
    }
}

fn params_from_object(map: &Map<String, Value>) -> CliResult<Params> {
    let mut params = Params::new();
    for (key, value) in map {
        params.insert(key.clone(), param_from_json(value)?);
    }
    Ok(params)
}

fn param_from_json(value: &Value) -> CliResult<Param> {
    match value {
        Value::Object(map) if map.len() == 1 && map.contains_key(FILTER_KEY) => {
            filter_from_json(&map[FILTER_KEY]).map(Param::from)
        }
        Value::Object(map) => params_from_object(map).map(Param::Params),
        other => to_bson(other).map(Param::Value),
    }
}

fn filter_from_json(value: &Value) -> CliResult<Filter> {
    let terms: Vec<TermJson> = serde_json::from_value(value.clone())
        .map_err(|e| CliError::params_error(format!("invalid $filter terms: {}", e)))?;

    terms
        .into_iter()
        .map(|term| -> CliResult<FilterTerm> {
            Ok(FilterTerm {
                target_field: term.field,
                operator: term.operator,
                value: to_bson(&term.value)?,
                omit_when_empty: term.omitempty,
            })
        })
        .collect()
}

fn to_bson(value: &Value) -> CliResult<bson::Bson> {
    bson::to_bson(value).map_err(|e| CliError::params_error(format!("unsupported value: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::build_filter;
    use bson::{doc, Bson};
    use serde_json::json;

    #[test]
    fn test_values_and_nested_params() {
        let params = params_from_json(&json!({
            "limit": 10,
            "archive": { "skip": 5 }
        }))
        .unwrap();

        assert_eq!(
            params.get("limit").and_then(Param::to_bson),
            Some(Bson::Int64(10))
        );
        let nested = params.get("archive").and_then(Param::as_params).unwrap();
        assert!(nested.get("skip").is_some());
    }

    #[test]
    fn test_filter_param() {
        let params = params_from_json(&json!({
            "filter": { "$filter": [
                { "field": "age", "operator": "$gte", "value": 18 },
                { "field": "name", "operator": "$eq", "value": "", "omitempty": true },
                { "value": "untagged" }
            ]}
        }))
        .unwrap();

        let filter = params.get("filter").and_then(Param::as_filter).unwrap();
        assert_eq!(
            build_filter(filter).unwrap(),
            doc! { "age": { "$gte": Bson::Int64(18) } }
        );
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(params_from_json(&json!([1, 2])).is_err());
        assert!(params_from_json(&json!({ "f": { "$filter": "nope" } })).is_err());
    }
}
