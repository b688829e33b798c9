//! Runtime parameter bindings
//!
//! Parameters are supplied per compile call and looked up by each stage's
//! parameter key. A binding is a raw value, a typed filter, or a nested
//! mapping consumed by a union stage.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use bson::{Bson, Document};

use crate::filter::ToFilter;

/// One bound parameter
#[derive(Clone)]
pub enum Param {
    /// A raw value, passed through unchanged
    Value(Bson),
    /// A typed filter for `$match` stages
    Filter(Arc<dyn ToFilter + Send + Sync>),
    /// Nested bindings for the aggregation named by a union stage
    Params(Params),
}

impl Param {
    pub fn value(value: impl Into<Bson>) -> Self {
        Param::Value(value.into())
    }

    pub fn filter<F: ToFilter + Send + Sync + 'static>(filter: F) -> Self {
        Param::Filter(Arc::new(filter))
    }

    pub fn as_filter(&self) -> Option<&(dyn ToFilter + Send + Sync)> {
        match self {
            Param::Filter(filter) => Some(filter.as_ref()),
            _ => None,
        }
    }

    pub fn as_params(&self) -> Option<&Params> {
        match self {
            Param::Params(params) => Some(params),
            _ => None,
        }
    }

    /// The binding as a document value, `None` for typed filters
    pub fn to_bson(&self) -> Option<Bson> {
        match self {
            Param::Value(value) => Some(value.clone()),
            Param::Filter(_) => None,
            Param::Params(params) => params.to_document().map(Bson::Document),
        }
    }

    /// Short shape name for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Param::Value(_) => "value",
            Param::Filter(_) => "filter",
            Param::Params(_) => "parameter mapping",
        }
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Param::Filter(filter) => f.debug_tuple("Filter").field(filter).finish(),
            Param::Params(params) => f.debug_tuple("Params").field(params).finish(),
        }
    }
}

impl From<Bson> for Param {
    fn from(value: Bson) -> Self {
        Param::Value(value)
    }
}

impl From<Params> for Param {
    fn from(params: Params) -> Self {
        Param::Params(params)
    }
}

impl From<crate::filter::Filter> for Param {
    fn from(filter: crate::filter::Filter) -> Self {
        Param::filter(filter)
    }
}

/// Parameter bindings for one compile call, keyed by parameter key
#[derive(Debug, Clone, Default)]
pub struct Params {
    entries: BTreeMap<String, Param>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a binding
    pub fn with(mut self, key: impl Into<String>, param: impl Into<Param>) -> Self {
        self.insert(key, param);
        self
    }

    /// Adds a binding, returning the one it replaced
    pub fn insert(&mut self, key: impl Into<String>, param: impl Into<Param>) -> Option<Param> {
        self.entries.insert(key.into(), param.into())
    }

    pub fn get(&self, key: &str) -> Option<&Param> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Param)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// All bindings as a document keyed in lexical order, `None` if any
    /// binding is a typed filter
    pub fn to_document(&self) -> Option<Document> {
        let mut document = Document::new();
        for (key, param) in &self.entries {
            document.insert(key.clone(), param.to_bson()?);
        }
        Some(document)
    }
}

impl<K: Into<String>, P: Into<Param>> FromIterator<(K, P)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, P)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, param) in iter {
            params.insert(key, param);
        }
        params
    }
}
