//! Aggregation definitions
//!
//! A definition file describes one aggregation:
//!
//! ```yaml
//! name: orders-by-customer
//! collection: orders
//! stages:
//!   - key: filter
//!     operator: $match
//!   - operator: $sort
//!     args:
//!       order:
//!         - field: createdAt
//!           verse: desc
//! ```

use bson::Document;
use serde::{Deserialize, Serialize};

use crate::pipeline::{resolve_operators, StageOperator};

use super::errors::DefinitionError;

/// One stage of an aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSpec {
    /// Key under which the caller binds this stage's runtime parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Operator token, e.g. `$match`
    pub operator: String,
    /// Static arguments
    #[serde(default, skip_serializing_if = "Document::is_empty")]
    pub args: Document,
}

impl StageSpec {
    pub fn new(operator: impl Into<String>) -> Self {
        Self {
            key: None,
            operator: operator.into(),
            args: Document::new(),
        }
    }

    /// Sets the parameter key
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets the static arguments
    pub fn with_args(mut self, args: Document) -> Self {
        self.args = args;
        self
    }

    /// Parameter key, treating an empty key as absent
    pub fn param_key(&self) -> Option<&str> {
        self.key.as_deref().filter(|k| !k.is_empty())
    }

    /// The registered operator, if the token is known
    pub fn stage_operator(&self) -> Option<StageOperator> {
        StageOperator::from_token(&self.operator)
    }

    /// Aggregation referenced by a union stage
    pub fn union_target(&self) -> Option<&str> {
        match self.stage_operator() {
            Some(StageOperator::UnionWith) => self.args.get_str("pipeline").ok(),
            _ => None,
        }
    }
}

/// A named, ordered sequence of stages targeting one collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationSpec {
    /// Unique name
    pub name: String,
    /// Target collection
    pub collection: String,
    /// Stages in execution order
    #[serde(default)]
    pub stages: Vec<StageSpec>,
}

impl AggregationSpec {
    pub fn new(name: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collection: collection.into(),
            stages: Vec::new(),
        }
    }

    /// Appends a stage
    pub fn stage(mut self, stage: StageSpec) -> Self {
        self.stages.push(stage);
        self
    }

    /// Validates the definition itself (not the references it makes)
    pub fn validate_structure(&self) -> Result<(), DefinitionError> {
        if self.name.trim().is_empty() {
            return Err(DefinitionError::MissingName);
        }

        if self.collection.trim().is_empty() {
            return Err(DefinitionError::MissingCollection {
                name: self.name.clone(),
            });
        }

        resolve_operators(self).map_err(DefinitionError::UnsupportedOperator)?;
        Ok(())
    }
}
