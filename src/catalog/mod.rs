//! Aggregation catalog
//!
//! The catalog maps aggregation names to their definitions. It is built once
//! at startup, by [`CatalogLoader`] or [`CatalogBuilder`], and is read-only
//! afterwards: there is no way to mutate a `Catalog` once built, so it can
//! be shared across threads behind an `Arc` without locking.

mod errors;
mod loader;
mod types;

pub use errors::{CatalogError, CatalogResult, DefinitionError};
pub use loader::{CatalogLoader, DefinitionFormat};
pub use types::{AggregationSpec, StageSpec};

use std::collections::HashMap;
use std::fmt;

/// Read access to aggregation definitions by name
pub trait AggregationSource {
    fn aggregation(&self, name: &str) -> Option<&AggregationSpec>;
}

/// Immutable name → definition mapping
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    aggregations: HashMap<String, AggregationSpec>,
}

impl Catalog {
    /// Starts building a catalog
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Builds a catalog from definitions; a later definition replaces an
    /// earlier one with the same name
    pub fn from_specs(specs: impl IntoIterator<Item = AggregationSpec>) -> Self {
        specs
            .into_iter()
            .fold(Self::builder(), CatalogBuilder::add)
            .build()
    }

    pub fn get(&self, name: &str) -> Option<&AggregationSpec> {
        self.aggregations.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.aggregations.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.aggregations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aggregations.is_empty()
    }

    /// Aggregation names in lexical order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.aggregations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// All definitions, ordered by name
    pub fn iter(&self) -> impl Iterator<Item = &AggregationSpec> {
        self.names()
            .into_iter()
            .filter_map(move |name| self.aggregations.get(name))
    }

    /// Reports unknown operators and union stages that do not resolve.
    ///
    /// Findings are ordered by aggregation name, then stage index.
    pub fn validate(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();

        for spec in self.iter() {
            for (index, stage) in spec.stages.iter().enumerate() {
                let Some(operator) = stage.stage_operator() else {
                    issues.push(CatalogIssue::UnsupportedOperator {
                        aggregation: spec.name.clone(),
                        index,
                        operator: stage.operator.clone(),
                    });
                    continue;
                };

                if operator != crate::pipeline::StageOperator::UnionWith {
                    continue;
                }

                match stage.union_target() {
                    None => issues.push(CatalogIssue::MissingUnionTarget {
                        aggregation: spec.name.clone(),
                        index,
                    }),
                    Some(target) if !self.contains(target) => {
                        issues.push(CatalogIssue::DanglingUnion {
                            aggregation: spec.name.clone(),
                            index,
                            target: target.to_string(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        issues
    }
}

impl AggregationSource for Catalog {
    fn aggregation(&self, name: &str) -> Option<&AggregationSpec> {
        self.get(name)
    }
}

/// Accumulates definitions before freezing them into a [`Catalog`]
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    aggregations: HashMap<String, AggregationSpec>,
}

impl CatalogBuilder {
    /// Adds a definition, replacing any earlier one with the same name
    pub fn add(mut self, spec: AggregationSpec) -> Self {
        self.insert(spec);
        self
    }

    /// Adds a definition in place, returning the one it replaced
    pub fn insert(&mut self, spec: AggregationSpec) -> Option<AggregationSpec> {
        self.aggregations.insert(spec.name.clone(), spec)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.aggregations.contains_key(name)
    }

    pub fn build(self) -> Catalog {
        Catalog {
            aggregations: self.aggregations,
        }
    }
}

/// A problem found by [`Catalog::validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogIssue {
    /// Stage operator token not in the registry
    UnsupportedOperator {
        aggregation: String,
        index: usize,
        operator: String,
    },
    /// Union stage without a `pipeline` argument
    MissingUnionTarget { aggregation: String, index: usize },
    /// Union stage naming an aggregation that is not in the catalog
    DanglingUnion {
        aggregation: String,
        index: usize,
        target: String,
    },
}

impl CatalogIssue {
    pub fn aggregation(&self) -> &str {
        match self {
            CatalogIssue::UnsupportedOperator { aggregation, .. }
            | CatalogIssue::MissingUnionTarget { aggregation, .. }
            | CatalogIssue::DanglingUnion { aggregation, .. } => aggregation,
        }
    }
}

impl fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogIssue::UnsupportedOperator {
                aggregation,
                index,
                operator,
            } => write!(
                f,
                "{}#{}: operator '{}' is not supported",
                aggregation, index, operator
            ),
            CatalogIssue::MissingUnionTarget { aggregation, index } => write!(
                f,
                "{}#{}: union stage has no 'pipeline' argument",
                aggregation, index
            ),
            CatalogIssue::DanglingUnion {
                aggregation,
                index,
                target,
            } => write!(
                f,
                "{}#{}: union references unknown aggregation '{}'",
                aggregation, index, target
            ),
        }
    }
}
