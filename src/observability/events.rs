//! Observable events for aggc
//!
//! Every log line emitted by the library carries one of these as its
//! `event` field.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration file loaded and validated
    ConfigLoaded,

    // Catalog
    /// Catalog directory scan begins
    CatalogLoadStart,
    /// One aggregation definition accepted
    AggregationLoaded,
    /// One aggregation definition rejected and skipped
    AggregationSkipped,
    /// An accepted definition replaced an earlier one with the same name
    AggregationReplaced,
    /// Catalog-level validation finding
    CatalogIssue,
    /// Catalog fully populated
    CatalogLoaded,

    // Compilation
    /// Pipeline compiled
    PipelineCompiled,
    /// Pipeline compilation rejected the input
    PipelineRejected,
    /// Filter compiled
    FilterCompiled,

    // Execution gateway
    /// Compiled pipeline handed to the gateway
    AggregationDispatched,
    /// Compiled filter handed to the gateway
    FindDispatched,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::CatalogLoadStart => "CATALOG_LOAD_START",
            Event::AggregationLoaded => "AGGREGATION_LOADED",
            Event::AggregationSkipped => "AGGREGATION_SKIPPED",
            Event::AggregationReplaced => "AGGREGATION_REPLACED",
            Event::CatalogIssue => "CATALOG_ISSUE",
            Event::CatalogLoaded => "CATALOG_LOADED",

            Event::PipelineCompiled => "PIPELINE_COMPILED",
            Event::PipelineRejected => "PIPELINE_REJECTED",
            Event::FilterCompiled => "FILTER_COMPILED",

            Event::AggregationDispatched => "AGGREGATION_DISPATCHED",
            Event::FindDispatched => "FIND_DISPATCHED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
