//! Catalog loading errors
//!
//! An unreadable definition directory is fatal at startup. Per-file errors
//! are fatal only for strict loaders; otherwise the file is skipped.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::error::CompileError;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("aggregation directory '{path}' is unreadable: {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid aggregation in '{path}': {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: DefinitionError,
    },

    #[error("unsupported definition file '{path}'")]
    UnsupportedFormat { path: PathBuf },
}

impl CatalogError {
    /// True when the whole load must stop regardless of strictness
    pub fn is_fatal(&self) -> bool {
        matches!(self, CatalogError::DirectoryUnreadable { .. })
    }

    /// File or directory the error refers to
    pub fn path(&self) -> &Path {
        match self {
            CatalogError::DirectoryUnreadable { path, .. }
            | CatalogError::Read { path, .. }
            | CatalogError::Parse { path, .. }
            | CatalogError::Invalid { path, .. }
            | CatalogError::UnsupportedFormat { path } => path,
        }
    }
}

/// A definition that parsed but cannot be compiled
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DefinitionError {
    #[error("aggregation must have a name")]
    MissingName,

    #[error("aggregation '{name}' must name a collection")]
    MissingCollection { name: String },

    #[error("{0}")]
    UnsupportedOperator(#[source] CompileError),
}
