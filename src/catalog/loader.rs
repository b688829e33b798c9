//! Catalog loader for aggregation definitions on disk
//!
//! - One aggregation per file, `.yaml`/`.yml` or `.json`
//! - Files are read in lexical path order
//! - A missing or unreadable directory is fatal
//! - A malformed file is logged and skipped, unless the loader is strict
//! - Unknown stage operators are rejected here, at load time

use std::fs;
use std::path::{Path, PathBuf};

use crate::observability::Event;

use super::errors::{CatalogError, CatalogResult};
use super::types::AggregationSpec;
use super::{Catalog, CatalogBuilder};

/// Definition file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionFormat {
    Yaml,
    Json,
}

impl DefinitionFormat {
    /// Format implied by a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "yaml" | "yml" => Some(DefinitionFormat::Yaml),
            "json" => Some(DefinitionFormat::Json),
            _ => None,
        }
    }
}

/// Loads every aggregation definition in a directory into a [`Catalog`]
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    dir: PathBuf,
    strict: bool,
}

impl CatalogLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            strict: false,
        }
    }

    /// Abort on the first malformed definition instead of skipping it
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Loads all definitions.
    pub fn load(&self) -> CatalogResult<Catalog> {
        tracing::info!(
            event = %Event::CatalogLoadStart,
            dir = %self.dir.display(),
            strict = self.strict,
        );

        let mut builder = CatalogBuilder::default();
        let mut skipped = 0usize;

        for path in self.definition_files()? {
            match Self::load_file(&path) {
                Ok(spec) => {
                    let name = spec.name.clone();
                    if builder.insert(spec).is_some() {
                        tracing::warn!(
                            event = %Event::AggregationReplaced,
                            aggregation = %name,
                            file = %path.display(),
                        );
                    }
                    tracing::info!(
                        event = %Event::AggregationLoaded,
                        aggregation = %name,
                        file = %path.display(),
                    );
                }
                Err(e) if self.strict || e.is_fatal() => return Err(e),
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(
                        event = %Event::AggregationSkipped,
                        file = %e.path().display(),
                        error = %e,
                    );
                }
            }
        }

        let catalog = builder.build();

        for issue in catalog.validate() {
            tracing::warn!(
                event = %Event::CatalogIssue,
                aggregation = %issue.aggregation(),
                issue = %issue,
            );
        }

        tracing::info!(
            event = %Event::CatalogLoaded,
            aggregations = catalog.len(),
            skipped,
        );

        Ok(catalog)
    }

    /// Definition files in the directory, sorted by path
    fn definition_files(&self) -> CatalogResult<Vec<PathBuf>> {
        let unreadable = |source| CatalogError::DirectoryUnreadable {
            path: self.dir.clone(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(unreadable)? {
            let path = entry.map_err(unreadable)?.path();
            if path.is_file() && DefinitionFormat::from_path(&path).is_some() {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Reads, parses and validates one definition file
    pub fn load_file(path: &Path) -> CatalogResult<AggregationSpec> {
        let format = DefinitionFormat::from_path(path).ok_or_else(|| {
            CatalogError::UnsupportedFormat {
                path: path.to_path_buf(),
            }
        })?;

        let content = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let spec = Self::parse(&content, format).map_err(|message| CatalogError::Parse {
            path: path.to_path_buf(),
            message,
        })?;

        spec.validate_structure()
            .map_err(|source| CatalogError::Invalid {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(spec)
    }

    /// Parses one definition without validating it
    pub fn parse(content: &str, format: DefinitionFormat) -> Result<AggregationSpec, String> {
        match format {
            DefinitionFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            DefinitionFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        }
    }
}
