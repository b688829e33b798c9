//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero status.

use std::fmt;
use std::io;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::error::CompileError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// Catalog could not be loaded
    CatalogError,
    /// Catalog loaded but failed validation
    CatalogInvalid,
    /// Parameter file error, or parameters that do not fit the aggregation
    ParamsError,
    /// Compilation rejected the catalog definition
    CompileError,
    /// I/O error (stdout, files)
    IoError,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "AGGC_CLI_CONFIG_ERROR",
            Self::CatalogError => "AGGC_CLI_CATALOG_ERROR",
            Self::CatalogInvalid => "AGGC_CLI_CATALOG_INVALID",
            Self::ParamsError => "AGGC_CLI_PARAMS_ERROR",
            Self::CompileError => "AGGC_CLI_COMPILE_ERROR",
            Self::IoError => "AGGC_CLI_IO_ERROR",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Parameter file error
    pub fn params_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ParamsError, msg)
    }

    /// Catalog validation found problems
    pub fn catalog_invalid(issues: usize) -> Self {
        Self::new(
            CliErrorCode::CatalogInvalid,
            format!("catalog has {} problem(s)", issues),
        )
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(CliErrorCode::ConfigError, e.to_string())
    }
}

impl From<CatalogError> for CliError {
    fn from(e: CatalogError) -> Self {
        Self::new(CliErrorCode::CatalogError, e.to_string())
    }
}

impl From<CompileError> for CliError {
    fn from(e: CompileError) -> Self {
        let code = if e.code().is_configuration() {
            CliErrorCode::CompileError
        } else {
            CliErrorCode::ParamsError
        };
        Self::new(code, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
