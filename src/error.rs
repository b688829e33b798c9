//! Compile error types shared by the filter and pipeline compilers
//!
//! Error codes:
//! - AGG_UNSUPPORTED_OPERATOR
//! - AGG_NOT_FOUND
//! - AGG_TYPE_MISMATCH
//! - AGG_CYCLE_DETECTED
//! - AGG_STRUCTURAL
//!
//! Every code is a compile-time rejection. Nothing in this layer performs I/O,
//! so none of them is retryable: the caller has to fix the catalog or the
//! parameters.

use std::fmt;

/// Compile error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompileErrorCode {
    /// Stage or filter operator token is not registered
    UnsupportedOperator,
    /// Aggregation name absent from the catalog
    NotFound,
    /// Bound parameter or filter value has the wrong shape for its operator
    TypeMismatch,
    /// Union references form a loop
    CycleDetected,
    /// Missing or malformed static argument
    Structural,
}

impl CompileErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            CompileErrorCode::UnsupportedOperator => "AGG_UNSUPPORTED_OPERATOR",
            CompileErrorCode::NotFound => "AGG_NOT_FOUND",
            CompileErrorCode::TypeMismatch => "AGG_TYPE_MISMATCH",
            CompileErrorCode::CycleDetected => "AGG_CYCLE_DETECTED",
            CompileErrorCode::Structural => "AGG_STRUCTURAL",
        }
    }

    /// True when the fault lies in static configuration rather than in the
    /// caller's parameters
    pub fn is_configuration(&self) -> bool {
        !matches!(self, CompileErrorCode::TypeMismatch)
    }
}

impl fmt::Display for CompileErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One stage on the path from the top-level aggregation to the failing stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTrace {
    /// Aggregation being compiled
    pub aggregation: String,
    /// Position of the stage in its aggregation
    pub index: usize,
    /// Parameter key of the stage, if any
    pub key: Option<String>,
    /// Operator token as declared
    pub operator: String,
}

impl fmt::Display for StageTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.aggregation, self.index)?;
        if let Some(key) = &self.key {
            write!(f, " key={}", key)?;
        }
        write!(f, " op={}", self.operator)
    }
}

/// Compile error with full context
#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    code: CompileErrorCode,
    message: String,
    field: Option<String>,
    operator: Option<String>,
    /// Innermost stage first
    trail: Vec<StageTrace>,
}

impl CompileError {
    fn new(code: CompileErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
            operator: None,
            trail: Vec::new(),
        }
    }

    /// Stage operator token not in the registry
    pub fn unsupported_stage_operator(key: Option<&str>, token: impl Into<String>) -> Self {
        let token = token.into();
        let message = match key {
            Some(k) => format!("operator '{}' of stage '{}' is not supported", token, k),
            None => format!("operator '{}' is not supported", token),
        };
        let mut err = Self::new(CompileErrorCode::UnsupportedOperator, message);
        err.operator = Some(token);
        err
    }

    /// Filter operator token with no handler
    pub fn unsupported_filter_operator(field: impl Into<String>, token: impl Into<String>) -> Self {
        let field = field.into();
        let token = token.into();
        let mut err = Self::new(
            CompileErrorCode::UnsupportedOperator,
            format!("operator '{}' not supported for field '{}'", token, field),
        );
        err.field = Some(field);
        err.operator = Some(token);
        err
    }

    /// Aggregation not in the catalog
    pub fn not_found(name: impl AsRef<str>) -> Self {
        Self::new(
            CompileErrorCode::NotFound,
            format!("aggregation '{}' not found", name.as_ref()),
        )
    }

    /// Generic shape mismatch
    pub fn type_mismatch(reason: impl Into<String>) -> Self {
        Self::new(CompileErrorCode::TypeMismatch, reason)
    }

    /// Shape mismatch on a filter field
    pub fn field_type_mismatch(
        field: impl Into<String>,
        operator: impl Into<String>,
        expected: &str,
    ) -> Self {
        let field = field.into();
        let operator = operator.into();
        let mut err = Self::new(
            CompileErrorCode::TypeMismatch,
            format!(
                "field '{}' operator '{}' requires a value of type {}",
                field, operator, expected
            ),
        );
        err.field = Some(field);
        err.operator = Some(operator);
        err
    }

    /// Union re-entered an aggregation already on the compile stack
    pub fn cycle_detected(path: &[&str]) -> Self {
        Self::new(
            CompileErrorCode::CycleDetected,
            format!("union cycle detected: {}", path.join(" -> ")),
        )
    }

    /// Missing or malformed static argument
    pub fn structural(reason: impl Into<String>) -> Self {
        Self::new(CompileErrorCode::Structural, reason)
    }

    /// Records the stage this error passed through while unwinding
    pub(crate) fn at_stage(mut self, trace: StageTrace) -> Self {
        if self.operator.is_none() {
            self.operator = Some(trace.operator.clone());
        }
        self.trail.push(trace);
        self
    }

    /// Returns the error code
    pub fn code(&self) -> CompileErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the filter field name if applicable
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns the offending operator token if known
    pub fn operator(&self) -> Option<&str> {
        self.operator.as_deref()
    }

    /// Stages the error unwound through, innermost first
    pub fn trail(&self) -> &[StageTrace] {
        &self.trail
    }

    /// The stage where the error originated
    pub fn origin(&self) -> Option<&StageTrace> {
        self.trail.first()
    }

    /// Compile errors are never retryable
    pub fn is_retryable(&self) -> bool {
        false
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if !self.trail.is_empty() {
            write!(f, " (at ")?;
            for (i, trace) in self.trail.iter().enumerate() {
                if i > 0 {
                    write!(f, " <- ")?;
                }
                write!(f, "{}", trace)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileError {}

/// Result type for compile operations
pub type CompileResult<T> = Result<T, CompileError>;
