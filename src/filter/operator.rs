//! Filter comparison operators

use std::fmt;

use bson::Bson;

use crate::error::{CompileError, CompileResult};

/// Operator families with a shared value contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorFamily {
    /// Any value, wrapped as-is
    Comparison,
    /// Value must be an array
    Membership,
    /// Value must be a boolean
    Existence,
}

/// Supported filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Nin,
    Exists,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 9] = [
        FilterOperator::Eq,
        FilterOperator::Ne,
        FilterOperator::Gt,
        FilterOperator::Gte,
        FilterOperator::Lt,
        FilterOperator::Lte,
        FilterOperator::In,
        FilterOperator::Nin,
        FilterOperator::Exists,
    ];

    /// Resolves an operator token, `None` if no handler is registered
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.token() == token)
    }

    pub fn token(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "$eq",
            FilterOperator::Ne => "$ne",
            FilterOperator::Gt => "$gt",
            FilterOperator::Gte => "$gte",
            FilterOperator::Lt => "$lt",
            FilterOperator::Lte => "$lte",
            FilterOperator::In => "$in",
            FilterOperator::Nin => "$nin",
            FilterOperator::Exists => "$exists",
        }
    }

    pub fn family(&self) -> OperatorFamily {
        match self {
            FilterOperator::Eq
            | FilterOperator::Ne
            | FilterOperator::Gt
            | FilterOperator::Gte
            | FilterOperator::Lt
            | FilterOperator::Lte => OperatorFamily::Comparison,
            FilterOperator::In | FilterOperator::Nin => OperatorFamily::Membership,
            FilterOperator::Exists => OperatorFamily::Existence,
        }
    }

    /// Checks `value` against the operator's contract and returns the operand
    /// to place under the operator token
    pub fn operand(&self, field: &str, value: &Bson) -> CompileResult<Bson> {
        match (self.family(), value) {
            (OperatorFamily::Comparison, _) => Ok(value.clone()),
            (OperatorFamily::Membership, Bson::Array(_)) => Ok(value.clone()),
            (OperatorFamily::Membership, _) => {
                Err(CompileError::field_type_mismatch(field, self.token(), "array"))
            }
            (OperatorFamily::Existence, Bson::Boolean(b)) => Ok(Bson::Boolean(*b)),
            (OperatorFamily::Existence, _) => {
                Err(CompileError::field_type_mismatch(field, self.token(), "bool"))
            }
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}
