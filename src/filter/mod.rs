//! Filter compiler subsystem
//!
//! Typed filters are explicit term sequences: each term declares the target
//! field, the operator token and the value. Callers implement [`ToFilter`]
//! for their own types or build a [`Filter`] directly.
//!
//! # Operator families
//!
//! - Comparison: `$eq`, `$ne`, `$gt`, `$gte`, `$lt`, `$lte` (any value)
//! - Membership: `$in`, `$nin` (array values only)
//! - Existence: `$exists` (boolean values only)

mod compiler;
mod operator;
mod term;

pub use compiler::{build_filter, compile_terms};
pub use operator::{FilterOperator, OperatorFamily};
pub use term::{is_zero_value, Filter, FilterBuilder, FilterTerm, ToFilter};
