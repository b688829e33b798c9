//! Filter compiler
//!
//! Turns a typed filter into a query document. Terms are visited in declared
//! order; terms that share a target field are merged into one operator
//! document under that field, so `age >= 18` and `age <= 65` become
//! `{"age": {"$gte": 18, "$lte": 65}}`. When the same operator appears twice
//! for one field the later term wins.

use bson::{Bson, Document};

use crate::error::{CompileError, CompileResult};
use crate::observability::Event;
use crate::render;

use super::operator::FilterOperator;
use super::term::{FilterTerm, ToFilter};

/// Compiles a typed filter into a query document.
///
/// An absent filter is rejected with `TypeMismatch`.
pub fn build_filter<F: ToFilter + ?Sized>(filter: &F) -> CompileResult<Document> {
    let filter = filter
        .to_filter()
        .ok_or_else(|| CompileError::type_mismatch("filter value must not be nil"))?;

    let document = compile_terms(filter.terms())?;

    tracing::debug!(
        event = %Event::FilterCompiled,
        filter = %render::filter_to_json(&document),
    );

    Ok(document)
}

/// Compiles a slice of terms without the nil check
pub fn compile_terms(terms: &[FilterTerm]) -> CompileResult<Document> {
    let mut document = Document::new();

    for term in terms {
        let (Some(field), Some(token)) = (term.target_field.as_deref(), term.operator.as_deref())
        else {
            continue;
        };

        if term.omit_when_empty && term.is_zero() {
            continue;
        }

        let operator = FilterOperator::from_token(token)
            .ok_or_else(|| CompileError::unsupported_filter_operator(field, token))?;
        let operand = operator.operand(field, &term.value)?;

        match document.get_mut(field) {
            Some(Bson::Document(existing)) => {
                existing.insert(operator.token(), operand);
            }
            _ => {
                let mut sub = Document::new();
                sub.insert(operator.token(), operand);
                document.insert(field, sub);
            }
        }
    }

    Ok(document)
}
