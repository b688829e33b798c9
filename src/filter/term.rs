//! Filter terms and the typed filter abstraction
//!
//! A typed filter is an ordered sequence of terms. Each term names the target
//! document field, the comparison operator and the value, plus an optional
//! omit-when-empty marker. A term lacking either the target field or the
//! operator is an explicit opt-out and never reaches the compiled document.

use std::fmt;
use std::sync::Arc;

use bson::Bson;

use super::operator::FilterOperator;

/// One field-level contribution to a compiled filter
#[derive(Debug, Clone, PartialEq)]
pub struct FilterTerm {
    /// Document field the term targets
    pub target_field: Option<String>,
    /// Operator token, e.g. `$gte`
    pub operator: Option<String>,
    /// Value as carried by the filter
    pub value: Bson,
    /// Skip the term when `value` is the zero value of its type
    pub omit_when_empty: bool,
}

impl FilterTerm {
    /// Create a fully tagged term
    pub fn new(
        target_field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Bson>,
    ) -> Self {
        Self {
            target_field: Some(target_field.into()),
            operator: Some(operator.into()),
            value: value.into(),
            omit_when_empty: false,
        }
    }

    /// Create a term carrying a value but no tags; it is always skipped
    pub fn untagged(value: impl Into<Bson>) -> Self {
        Self {
            target_field: None,
            operator: None,
            value: value.into(),
            omit_when_empty: false,
        }
    }

    /// Marks the term as omit-when-empty
    pub fn omit_empty(mut self) -> Self {
        self.omit_when_empty = true;
        self
    }

    /// True when both the target field and the operator are declared
    pub fn is_tagged(&self) -> bool {
        self.target_field.is_some() && self.operator.is_some()
    }

    /// True when the value is the zero value of its type
    pub fn is_zero(&self) -> bool {
        is_zero_value(&self.value)
    }
}

/// Zero values: null, `false`, numeric zero, empty string, empty array and
/// empty document. Every other value, including dates and object ids, is
/// considered set.
pub fn is_zero_value(value: &Bson) -> bool {
    match value {
        Bson::Null => true,
        Bson::Boolean(b) => !b,
        Bson::Int32(i) => *i == 0,
        Bson::Int64(i) => *i == 0,
        Bson::Double(d) => *d == 0.0,
        Bson::String(s) => s.is_empty(),
        Bson::Array(items) => items.is_empty(),
        Bson::Document(doc) => doc.is_empty(),
        Bson::Binary(bin) => bin.bytes.is_empty(),
        _ => false,
    }
}

/// An ordered sequence of filter terms
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    terms: Vec<FilterTerm>,
}

impl Filter {
    /// Create an empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a filter
    pub fn builder() -> FilterBuilder {
        FilterBuilder::default()
    }

    /// Terms in declared order
    pub fn terms(&self) -> &[FilterTerm] {
        &self.terms
    }

    /// Appends a term
    pub fn push(&mut self, term: FilterTerm) {
        self.terms.push(term);
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl FromIterator<FilterTerm> for Filter {
    fn from_iter<I: IntoIterator<Item = FilterTerm>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}

/// Fluent construction of a [`Filter`]
#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    terms: Vec<FilterTerm>,
}

impl FilterBuilder {
    /// Adds a prepared term
    pub fn push(mut self, term: FilterTerm) -> Self {
        self.terms.push(term);
        self
    }

    /// Adds a term with an arbitrary operator token
    pub fn term(
        self,
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Bson>,
    ) -> Self {
        self.push(FilterTerm::new(field, operator, value))
    }

    /// Adds a term that is dropped when its value is empty
    pub fn term_omit_empty(
        self,
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Bson>,
    ) -> Self {
        self.push(FilterTerm::new(field, operator, value).omit_empty())
    }

    fn op(self, field: impl Into<String>, operator: FilterOperator, value: impl Into<Bson>) -> Self {
        self.term(field, operator.token(), value)
    }

    pub fn eq(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.op(field, FilterOperator::Eq, value)
    }

    pub fn ne(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.op(field, FilterOperator::Ne, value)
    }

    pub fn gt(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.op(field, FilterOperator::Gt, value)
    }

    pub fn gte(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.op(field, FilterOperator::Gte, value)
    }

    pub fn lt(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.op(field, FilterOperator::Lt, value)
    }

    pub fn lte(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.op(field, FilterOperator::Lte, value)
    }

    /// Membership in a list of values
    pub fn is_in<I, V>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        let values: Vec<Bson> = values.into_iter().map(Into::into).collect();
        self.op(field, FilterOperator::In, values)
    }

    /// Exclusion from a list of values
    pub fn not_in<I, V>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        let values: Vec<Bson> = values.into_iter().map(Into::into).collect();
        self.op(field, FilterOperator::Nin, values)
    }

    pub fn exists(self, field: impl Into<String>, exists: bool) -> Self {
        self.op(field, FilterOperator::Exists, exists)
    }

    pub fn build(self) -> Filter {
        Filter { terms: self.terms }
    }
}

/// A value that can be compiled into a filter document.
///
/// Returning `None` models an absent filter (a nil value or a nil reference)
/// and is rejected by the compiler.
pub trait ToFilter: fmt::Debug {
    fn to_filter(&self) -> Option<Filter>;
}

impl ToFilter for Filter {
    fn to_filter(&self) -> Option<Filter> {
        Some(self.clone())
    }
}

impl<T: ToFilter + ?Sized> ToFilter for &T {
    fn to_filter(&self) -> Option<Filter> {
        (**self).to_filter()
    }
}

impl<T: ToFilter + ?Sized> ToFilter for Box<T> {
    fn to_filter(&self) -> Option<Filter> {
        (**self).to_filter()
    }
}

impl<T: ToFilter + ?Sized> ToFilter for Arc<T> {
    fn to_filter(&self) -> Option<Filter> {
        (**self).to_filter()
    }
}

impl<T: ToFilter> ToFilter for Option<T> {
    fn to_filter(&self) -> Option<Filter> {
        self.as_ref().and_then(ToFilter::to_filter)
    }
}
