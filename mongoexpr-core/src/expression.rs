//! Tagged expression values and the ordered expression map shared by all builders.
//!
//! Builders accumulate [`Expression`] values instead of plain BSON so that embedded
//! filters and operators stay structured until they are serialized. Resolution to
//! [`Bson`] happens in [`Expression::resolve`], which is a pure read.

use bson::{Bson, Document};
use indexmap::IndexMap;

use crate::{filter::Filter, operator::Operator};

/// An insertion-ordered map of keys to expression values.
///
/// Overwriting an existing key keeps its original position, so serialized documents
/// are deterministic.
pub type ExpressionMap = IndexMap<String, Expression>;

/// A value stored inside an expression document.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A scalar or pre-built BSON value.
    Value(Bson),
    /// An ordered sequence of expressions.
    Array(Vec<Expression>),
    /// A nested expression document.
    Document(ExpressionMap),
    /// An embedded filter, resolved to its document.
    Filter(Box<Filter>),
    /// An embedded operator, resolved to its value.
    Operator(Operator),
}

impl Expression {
    /// Wraps an operator in a single-key document `{ name: value }`.
    pub fn keyed(operator: Operator) -> Self {
        let mut map = ExpressionMap::new();
        map.insert(operator.name().to_string(), Expression::Operator(operator));
        Expression::Document(map)
    }

    /// Resolves this expression into plain BSON.
    pub fn resolve(&self) -> Bson {
        match self {
            Expression::Value(value) => value.clone(),
            Expression::Array(items) => Bson::Array(items.iter().map(Expression::resolve).collect()),
            Expression::Document(map) => Bson::Document(resolve_map(map)),
            Expression::Filter(filter) => Bson::Document(filter.to_document()),
            Expression::Operator(operator) => operator.resolve(),
        }
    }
}

impl From<Bson> for Expression {
    fn from(value: Bson) -> Self {
        Expression::Value(value)
    }
}

impl From<Filter> for Expression {
    fn from(filter: Filter) -> Self {
        Expression::Filter(Box::new(filter))
    }
}

impl From<Operator> for Expression {
    fn from(operator: Operator) -> Self {
        Expression::Operator(operator)
    }
}

/// Resolves every value of an expression map, preserving key order.
pub fn resolve_map(map: &ExpressionMap) -> Document {
    map.iter()
        .map(|(key, value)| (key.clone(), value.resolve()))
        .collect()
}

/// Inserts `key: value` into the sub-document stored under `scope`.
///
/// The sub-document is created on first use. A non-document value already stored
/// under `scope` is replaced.
pub(crate) fn insert_scoped(
    map: &mut ExpressionMap,
    scope: &str,
    key: impl Into<String>,
    value: Expression,
) {
    let slot = map
        .entry(scope.to_string())
        .or_insert_with(|| Expression::Document(ExpressionMap::new()));

    match slot {
        Expression::Document(inner) => {
            inner.insert(key.into(), value);
        }
        other => {
            let mut inner = ExpressionMap::new();
            inner.insert(key.into(), value);
            *other = Expression::Document(inner);
        }
    }
}

/// Appends `value` to the array stored under `key`, creating it on first use.
pub(crate) fn append(map: &mut ExpressionMap, key: &str, value: Expression) {
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Expression::Array(Vec::new()));

    match slot {
        Expression::Array(items) => items.push(value),
        other => *other = Expression::Array(vec![value]),
    }
}
