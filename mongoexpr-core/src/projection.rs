//! Field-inclusion and field-exclusion documents.
//!
//! MongoDB rejects projections that mix inclusion and exclusion, except for `_id`.
//! [`Projection`] does not check this; keeping a projection consistent is up to the
//! caller.

use bson::{Bson, Document};
use serde::{Serialize, Serializer};

use crate::{
    expression::{Expression, ExpressionMap, resolve_map},
    filter::Filter,
    operator::{ElemMatch, Meta, Operator, Slice},
};

/// A builder for projection documents. Setting the same field twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    expressions: ExpressionMap,
}

impl Projection {
    pub fn new() -> Self {
        Projection::default()
    }

    /// Creates a nested filter for [`Projection::select_elem_match`].
    pub fn new_filter(&self) -> Filter {
        Filter::nested()
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    /// Includes `field` (`1`).
    pub fn select(mut self, field: impl Into<String>) -> Self {
        self.expressions.insert(field.into(), Bson::Int32(1).into());
        self
    }

    /// Excludes `field` (`0`).
    pub fn ignore(mut self, field: impl Into<String>) -> Self {
        self.expressions.insert(field.into(), Bson::Int32(0).into());
        self
    }

    /// Includes only the first array element matched by the query (`field.$`).
    pub fn select_dollar(self, field: impl Into<String>) -> Self {
        let field = field.into();
        self.select(format!("{field}.$"))
    }

    /// Includes only the first array element matching `filter` (`$elemMatch`).
    pub fn select_elem_match(self, field: impl Into<String>, filter: Filter) -> Self {
        self.operator(field, ElemMatch::new(filter))
    }

    /// Includes the text search score (`$meta: "textScore"`).
    pub fn select_meta(self, field: impl Into<String>) -> Self {
        self.operator(field, Meta::text_score())
    }

    /// Includes `limit` array elements after skipping `skip` (`$slice`).
    pub fn select_slice(self, field: impl Into<String>, limit: i32, skip: i32) -> Self {
        self.operator(field, Slice::new(limit, skip))
    }

    /// Resolves the projection into a plain BSON document.
    pub fn to_document(&self) -> Document {
        resolve_map(&self.expressions)
    }

    fn operator(mut self, field: impl Into<String>, operator: impl Into<Operator>) -> Self {
        self.expressions
            .insert(field.into(), Expression::keyed(operator.into()));
        self
    }
}

impl From<Projection> for Document {
    fn from(projection: Projection) -> Self {
        projection.to_document()
    }
}

impl From<&Projection> for Document {
    fn from(projection: &Projection) -> Self {
        projection.to_document()
    }
}

impl Serialize for Projection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}
