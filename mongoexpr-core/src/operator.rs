//! Operator values whose representation depends on accumulated modifier state.
//!
//! An [`Operator`] is a named payload. The plain variant is an immutable name/value
//! pair; the other variants carry modifiers (each-mode, slicing, sort order, position)
//! that are folded into the emitted value by [`Operator::resolve`] on every read.
//!
//! ```ignore
//! use mongoexpr::operator::Push;
//!
//! let push = Push::each_of([89, 92]).slice(-3).sort(SortDirection::Desc);
//! // resolves to { "$each": [89, 92], "$slice": -3, "$sort": -1 }
//! ```

use bson::{Bson, Document};
use indexmap::IndexMap;

use crate::{filter::Filter, query::SortDirection};

/// A named operator payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    /// A plain operator with a fixed value.
    Value {
        /// The operator name, e.g. `$inc`.
        name: String,
        /// The operator payload.
        value: Bson,
    },
    /// The `$addToSet` update operator.
    AddToSet(AddToSet),
    /// The `$push` update operator.
    Push(Push),
    /// The `$slice` projection operator.
    Slice(Slice),
    /// The `$elemMatch` projection operator.
    ElemMatch(ElemMatch),
    /// The `$meta` projection operator.
    Meta(Meta),
}

impl Operator {
    /// Creates a plain operator.
    pub fn new(name: impl Into<String>, value: impl Into<Bson>) -> Self {
        Operator::Value { name: name.into(), value: value.into() }
    }

    /// Returns the operator name, including the leading `$`.
    pub fn name(&self) -> &str {
        match self {
            Operator::Value { name, .. } => name,
            Operator::AddToSet(_) => "$addToSet",
            Operator::Push(_) => "$push",
            Operator::Slice(_) => "$slice",
            Operator::ElemMatch(_) => "$elemMatch",
            Operator::Meta(_) => "$meta",
        }
    }

    /// Computes the operator value from its current modifier state.
    pub fn resolve(&self) -> Bson {
        match self {
            Operator::Value { value, .. } => value.clone(),
            Operator::AddToSet(op) => op.resolve(),
            Operator::Push(op) => op.resolve(),
            Operator::Slice(op) => op.resolve(),
            Operator::ElemMatch(op) => op.resolve(),
            Operator::Meta(op) => op.resolve(),
        }
    }

    /// Returns the single-key document `{ name: value }`.
    pub fn to_document(&self) -> Document {
        let mut document = Document::new();
        document.insert(self.name(), self.resolve());
        document
    }
}

/// The `$addToSet` operator, optionally in each-mode.
#[derive(Debug, Clone, PartialEq)]
pub struct AddToSet {
    value: Bson,
    each: bool,
}

impl AddToSet {
    /// Adds a single value.
    pub fn new(value: impl Into<Bson>) -> Self {
        AddToSet { value: value.into(), each: false }
    }

    /// Adds every value of `values`, using each-mode.
    pub fn each_of<V: Into<Bson>>(values: impl IntoIterator<Item = V>) -> Self {
        AddToSet::new(collect_array(values)).each(true)
    }

    /// Toggles each-mode.
    pub fn each(mut self, each: bool) -> Self {
        self.each = each;
        self
    }

    fn resolve(&self) -> Bson {
        if !self.each {
            return self.value.clone();
        }

        let mut value = Document::new();
        value.insert("$each", self.value.clone());
        Bson::Document(value)
    }
}

/// Sort modifier of a `$push` in each-mode.
#[derive(Debug, Clone, PartialEq)]
pub enum PushSort {
    /// Sort the array elements themselves.
    Direction(SortDirection),
    /// Sort embedded documents by one or more fields.
    Fields(IndexMap<String, SortDirection>),
}

impl PushSort {
    fn resolve(&self) -> Bson {
        match self {
            PushSort::Direction(direction) => Bson::Int32(direction.as_i32()),
            PushSort::Fields(fields) => Bson::Document(
                fields
                    .iter()
                    .map(|(field, direction)| (field.clone(), Bson::Int32(direction.as_i32())))
                    .collect(),
            ),
        }
    }
}

/// The `$push` operator with its each-mode modifiers.
///
/// `$slice`, `$sort` and `$position` are only emitted in each-mode, and only when
/// they were explicitly set.
#[derive(Debug, Clone, PartialEq)]
pub struct Push {
    value: Bson,
    each: bool,
    slice: Option<i32>,
    sort: Option<PushSort>,
    position: Option<i32>,
}

impl Push {
    /// Appends a single value.
    pub fn new(value: impl Into<Bson>) -> Self {
        Push { value: value.into(), each: false, slice: None, sort: None, position: None }
    }

    /// Appends every value of `values`, using each-mode.
    pub fn each_of<V: Into<Bson>>(values: impl IntoIterator<Item = V>) -> Self {
        Push::new(collect_array(values)).each(true)
    }

    /// Toggles each-mode.
    pub fn each(mut self, each: bool) -> Self {
        self.each = each;
        self
    }

    /// Sets the `$slice` modifier.
    pub fn slice(mut self, slice: i32) -> Self {
        self.slice = Some(slice);
        self
    }

    /// Sorts the array elements in the given direction.
    pub fn sort(mut self, direction: SortDirection) -> Self {
        self.sort = Some(PushSort::Direction(direction));
        self
    }

    /// Sorts embedded documents by `field`. Repeated calls add sort keys in order.
    pub fn sort_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        match &mut self.sort {
            Some(PushSort::Fields(fields)) => {
                fields.insert(field.into(), direction);
            }
            sort => {
                let mut fields = IndexMap::new();
                fields.insert(field.into(), direction);
                *sort = Some(PushSort::Fields(fields));
            }
        }
        self
    }

    /// Removes the `$sort` modifier.
    pub fn clear_sort(mut self) -> Self {
        self.sort = None;
        self
    }

    /// Sets the `$position` modifier.
    pub fn position(mut self, position: i32) -> Self {
        self.position = Some(position);
        self
    }

    fn resolve(&self) -> Bson {
        if !self.each {
            return self.value.clone();
        }

        let mut value = Document::new();
        value.insert("$each", self.value.clone());
        if let Some(slice) = self.slice {
            value.insert("$slice", slice);
        }
        if let Some(sort) = &self.sort {
            value.insert("$sort", sort.resolve());
        }
        if let Some(position) = self.position {
            value.insert("$position", position);
        }
        Bson::Document(value)
    }
}

/// The `$slice` projection operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    limit: i32,
    skip: i32,
}

impl Slice {
    /// Returns `limit` elements after skipping `skip`.
    pub fn new(limit: i32, skip: i32) -> Self {
        Slice { limit, skip }
    }

    fn resolve(&self) -> Bson {
        if self.skip == 0 {
            Bson::Int32(self.limit)
        } else {
            Bson::Array(vec![Bson::Int32(self.skip), Bson::Int32(self.limit)])
        }
    }
}

/// The `$elemMatch` projection operator.
#[derive(Debug, Clone, PartialEq)]
pub struct ElemMatch {
    filter: Filter,
}

impl ElemMatch {
    /// Projects the first array element matching `filter`.
    pub fn new(filter: Filter) -> Self {
        ElemMatch { filter }
    }

    fn resolve(&self) -> Bson {
        Bson::Document(self.filter.to_document())
    }
}

/// The `$meta` projection operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meta {
    keyword: String,
}

impl Meta {
    /// Projects the metadata named by `keyword`.
    pub fn new(keyword: impl Into<String>) -> Self {
        Meta { keyword: keyword.into() }
    }

    /// Projects the text search score.
    pub fn text_score() -> Self {
        Meta::new("textScore")
    }

    fn resolve(&self) -> Bson {
        Bson::String(self.keyword.clone())
    }
}

impl Default for Meta {
    fn default() -> Self {
        Meta::text_score()
    }
}

impl From<AddToSet> for Operator {
    fn from(op: AddToSet) -> Self {
        Operator::AddToSet(op)
    }
}

impl From<Push> for Operator {
    fn from(op: Push) -> Self {
        Operator::Push(op)
    }
}

impl From<Slice> for Operator {
    fn from(op: Slice) -> Self {
        Operator::Slice(op)
    }
}

impl From<ElemMatch> for Operator {
    fn from(op: ElemMatch) -> Self {
        Operator::ElemMatch(op)
    }
}

impl From<Meta> for Operator {
    fn from(op: Meta) -> Self {
        Operator::Meta(op)
    }
}

pub(crate) fn collect_array<V: Into<Bson>>(values: impl IntoIterator<Item = V>) -> Bson {
    Bson::Array(values.into_iter().map(Into::into).collect())
}
