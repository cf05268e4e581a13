//! The query aggregate: a filter, a projection, an update and cursor options.
//!
//! A [`Query`] holds everything a driver needs for a find or update call but has no
//! behavior beyond composition. Use [`QueryBuilder`] for fluent construction:
//!
//! ```ignore
//! use mongoexpr::prelude::*;
//!
//! let query = Query::builder()
//!     .filter(Filter::new().field("status").eq("active")?)
//!     .project(Projection::new().select("name").select("email"))
//!     .sort("created_at", SortDirection::Desc)
//!     .limit(10)
//!     .build();
//! ```

use std::{fmt, str::FromStr};

use bson::{Bson, Document};
use indexmap::IndexMap;
use tracing::debug;

use crate::{
    error::ExprError,
    filter::Filter,
    projection::Projection,
    update::UpdateAction,
};

/// Sort direction for query results and `$push` sort modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Written as `1` in sort and `$sort` documents.
    Asc,
    /// Written as `-1` in sort and `$sort` documents.
    Desc,
}

impl SortDirection {
    /// Returns the MongoDB sort value: `1` for ascending, `-1` for descending.
    pub fn as_i32(&self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

impl FromStr for SortDirection {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => {
                debug!(direction = other, "rejected sort direction");
                Err(ExprError::InvalidDirection(other.to_string()))
            }
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

/// A find or update request assembled from the expression builders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// The search filter.
    pub filter: Option<Filter>,
    /// The fields to return.
    pub projection: Option<Projection>,
    /// The update operators to apply to matching documents.
    pub update: Option<UpdateAction>,
    /// Sort keys in priority order.
    pub sort: IndexMap<String, SortDirection>,
    /// Maximum number of documents to return, `0` for no limit.
    pub limit: usize,
    /// Number of documents to skip before returning.
    pub skip: usize,
}

impl Query {
    /// Creates a new empty query.
    pub fn new() -> Self {
        Query::default()
    }

    /// Creates a new query builder for fluent construction.
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }

    /// The serialized filter, or an empty document matching everything.
    pub fn filter_document(&self) -> Document {
        self.filter.as_ref().map(Filter::to_document).unwrap_or_default()
    }

    /// The serialized projection, if one was set.
    pub fn projection_document(&self) -> Option<Document> {
        self.projection.as_ref().map(Projection::to_document)
    }

    /// The serialized update, if one was set.
    pub fn update_document(&self) -> Option<Document> {
        self.update.as_ref().map(UpdateAction::to_document)
    }

    /// The sort specification as `{ field: 1 | -1 }`.
    pub fn sort_document(&self) -> Document {
        self.sort
            .iter()
            .map(|(field, direction)| (field.clone(), Bson::Int32(direction.as_i32())))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    /// Creates a new query builder.
    pub fn new() -> Self {
        QueryBuilder { query: Query::default() }
    }

    /// Sets the search filter.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.query.filter = Some(filter);
        self
    }

    /// Sets the projection.
    pub fn project(mut self, projection: Projection) -> Self {
        self.query.projection = Some(projection);
        self
    }

    /// Sets the update operators.
    pub fn update(mut self, update: UpdateAction) -> Self {
        self.query.update = Some(update);
        self
    }

    /// Adds a sort key. Sorting the same field again replaces its direction but keeps
    /// its priority.
    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.query.sort.insert(field.into(), direction);
        self
    }

    /// Sets the maximum number of documents to return.
    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = limit;
        self
    }

    /// Sets the number of documents to skip.
    pub fn skip(mut self, skip: usize) -> Self {
        self.query.skip = skip;
        self
    }

    /// Builds and returns the final query.
    pub fn build(self) -> Query {
        self.query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_direction() {
        assert_eq!("asc".parse::<SortDirection>(), Ok(SortDirection::Asc));
        assert_eq!("desc".parse::<SortDirection>(), Ok(SortDirection::Desc));
        assert_eq!(
            "sideways".parse::<SortDirection>(),
            Err(ExprError::InvalidDirection("sideways".to_string()))
        );
        assert!("ASC".parse::<SortDirection>().is_err());
    }

    #[test]
    fn test_sort_document_keeps_priority() {
        let query = Query::builder()
            .sort("age", SortDirection::Desc)
            .sort("name", SortDirection::Asc)
            .sort("age", SortDirection::Asc)
            .build();

        let sort = query.sort_document();
        let keys: Vec<_> = sort.keys().map(String::as_str).collect();
        assert_eq!(keys, ["age", "name"]);
        assert_eq!(sort, doc! { "age": 1, "name": 1 });
    }

    #[test]
    fn test_defaults() {
        let query = Query::new();
        assert_eq!(query.limit, 0);
        assert_eq!(query.skip, 0);
        assert_eq!(query.filter_document(), doc! {});
        assert!(query.projection_document().is_none());
        assert!(query.update_document().is_none());
    }

    #[test]
    fn test_builder_composes_parts() {
        let query = Query::builder()
            .filter(Filter::new().field("status").eq("active").unwrap())
            .project(Projection::new().select("name"))
            .update(UpdateAction::new().set("status", "archived", false))
            .limit(10)
            .skip(20)
            .build();

        assert_eq!(query.filter_document(), doc! { "status": { "$eq": "active" } });
        assert_eq!(query.projection_document(), Some(doc! { "name": 1 }));
        assert_eq!(query.update_document(), Some(doc! { "$set": { "status": "archived" } }));
        assert_eq!((query.limit, query.skip), (10, 20));
    }
}
