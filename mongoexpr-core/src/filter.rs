//! Fluent construction of MongoDB query filter documents.
//!
//! A [`Filter`] accumulates field-scoped operator expressions. Select a field with
//! [`Filter::field`], then apply one or more operators to it; operators applied to the
//! same field accumulate into one sub-document.
//!
//! ```ignore
//! use mongoexpr::filter::Filter;
//!
//! let filter = Filter::new()
//!     .field("qty").exists(true)?.nin([5, 15])?
//!     .field("item.name").eq("ab")?;
//!
//! // { "qty": { "$exists": true, "$nin": [5, 15] }, "item.name": { "$eq": "ab" } }
//! let document = filter.to_document();
//! ```
//!
//! # Root and nested filters
//!
//! A root filter is a complete query document, so its first operator must be scoped to
//! a field; applying one before any field is selected fails with
//! [`ExprError::FieldRequired`]. Global operators (`$text`, `$where`, `$comment`) are
//! written at the document root and never fail.
//!
//! Nested filters, created with [`Filter::nested`] or [`Filter::new_filter`], are
//! fragments embedded in `$not`, `$elemMatch` or a logical array. They accept bare
//! operators with no field selected:
//!
//! ```ignore
//! let filter = Filter::new()
//!     .field("price")
//!     .not(Filter::nested().gt(1.99)?)?;
//!
//! // { "price": { "$not": { "$gt": 1.99 } } }
//! ```
//!
//! # Embedding
//!
//! Sub-filters are moved into their parent when embedded. The parent owns a snapshot
//! of the child and resolves it recursively on every call to [`Filter::to_document`].

use bson::{Bson, Document, doc};
use serde::{Serialize, Serializer};
use tracing::{debug, trace};

use crate::{
    error::{ExprError, ExprResult},
    expression::{Expression, ExpressionMap, append, insert_scoped, resolve_map},
    geo::{self, GeometryType, LegacyShape},
    operator::collect_array,
};

/// A builder for MongoDB query selector documents.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    expressions: ExpressionMap,
    current_field: Option<String>,
    root: bool,
}

impl Default for Filter {
    fn default() -> Self {
        Filter::new()
    }
}

impl Filter {
    /// Creates an empty root filter.
    pub fn new() -> Self {
        Filter { expressions: ExpressionMap::new(), current_field: None, root: true }
    }

    /// Creates an empty nested filter, which accepts operators with no field selected.
    pub fn nested() -> Self {
        Filter { root: false, ..Filter::new() }
    }

    /// Creates a new nested filter. Nothing is inherited from `self`.
    pub fn new_filter(&self) -> Filter {
        Filter::nested()
    }

    /// Returns `true` for a root filter.
    pub fn is_root(&self) -> bool {
        self.root
    }

    /// Returns `true` if no expression has been added.
    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    /// The field that the next operator applies to.
    pub fn current_field(&self) -> Option<&str> {
        self.current_field.as_deref()
    }

    /// Selects the field for the following operators.
    ///
    /// Dotted paths such as `item.name` address embedded fields.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.current_field = Some(field.into());
        self
    }

    /// Matches values equal to `value` (`$eq`).
    pub fn eq(self, value: impl Into<Bson>) -> ExprResult<Self> {
        self.value_operator("$eq", value.into())
    }

    /// Matches values not equal to `value`, including documents missing the field (`$ne`).
    pub fn ne(self, value: impl Into<Bson>) -> ExprResult<Self> {
        self.value_operator("$ne", value.into())
    }

    /// Matches values greater than `value` (`$gt`).
    pub fn gt(self, value: impl Into<Bson>) -> ExprResult<Self> {
        self.value_operator("$gt", value.into())
    }

    /// Matches values greater than or equal to `value` (`$gte`).
    pub fn gte(self, value: impl Into<Bson>) -> ExprResult<Self> {
        self.value_operator("$gte", value.into())
    }

    /// Matches values less than `value` (`$lt`).
    pub fn lt(self, value: impl Into<Bson>) -> ExprResult<Self> {
        self.value_operator("$lt", value.into())
    }

    /// Matches values less than or equal to `value` (`$lte`).
    pub fn lte(self, value: impl Into<Bson>) -> ExprResult<Self> {
        self.value_operator("$lte", value.into())
    }

    /// Matches values equal to any of `values` (`$in`).
    pub fn in_array<V: Into<Bson>>(self, values: impl IntoIterator<Item = V>) -> ExprResult<Self> {
        self.value_operator("$in", collect_array(values))
    }

    /// Matches values equal to none of `values`, including documents missing the
    /// field (`$nin`).
    pub fn nin<V: Into<Bson>>(self, values: impl IntoIterator<Item = V>) -> ExprResult<Self> {
        self.value_operator("$nin", collect_array(values))
    }

    /// Matches arrays containing every one of `values` (`$all`).
    pub fn all<V: Into<Bson>>(self, values: impl IntoIterator<Item = V>) -> ExprResult<Self> {
        self.value_operator("$all", collect_array(values))
    }

    /// Negates the operator expression of `filter` (`$not`).
    ///
    /// `filter` should be a nested filter built from bare operators, since its document
    /// is placed under the current field.
    pub fn not(self, filter: Filter) -> ExprResult<Self> {
        self.operator("$not", Expression::from(filter))
    }

    /// Negates a regular expression literal such as `/^p.*/` (`$not`).
    pub fn not_regex(self, pattern: impl Into<String>) -> ExprResult<Self> {
        self.value_operator("$not", Bson::String(pattern.into()))
    }

    /// Appends `filter` to the `$or` array.
    pub fn add_or(self, filter: Filter) -> Self {
        self.logical("$or", filter)
    }

    /// Appends `filter` to the `$and` array.
    pub fn add_and(self, filter: Filter) -> Self {
        self.logical("$and", filter)
    }

    /// Appends `filter` to the `$nor` array.
    pub fn add_nor(self, filter: Filter) -> Self {
        self.logical("$nor", filter)
    }

    /// Matches documents that contain the field, or lack it when `exists` is false
    /// (`$exists`).
    pub fn exists(self, exists: bool) -> ExprResult<Self> {
        self.value_operator("$exists", Bson::Boolean(exists))
    }

    /// Matches values of the given BSON type, by number or alias (`$type`).
    pub fn type_is(self, bson_type: impl Into<Bson>) -> ExprResult<Self> {
        self.value_operator("$type", bson_type.into())
    }

    /// Matches values where `value % divisor == remainder` (`$mod`).
    pub fn modulo(self, divisor: impl Into<Bson>, remainder: impl Into<Bson>) -> ExprResult<Self> {
        self.value_operator("$mod", Bson::Array(vec![divisor.into(), remainder.into()]))
    }

    /// Matches strings against a PCRE pattern (`$regex`).
    pub fn regex(self, pattern: impl Into<String>) -> ExprResult<Self> {
        self.regex_with_options(pattern, "")
    }

    /// Matches strings against a PCRE pattern with flags such as `i` or `s`.
    ///
    /// `$options` is only written when `options` is non-empty. Each key is written
    /// independently, so a second call on the same field overwrites both.
    pub fn regex_with_options(self, pattern: impl Into<String>, options: &str) -> ExprResult<Self> {
        let filter = self.value_operator("$regex", Bson::String(pattern.into()))?;
        if options.is_empty() {
            return Ok(filter);
        }
        filter.value_operator("$options", Bson::String(options.to_string()))
    }

    /// Performs a text search on text-indexed fields (`$text`).
    ///
    /// Always written at the document root, replacing any previous `$text`.
    ///
    /// # Arguments
    ///
    /// * `search` - The terms to search for
    /// * `language` - Overrides the index language when set
    /// * `case_sensitive` - Emits `$caseSensitive: true` when set
    /// * `diacritic_sensitive` - Emits `$diacriticSensitive: true` when set
    pub fn text(
        mut self,
        search: impl Into<String>,
        language: Option<&str>,
        case_sensitive: bool,
        diacritic_sensitive: bool,
    ) -> Self {
        let mut text = doc! { "$search": search.into() };
        if let Some(language) = language.filter(|language| !language.is_empty()) {
            text.insert("$language", language);
        }
        if case_sensitive {
            text.insert("$caseSensitive", true);
        }
        if diacritic_sensitive {
            text.insert("$diacriticSensitive", true);
        }

        self.expressions.insert("$text".to_string(), Bson::Document(text).into());
        self
    }

    /// Passes a JavaScript expression or function to the query system (`$where`).
    ///
    /// The expression is stored verbatim at the document root.
    pub fn where_expr(mut self, javascript: impl Into<String>) -> Self {
        self.expressions
            .insert("$where".to_string(), Bson::String(javascript.into()).into());
        self
    }

    /// Attaches a comment to the query (`$comment`). The last call wins.
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.expressions
            .insert("$comment".to_string(), Bson::String(comment.into()).into());
        self
    }

    /// Matches arrays with at least one element satisfying `filter` (`$elemMatch`).
    pub fn elem_match(self, filter: Filter) -> ExprResult<Self> {
        self.operator("$elemMatch", Expression::from(filter))
    }

    /// Matches arrays with exactly `size` elements (`$size`).
    pub fn size(self, size: impl Into<Bson>) -> ExprResult<Self> {
        self.value_operator("$size", size.into())
    }

    /// Matches numbers or binary data with all of the given bits set (`$bitsAllSet`).
    ///
    /// `bits` is either a numeric bitmask or an array of bit positions.
    pub fn bits_all_set(self, bits: impl Into<Bson>) -> ExprResult<Self> {
        self.value_operator("$bitsAllSet", bits.into())
    }

    /// Matches numbers or binary data with any of the given bits set (`$bitsAnySet`).
    pub fn bits_any_set(self, bits: impl Into<Bson>) -> ExprResult<Self> {
        self.value_operator("$bitsAnySet", bits.into())
    }

    /// Matches numbers or binary data with all of the given bits clear (`$bitsAllClear`).
    pub fn bits_all_clear(self, bits: impl Into<Bson>) -> ExprResult<Self> {
        self.value_operator("$bitsAllClear", bits.into())
    }

    /// Matches numbers or binary data with any of the given bits clear (`$bitsAnyClear`).
    pub fn bits_any_clear(self, bits: impl Into<Bson>) -> ExprResult<Self> {
        self.value_operator("$bitsAnyClear", bits.into())
    }

    /// Matches geometries entirely within a GeoJSON polygon or multipolygon
    /// (`$geoWithin` with `$geometry`).
    ///
    /// # Arguments
    ///
    /// * `geometry_type` - The GeoJSON type of the bounding shape
    /// * `coordinates` - GeoJSON coordinates of the shape
    /// * `strict_winding` - Attaches the strict-winding CRS, for shapes larger than a
    ///   hemisphere
    pub fn geo_within(
        self,
        geometry_type: GeometryType,
        coordinates: impl Into<Bson>,
        strict_winding: bool,
    ) -> ExprResult<Self> {
        let value = geo::geometry(geometry_type, coordinates.into(), strict_winding);
        self.value_operator("$geoWithin", Bson::Document(value))
    }

    /// Matches points within a shape defined by legacy coordinate pairs on a plane
    /// (`$geoWithin` with `$box`, `$polygon`, `$center` or `$centerSphere`).
    pub fn geo_within_legacy(self, shape: LegacyShape, coordinates: impl Into<Bson>) -> ExprResult<Self> {
        let mut value = Document::new();
        value.insert(shape.as_str(), coordinates.into());
        self.value_operator("$geoWithin", Bson::Document(value))
    }

    /// Matches geometries intersecting a GeoJSON object (`$geoIntersects`).
    pub fn geo_intersects(
        self,
        geometry_type: GeometryType,
        coordinates: impl Into<Bson>,
        strict_winding: bool,
    ) -> ExprResult<Self> {
        let value = geo::geometry(geometry_type, coordinates.into(), strict_winding);
        self.value_operator("$geoIntersects", Bson::Document(value))
    }

    /// Returns documents from nearest to farthest from a GeoJSON point (`$near`).
    ///
    /// Distances are in meters and only written when set.
    pub fn near(
        self,
        longitude: f64,
        latitude: f64,
        max_distance: Option<f64>,
        min_distance: Option<f64>,
    ) -> ExprResult<Self> {
        let value = geo::near_point(longitude, latitude, max_distance, min_distance);
        self.value_operator("$near", Bson::Document(value))
    }

    /// Returns documents from nearest to farthest from a legacy coordinate pair
    /// (`$near` with a sibling `$maxDistance` in radians).
    pub fn near_legacy(self, x: f64, y: f64, max_distance: f64) -> ExprResult<Self> {
        self.value_operator("$near", Bson::from(vec![x, y]))?
            .value_operator("$maxDistance", Bson::Double(max_distance))
    }

    /// Like [`Filter::near`] but with distances calculated on a sphere (`$nearSphere`).
    pub fn near_sphere(
        self,
        longitude: f64,
        latitude: f64,
        max_distance: Option<f64>,
        min_distance: Option<f64>,
    ) -> ExprResult<Self> {
        let value = geo::near_point(longitude, latitude, max_distance, min_distance);
        self.value_operator("$nearSphere", Bson::Document(value))
    }

    /// Like [`Filter::near_legacy`] but with distances calculated on a sphere
    /// (`$nearSphere` with sibling `$maxDistance` and `$minDistance`).
    pub fn near_sphere_legacy(
        self,
        x: f64,
        y: f64,
        max_distance: f64,
        min_distance: f64,
    ) -> ExprResult<Self> {
        self.value_operator("$nearSphere", Bson::from(vec![x, y]))?
            .value_operator("$maxDistance", Bson::Double(max_distance))?
            .value_operator("$minDistance", Bson::Double(min_distance))
    }

    /// Resolves the filter into a plain BSON document.
    ///
    /// This is a pure read: calling it repeatedly yields identical documents.
    pub fn to_document(&self) -> Document {
        resolve_map(&self.expressions)
    }

    fn value_operator(self, operator: &str, value: Bson) -> ExprResult<Self> {
        self.operator(operator, Expression::Value(value))
    }

    fn operator(mut self, operator: &str, value: Expression) -> ExprResult<Self> {
        match &self.current_field {
            Some(field) => {
                trace!(field = %field, operator, "applying field operator");
                insert_scoped(&mut self.expressions, field, operator, value);
            }
            None if self.root && self.expressions.is_empty() => {
                debug!(operator, "operator applied to a root filter with no field selected");
                return Err(ExprError::field_required(operator));
            }
            None => {
                trace!(operator, "applying bare operator");
                self.expressions.insert(operator.to_string(), value);
            }
        }
        Ok(self)
    }

    fn logical(mut self, operator: &str, filter: Filter) -> Self {
        trace!(operator, "appending logical clause");
        append(&mut self.expressions, operator, Expression::from(filter));
        self
    }
}

impl From<Filter> for Document {
    fn from(filter: Filter) -> Self {
        filter.to_document()
    }
}

impl From<&Filter> for Document {
    fn from(filter: &Filter) -> Self {
        filter.to_document()
    }
}

impl From<Filter> for Bson {
    fn from(filter: Filter) -> Self {
        Bson::Document(filter.to_document())
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::bson;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_root_and_nested() {
        let filter = Filter::new();
        assert!(filter.is_root());
        assert!(!filter.new_filter().is_root());
        assert!(!Filter::nested().is_root());
        assert!(Filter::default().is_root());
    }

    #[test]
    fn test_field_required_on_root() {
        let err = Filter::new().eq(1).unwrap_err();
        assert_eq!(err, ExprError::field_required("$eq"));
    }

    #[test]
    fn test_nested_accepts_bare_operator() {
        let filter = Filter::nested().eq(1).unwrap();
        assert_eq!(filter.to_document(), doc! { "$eq": 1 });
        assert_eq!(filter.current_field(), None);
    }

    #[test]
    fn test_bare_operator_allowed_once_root_has_expressions() {
        let filter = Filter::new().comment("scan").gt(3).unwrap();
        assert_eq!(filter.to_document(), doc! { "$comment": "scan", "$gt": 3 });
    }

    #[test]
    fn test_operators_accumulate_per_field() {
        let filter = Filter::new()
            .field("qty")
            .gt(1)
            .unwrap()
            .lt(9)
            .unwrap()
            .gt(2)
            .unwrap();

        assert_eq!(filter.to_document(), doc! { "qty": { "$gt": 2, "$lt": 9 } });
    }

    #[test]
    fn test_regex_without_options() {
        let filter = Filter::new().field("name").regex("^acme").unwrap();
        assert_eq!(filter.to_document(), doc! { "name": { "$regex": "^acme" } });
    }

    #[test]
    fn test_regex_twice_overwrites_keys() {
        let filter = Filter::new()
            .field("name")
            .regex_with_options("^a", "i")
            .unwrap()
            .regex("^b")
            .unwrap();

        assert_eq!(filter.to_document(), doc! { "name": { "$regex": "^b", "$options": "i" } });
    }

    #[test]
    fn test_text_minimal() {
        let filter = Filter::new().text("coffee", None, false, false);
        assert_eq!(filter.to_document(), doc! { "$text": { "$search": "coffee" } });
    }

    #[test]
    fn test_where_and_comment_are_root_keys() {
        let filter = Filter::new()
            .field("qty")
            .where_expr("this.credits == this.debits")
            .comment("audit");

        assert_eq!(
            filter.to_document(),
            doc! { "$where": "this.credits == this.debits", "$comment": "audit" }
        );
    }

    #[test]
    fn test_to_document_is_idempotent() {
        let filter = Filter::new()
            .field("a")
            .eq(1)
            .unwrap()
            .add_or(Filter::nested().field("b").eq(2).unwrap());

        assert_eq!(filter.to_document(), filter.to_document());
    }

    #[test]
    fn test_conversions_and_serialize() {
        let filter = Filter::new().field("qty").lte(20).unwrap();

        assert_eq!(Document::from(&filter), doc! { "qty": { "$lte": 20 } });
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            serde_json::json!({ "qty": { "$lte": 20 } })
        );
        assert_eq!(Bson::from(filter), bson!({ "qty": { "$lte": 20 } }));
    }
}
