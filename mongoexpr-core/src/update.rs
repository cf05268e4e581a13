//! Update-operator documents.
//!
//! [`UpdateAction`] groups field assignments under their update operator:
//!
//! ```ignore
//! use mongoexpr::update::UpdateAction;
//!
//! let update = UpdateAction::new()
//!     .set("status", "shipped", false)
//!     .inc("stock", -1, false)
//!     .set("items.qty", 0, true);
//!
//! // { "$set": { "status": "shipped", "items.qty.$": 0 }, "$inc": { "stock": -1 } }
//! ```
//!
//! Every operator takes the field explicitly. Passing `first_only = true` targets only
//! the first array element matched by the query, by writing the value under the
//! positional path `field.$`.

use std::{fmt, str::FromStr};

use bson::{Bson, Document, doc};
use serde::{Serialize, Serializer};
use tracing::{debug, trace};

use crate::{
    error::{ExprError, ExprResult},
    expression::{Expression, ExpressionMap, insert_scoped, resolve_map},
    filter::Filter,
    operator::{AddToSet, Operator, Push, collect_array},
};

/// Bitwise operations accepted by `$bit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitwiseOp {
    And,
    Or,
    Xor,
}

impl BitwiseOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BitwiseOp::And => "and",
            BitwiseOp::Or => "or",
            BitwiseOp::Xor => "xor",
        }
    }
}

impl FromStr for BitwiseOp {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "and" => Ok(BitwiseOp::And),
            "or" => Ok(BitwiseOp::Or),
            "xor" => Ok(BitwiseOp::Xor),
            other => {
                debug!(operator = other, "rejected bitwise operator");
                Err(ExprError::InvalidOperator(other.to_string()))
            }
        }
    }
}

impl fmt::Display for BitwiseOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which end of an array `$pop` removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopFrom {
    First,
    Last,
}

impl PopFrom {
    fn as_i32(&self) -> i32 {
        match self {
            PopFrom::First => -1,
            PopFrom::Last => 1,
        }
    }
}

/// A builder for update documents.
///
/// Calls for the same operator accumulate into one sub-document; setting the same
/// field twice under one operator keeps the last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateAction {
    expressions: ExpressionMap,
}

impl UpdateAction {
    /// Creates an empty update.
    pub fn new() -> Self {
        UpdateAction::default()
    }

    /// Returns `true` if no operator has been added.
    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    /// Increments `field` by `value` (`$inc`).
    pub fn inc(self, field: impl Into<String>, value: impl Into<Bson>, first_only: bool) -> Self {
        self.operator("$inc", field, Expression::Value(value.into()), first_only)
    }

    /// Multiplies `field` by `value` (`$mul`).
    pub fn mul(self, field: impl Into<String>, value: impl Into<Bson>, first_only: bool) -> Self {
        self.operator("$mul", field, Expression::Value(value.into()), first_only)
    }

    /// Renames `field` to `new_name` (`$rename`).
    pub fn rename(self, field: impl Into<String>, new_name: impl Into<String>, first_only: bool) -> Self {
        self.operator("$rename", field, Bson::String(new_name.into()).into(), first_only)
    }

    /// Sets `field` only when the update inserts a new document (`$setOnInsert`).
    pub fn set_on_insert(self, field: impl Into<String>, value: impl Into<Bson>, first_only: bool) -> Self {
        self.operator("$setOnInsert", field, Expression::Value(value.into()), first_only)
    }

    /// Sets `field` to `value` (`$set`).
    pub fn set(self, field: impl Into<String>, value: impl Into<Bson>, first_only: bool) -> Self {
        self.operator("$set", field, Expression::Value(value.into()), first_only)
    }

    /// Removes `field` (`$unset`).
    pub fn unset(self, field: impl Into<String>) -> Self {
        self.operator("$unset", field, Bson::String(String::new()).into(), false)
    }

    /// Sets `field` to `value` if `value` is smaller than the current value (`$min`).
    pub fn min(self, field: impl Into<String>, value: impl Into<Bson>, first_only: bool) -> Self {
        self.operator("$min", field, Expression::Value(value.into()), first_only)
    }

    /// Sets `field` to `value` if `value` is greater than the current value (`$max`).
    pub fn max(self, field: impl Into<String>, value: impl Into<Bson>, first_only: bool) -> Self {
        self.operator("$max", field, Expression::Value(value.into()), first_only)
    }

    /// Sets `field` to the current date, or to a timestamp when `use_timestamp` is set
    /// (`$currentDate`).
    pub fn current_date(self, field: impl Into<String>, use_timestamp: bool) -> Self {
        let kind = if use_timestamp { "timestamp" } else { "date" };
        self.operator("$currentDate", field, Bson::Document(doc! { "$type": kind }).into(), false)
    }

    /// Appends `value` to the array `field` (`$push`).
    pub fn push(self, field: impl Into<String>, value: impl Into<Bson>, first_only: bool) -> Self {
        self.push_operator(field, Push::new(value), first_only)
    }

    /// Appends to the array `field` with each-mode modifiers (`$push`).
    pub fn push_operator(self, field: impl Into<String>, push: Push, first_only: bool) -> Self {
        self.operator("$push", field, Operator::from(push).into(), first_only)
    }

    /// Removes every array element equal to `value` (`$pull`).
    pub fn pull(self, field: impl Into<String>, value: impl Into<Bson>, first_only: bool) -> Self {
        self.operator("$pull", field, Expression::Value(value.into()), first_only)
    }

    /// Removes every array element matching `filter` (`$pull`).
    ///
    /// Use a nested filter with bare operators to match scalar elements, or select
    /// fields to match embedded documents.
    pub fn pull_matching(self, field: impl Into<String>, filter: Filter, first_only: bool) -> Self {
        self.operator("$pull", field, Expression::from(filter), first_only)
    }

    /// Removes every array element equal to one of `values` (`$pullAll`).
    pub fn pull_all<V: Into<Bson>>(
        self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
        first_only: bool,
    ) -> Self {
        self.operator("$pullAll", field, collect_array(values).into(), first_only)
    }

    /// Adds `value` to the array `field` unless already present (`$addToSet`).
    pub fn add_to_set(self, field: impl Into<String>, value: impl Into<Bson>, first_only: bool) -> Self {
        self.add_to_set_operator(field, AddToSet::new(value), first_only)
    }

    /// Adds to the array `field`, optionally in each-mode (`$addToSet`).
    pub fn add_to_set_operator(self, field: impl Into<String>, add_to_set: AddToSet, first_only: bool) -> Self {
        self.operator("$addToSet", field, Operator::from(add_to_set).into(), first_only)
    }

    /// Removes the first or last element of the array `field` (`$pop`).
    pub fn pop(self, field: impl Into<String>, from: PopFrom, first_only: bool) -> Self {
        self.operator("$pop", field, Bson::Int32(from.as_i32()).into(), first_only)
    }

    /// Applies a bitwise `and`, `or` or `xor` to the integer `field` (`$bit`).
    ///
    /// Fails with [`ExprError::InvalidOperator`] for any other operation name.
    pub fn bit(
        self,
        field: impl Into<String>,
        op: &str,
        value: impl Into<Bson>,
        first_only: bool,
    ) -> ExprResult<Self> {
        let op = op.parse::<BitwiseOp>()?;
        Ok(self.bitwise(field, op, value, first_only))
    }

    /// Applies a typed bitwise operation to the integer `field` (`$bit`).
    pub fn bitwise(self, field: impl Into<String>, op: BitwiseOp, value: impl Into<Bson>, first_only: bool) -> Self {
        let mut bit = Document::new();
        bit.insert(op.as_str(), value.into());
        self.operator("$bit", field, Bson::Document(bit).into(), first_only)
    }

    /// Adds `$isolated: 1` to prevent interleaving of a multi-document update, or
    /// removes it when `isolated` is false.
    pub fn isolated(mut self, isolated: bool) -> Self {
        if isolated {
            self.expressions.insert("$isolated".to_string(), Bson::Int32(1).into());
        } else {
            self.expressions.shift_remove("$isolated");
        }
        self
    }

    /// Resolves the update into a plain BSON document.
    pub fn to_document(&self) -> Document {
        resolve_map(&self.expressions)
    }

    fn operator(
        mut self,
        operator: &str,
        field: impl Into<String>,
        value: Expression,
        first_only: bool,
    ) -> Self {
        let field = field.into();
        let path = if first_only { format!("{field}.$") } else { field };

        trace!(operator, path = %path, "adding update operator");
        insert_scoped(&mut self.expressions, operator, path, value);
        self
    }
}

impl From<UpdateAction> for Document {
    fn from(update: UpdateAction) -> Self {
        update.to_document()
    }
}

impl From<&UpdateAction> for Document {
    fn from(update: &UpdateAction) -> Self {
        update.to_document()
    }
}

impl Serialize for UpdateAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::query::SortDirection;

    #[test]
    fn test_first_only_uses_positional_path() {
        let update = UpdateAction::new().set("a", 1, true);
        assert_eq!(update.to_document(), doc! { "$set": { "a.$": 1 } });
    }

    #[test]
    fn test_same_operator_accumulates() {
        let update = UpdateAction::new()
            .set("status", "A", false)
            .inc("qty", 2, false)
            .set("size.uom", "cm", false)
            .set("status", "D", false);

        assert_eq!(
            update.to_document(),
            doc! {
                "$set": { "status": "D", "size.uom": "cm" },
                "$inc": { "qty": 2 },
            }
        );
    }

    #[test]
    fn test_scalar_operators() {
        let update = UpdateAction::new()
            .mul("price", 1.25, false)
            .rename("nmae", "name", false)
            .set_on_insert("defaultQty", 100, false)
            .min("lowScore", 150, false)
            .max("highScore", 950, false)
            .unset("quantity")
            .current_date("lastModified", false)
            .current_date("cancellation.date", true);

        assert_eq!(
            update.to_document(),
            doc! {
                "$mul": { "price": 1.25 },
                "$rename": { "nmae": "name" },
                "$setOnInsert": { "defaultQty": 100 },
                "$min": { "lowScore": 150 },
                "$max": { "highScore": 950 },
                "$unset": { "quantity": "" },
                "$currentDate": {
                    "lastModified": { "$type": "date" },
                    "cancellation.date": { "$type": "timestamp" },
                },
            }
        );
    }

    #[test]
    fn test_array_operators() {
        let update = UpdateAction::new()
            .push("scores", 89, false)
            .push_operator(
                "quizzes",
                Push::each_of([doc! { "wk": 5, "score": 8 }])
                    .sort_by("score", SortDirection::Desc)
                    .slice(3),
                false,
            )
            .add_to_set("tags", "camera", false)
            .add_to_set_operator("colors", AddToSet::each_of(["blue", "green"]), false)
            .pull_all("scores", [0, 5], false)
            .pull("fruits", "apple", false)
            .pop("grades", PopFrom::First, false);

        assert_eq!(
            update.to_document(),
            doc! {
                "$push": {
                    "scores": 89,
                    "quizzes": {
                        "$each": [{ "wk": 5, "score": 8 }],
                        "$slice": 3,
                        "$sort": { "score": -1 },
                    },
                },
                "$addToSet": {
                    "tags": "camera",
                    "colors": { "$each": ["blue", "green"] },
                },
                "$pullAll": { "scores": [0, 5] },
                "$pull": { "fruits": "apple" },
                "$pop": { "grades": -1 },
            }
        );
    }

    #[test]
    fn test_pull_matching() {
        let update = UpdateAction::new().pull_matching(
            "votes",
            Filter::nested().gte(6).unwrap(),
            false,
        );
        assert_eq!(update.to_document(), doc! { "$pull": { "votes": { "$gte": 6 } } });
    }

    #[test]
    fn test_bit() {
        let update = UpdateAction::new()
            .bit("expdata", "and", 10, false)
            .unwrap()
            .bit("flags", "xor", 5, true)
            .unwrap();

        assert_eq!(
            update.to_document(),
            doc! { "$bit": { "expdata": { "and": 10 }, "flags.$": { "xor": 5 } } }
        );
    }

    #[test]
    fn test_bit_rejects_unknown_operator() {
        let err = UpdateAction::new().bit("expdata", "nand", 10, false).unwrap_err();
        assert_eq!(err, ExprError::InvalidOperator("nand".to_string()));
    }

    #[test]
    fn test_isolated_toggle() {
        let update = UpdateAction::new().isolated(true).inc("n", 1, false);
        assert_eq!(update.to_document(), doc! { "$isolated": 1, "$inc": { "n": 1 } });

        let update = update.isolated(false);
        assert_eq!(update.to_document(), doc! { "$inc": { "n": 1 } });
    }
}
