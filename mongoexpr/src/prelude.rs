//! Convenient re-exports of commonly used types from mongoexpr.
//!
//! Import this prelude module to quickly access the most frequently used types
//! without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use mongoexpr::prelude::*;
//! ```

pub use mongoexpr_core::{
    error::{ExprError, ExprResult},
    filter::Filter,
    geo::{GeometryType, LegacyShape, STRICT_WINDING_CRS},
    model::{CollectionInfo, CollectionResolver, Model},
    operator::{AddToSet, ElemMatch, Meta, Operator, Push, Slice},
    projection::Projection,
    query::{Query, QueryBuilder, SortDirection},
    update::{BitwiseOp, PopFrom, UpdateAction},
};
pub use bson::{Bson, Document, doc};
