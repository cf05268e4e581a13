//! Main mongoexpr crate providing fluent builders for MongoDB documents.
//!
//! This crate is the primary entry point for users of mongoexpr. It re-exports the
//! builders from `mongoexpr-core` together with the [`bson`] crate their output is
//! expressed in.
//!
//! # Quick Start
//!
//! ```ignore
//! use mongoexpr::prelude::*;
//!
//! fn main() -> ExprResult<()> {
//!     // Filter: { "qty": { "$exists": true, "$nin": [5, 15] }, "tags": { "$all": ["a", "b"] } }
//!     let filter = Filter::new()
//!         .field("qty").exists(true)?.nin([5, 15])?
//!         .field("tags").all(["a", "b"])?;
//!
//!     // Projection: { "name": 1, "comments": { "$slice": [20, 10] } }
//!     let projection = Projection::new()
//!         .select("name")
//!         .select_slice("comments", 10, 20);
//!
//!     // Update: { "$set": { "grades.$": 82 }, "$push": { "log": { "$each": [...], "$slice": -10 } } }
//!     let update = UpdateAction::new()
//!         .set("grades", 82, true)
//!         .push_operator("log", Push::each_of(["graded"]).slice(-10), false);
//!
//!     let query = Query::builder()
//!         .filter(filter)
//!         .project(projection)
//!         .update(update)
//!         .sort("name", "asc".parse()?)
//!         .limit(10)
//!         .build();
//!
//!     // Hand the documents to a driver.
//!     let selector = query.filter_document();
//!     let sort = query.sort_document();
//!
//!     Ok(())
//! }
//! ```
//!
//! # Sub-filters
//!
//! Logical arrays, `$not` and `$elemMatch` take nested filters. A nested filter may
//! start with a bare operator, which a root filter rejects:
//!
//! ```ignore
//! use mongoexpr::prelude::*;
//!
//! let filter = Filter::new()
//!     .field("price").not(Filter::nested().gt(1.99)?)?
//!     .field("results").elem_match(
//!         Filter::nested().field("product").eq("xyz")?.field("score").gte(8)?,
//!     )?;
//!
//! assert!(Filter::new().gt(1).is_err());
//! ```
//!
//! # Model Mapping
//!
//! Models can be mapped to database and collection names; the result is cached per
//! type:
//!
//! ```ignore
//! use mongoexpr::model::{CollectionResolver, Model};
//!
//! struct BlogPost;
//!
//! impl Model for BlogPost {}
//!
//! let resolver = CollectionResolver::new("app");
//! let info = resolver.resolve::<BlogPost>()?; // app.blog_posts
//! ```

pub mod prelude;

pub use mongoexpr_core::{error, expression, filter, geo, model, operator, projection, query, update};

// Re-export BSON types for convenience
pub use bson;
