//! Fluent builders for MongoDB query filter, projection and update documents.
//!
//! This crate is the core of the mongoexpr project and provides:
//!
//! - **Filters** ([`filter`]) - Field-scoped query operators, logical composition and sub-filters
//! - **Projections** ([`projection`]) - Field inclusion, exclusion and projection operators
//! - **Updates** ([`update`]) - Update operators with positional (`field.$`) targeting
//! - **Operators** ([`operator`]) - Operator values with modifiers such as `$each` and `$slice`
//! - **Queries** ([`query`]) - A filter, projection and update bundled with sort, limit and skip
//! - **Geospatial shapes** ([`geo`]) - GeoJSON types and legacy shapes for geo operators
//! - **Model mapping** ([`model`]) - Database and collection names for model types
//! - **Error handling** ([`error`]) - Error types and result types
//!
//! Builders produce plain [`bson::Document`] values. Nothing here talks to a server;
//! hand the documents to a driver to execute them.
//!
//! # Example
//!
//! ```ignore
//! use mongoexpr::filter::Filter;
//!
//! let filter = Filter::new()
//!     .add_or(Filter::nested().field("quantity").lt(20)?)
//!     .add_or(Filter::nested().field("price").eq(10)?);
//!
//! // { "$or": [{ "quantity": { "$lt": 20 } }, { "price": { "$eq": 10 } }] }
//! let document = filter.to_document();
//! ```

#[allow(unused_extern_crates)]
extern crate self as mongoexpr_core;

pub mod error;
pub mod expression;
pub mod filter;
pub mod geo;
pub mod model;
pub mod operator;
pub mod projection;
pub mod query;
pub mod update;
