//! Error types and result types for expression building.
//!
//! Every error in this crate is a usage error raised synchronously by the call that
//! violates a precondition. Use [`ExprResult<T>`] as the return type for fallible
//! builder calls.

use thiserror::Error;

/// Represents all errors that can occur while building MongoDB expression documents.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    /// A field-scoped operator was applied to a root filter before any field was
    /// selected and before any expression existed.
    #[error("a field must be selected via `field` before applying `{operator}`")]
    FieldRequired {
        /// The operator that was being applied, e.g. `$eq`.
        operator: String,
    },
    /// A sort direction other than `asc` or `desc`.
    #[error("invalid sort direction `{0}`, expected `asc` or `desc`")]
    InvalidDirection(String),
    /// A bitwise update operator other than `and`, `or` or `xor`.
    #[error("invalid bitwise operator `{0}`, expected `and`, `or` or `xor`")]
    InvalidOperator(String),
    /// A model names no database and the resolver has no default database.
    #[error("no database configured for model {0}")]
    MissingDatabase(String),
}

/// A specialized `Result` type for expression building.
pub type ExprResult<T> = Result<T, ExprError>;

impl ExprError {
    /// Create a field-required error for the given operator.
    pub fn field_required(operator: impl Into<String>) -> Self {
        Self::FieldRequired { operator: operator.into() }
    }

    /// Check if this is a field-required error.
    pub fn is_field_required(&self) -> bool {
        matches!(self, Self::FieldRequired { .. })
    }
}
