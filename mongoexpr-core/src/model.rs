//! Mapping from model types to database and collection names.
//!
//! A [`Model`] may name its database and collection explicitly. When it does not, the
//! [`CollectionResolver`] falls back to its default database and derives the collection
//! from the type name: `BlogPost` maps to `blog_posts`.
//!
//! # Example
//!
//! ```ignore
//! use mongoexpr::model::{CollectionResolver, Model};
//!
//! struct BlogPost;
//!
//! impl Model for BlogPost {}
//!
//! struct AuditEntry;
//!
//! impl Model for AuditEntry {
//!     fn database() -> Option<&'static str> {
//!         Some("audit")
//!     }
//!
//!     fn collection() -> Option<&'static str> {
//!         Some("entries")
//!     }
//! }
//!
//! let resolver = CollectionResolver::builder().default_database("app").build();
//! let info = resolver.resolve::<BlogPost>()?;
//! assert_eq!((info.database.as_str(), info.collection.as_str()), ("app", "blog_posts"));
//! ```

use std::{
    any::{TypeId, type_name},
    collections::HashMap,
};

use convert_case::{Case, Casing};
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{ExprError, ExprResult};

/// A type stored in a named collection.
///
/// Both names are optional; the resolver supplies defaults for whichever is missing.
pub trait Model: 'static {
    /// The collection name, if it differs from the derived default.
    fn collection() -> Option<&'static str> {
        None
    }

    /// The database name, if it differs from the resolver's default database.
    fn database() -> Option<&'static str> {
        None
    }
}

/// The database and collection a model is stored in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionInfo {
    pub database: String,
    pub collection: String,
}

/// Resolves and caches the [`CollectionInfo`] of model types.
///
/// Results are memoized per type for the lifetime of the resolver. The cache is guarded
/// by a read-write lock, so one resolver can be shared between threads.
#[derive(Debug, Default)]
pub struct CollectionResolver {
    default_database: Option<String>,
    resolved: RwLock<HashMap<TypeId, CollectionInfo>>,
}

impl CollectionResolver {
    /// Creates a resolver falling back to `default_database`.
    pub fn new(default_database: impl Into<String>) -> Self {
        CollectionResolver::builder().default_database(default_database).build()
    }

    /// Creates a new resolver builder.
    pub fn builder() -> CollectionResolverBuilder {
        CollectionResolverBuilder::default()
    }

    /// The database used for models that do not name one.
    pub fn default_database(&self) -> Option<&str> {
        self.default_database.as_deref()
    }

    /// Resolves the names of `M` without consulting or filling the cache.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError::MissingDatabase`] if neither `M` nor the resolver names a
    /// database.
    pub fn resolve_uncached<M: Model>(&self) -> ExprResult<CollectionInfo> {
        let database = M::database()
            .map(str::to_string)
            .or_else(|| self.default_database.clone())
            .ok_or_else(|| ExprError::MissingDatabase(type_name::<M>().to_string()))?;

        let collection = M::collection()
            .map(str::to_string)
            .unwrap_or_else(|| default_collection_name(type_name::<M>()));

        Ok(CollectionInfo { database, collection })
    }

    /// Resolves the names of `M`, caching the result.
    pub fn resolve<M: Model>(&self) -> ExprResult<CollectionInfo> {
        let key = TypeId::of::<M>();
        if let Some(info) = self.resolved.read().get(&key) {
            return Ok(info.clone());
        }

        let info = self.resolve_uncached::<M>()?;
        debug!(
            model = type_name::<M>(),
            database = %info.database,
            collection = %info.collection,
            "resolved model collection"
        );

        Ok(self.resolved.write().entry(key).or_insert(info).clone())
    }

    /// Number of cached resolutions.
    pub fn cached(&self) -> usize {
        self.resolved.read().len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CollectionResolverBuilder {
    default_database: Option<String>,
}

impl CollectionResolverBuilder {
    /// Sets the database used for models that do not name one.
    pub fn default_database(mut self, database: impl Into<String>) -> Self {
        self.default_database = Some(database.into());
        self
    }

    /// Builds the resolver with an empty cache.
    pub fn build(self) -> CollectionResolver {
        CollectionResolver {
            default_database: self.default_database,
            resolved: RwLock::new(HashMap::new()),
        }
    }
}

/// Derives a collection name from a (possibly path-qualified) type name: the last path
/// segment, snake-cased and pluralized.
pub fn default_collection_name(type_name: &str) -> String {
    let base = type_name.split('<').next().unwrap_or(type_name);
    let short = base.rsplit("::").next().unwrap_or(base);

    pluralize(&short.to_case(Case::Snake))
}

fn pluralize(word: &str) -> String {
    if word.ends_with('s')
        || word.ends_with('x')
        || word.ends_with('z')
        || word.ends_with("ch")
        || word.ends_with("sh")
    {
        return format!("{word}es");
    }

    if let Some(stem) = word.strip_suffix('y') {
        if !stem.ends_with(['a', 'e', 'i', 'o', 'u']) {
            return format!("{stem}ies");
        }
    }

    format!("{word}s")
}
