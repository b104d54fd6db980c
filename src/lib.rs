//! # Tripod
//!
//! Entity persistence over RDF named graphs with pluggable triple stores.
//!
//! Tripod maps plain Rust structs to RDF named graphs and back through a
//! declarative mapping DSL, and stores those graphs in whichever backend a
//! deployment calls for: in-memory, embedded SQLite, or a remote SPARQL 1.1
//! endpoint.
//!
//! ## Features
//!
//! - One named graph per entity (`{id}/graph`), so saves and deletes are
//!   whole-graph swaps rather than triple surgery
//! - Declarative field mappings compiled into bidirectional converters
//! - Pluggable [`Store`] backends behind a single connection contract with
//!   advisory read/write locking and transactions where the backend has them
//! - Payload attachment for arbitrary RDF alongside an entity's structural
//!   graph ([`PartialDataStore`])
//!
//! ## Example
//!
//! ```rust,ignore
//! use tripod::{EntityRepository, MemoryStore, SubjectMapping, vocab};
//!
//! let mapping = SubjectMapping::builder(vocab::class::PROJECT)
//!     .id(|p: &Project| &p.id)
//!     .literal(vocab::rdfs::LABEL, |p: &Project| p.label.clone())
//!     .build()?;
//! let repo = EntityRepository::new(store, mapping, |reader| {
//!     Ok(Project { id: reader.id().clone(), label: reader.label().map(String::from), .. })
//! });
//! let id = repo.save(&project)?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
// multiple_crate_versions is inherently crate-level (detects duplicate transitive dependencies).
// Cannot be moved to function level.
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod domain;
pub mod mapping;
pub mod model;
pub mod repository;
pub mod store;
pub mod vocab;

// Re-exports for convenience
pub use config::StoreConfig;
pub use mapping::{EntityReader, MappingBuilder, SubjectMapping};
pub use model::{Graph, Iri, Literal, Object, Triple};
pub use repository::{EntityRepository, PartialDataStore, graph_name};
pub use store::{
    Connection, Lock, MemoryStore, NoopStore, SparqlStore, SqliteStore, Store, StoreExt,
};

/// Error type for tripod operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `MappingConfig` | Mapping built without an id accessor, required predicate absent from a stored graph |
/// | `TypeMismatch` | Stored value under a predicate does not convert to the declared field type |
/// | `Precondition` | Entity handed to a repository operation with an empty id |
/// | `Store` | Backend I/O: SQLite failures, SPARQL protocol or transport errors |
#[derive(Debug, ThisError)]
pub enum Error {
    /// The mapping declaration itself is unusable.
    ///
    /// Raised when:
    /// - A mapping is built without declaring an id accessor
    /// - A `require_*` reader lookup finds no statement for a predicate the
    ///   mapping declared as required
    #[error("invalid mapping configuration: {0}")]
    MappingConfig(String),

    /// A stored value does not match the declared field type.
    ///
    /// Raised when:
    /// - A literal is found where a resource reference was declared, or the
    ///   reverse
    /// - A literal's lexical form does not parse as the requested Rust type
    #[error("type mismatch for '{field}' on {entity_type}: expected {expected}")]
    TypeMismatch {
        /// Predicate IRI of the offending field.
        field: String,
        /// Class IRI of the entity being read.
        entity_type: String,
        /// Description of the type the mapping declared.
        expected: String,
    },

    /// An operation precondition was violated before any data was touched.
    ///
    /// Raised when:
    /// - An entity with an empty id reaches `save`, `delete`, or the payload
    ///   attachment operations
    /// - Any entity in a batch fails the check (the whole batch is rejected)
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// A storage backend operation failed.
    ///
    /// Raised when:
    /// - `SQLite` statement preparation or execution fails
    /// - The SPARQL endpoint is unreachable, times out, or answers non-2xx
    /// - A response body cannot be decoded as SPARQL JSON results
    #[error("store operation '{operation}' failed: {cause}")]
    Store {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Shorthand for [`Error::Store`] used throughout the backends.
    pub(crate) fn store(operation: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::Store {
            operation: operation.into(),
            cause: cause.to_string(),
        }
    }
}

/// Result type alias for tripod operations.
pub type Result<T> = std::result::Result<T, Error>;
