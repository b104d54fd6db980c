//! RDF value types: terms, triples, and named-graph payloads.
//!
//! The model is deliberately small. Subjects and predicates are IRIs, objects
//! are IRIs or literals, and a [`Graph`] is a deduplicating set of triples
//! that callers move around as a whole. Blank nodes, language tags, and
//! RDF-star have no place in the mapping layer and are not modeled.

mod graph;
mod term;
mod triple;

pub use graph::Graph;
pub use term::{FromLiteral, IntoLiteral, Iri, Literal, Object};
pub use triple::Triple;
