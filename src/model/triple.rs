//! The atomic storage unit: subject, predicate, object.

use serde::{Deserialize, Serialize};

use super::term::{IntoLiteral, Iri, Object};

/// A single RDF statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    /// Subject IRI.
    pub subject: Iri,
    /// Predicate IRI.
    pub predicate: Iri,
    /// Object: resource reference or literal.
    pub object: Object,
}

impl Triple {
    /// Creates a triple from its three positions.
    pub fn new(subject: impl Into<Iri>, predicate: impl Into<Iri>, object: impl Into<Object>) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Creates a triple whose object is a resource reference.
    pub fn resource(
        subject: impl Into<Iri>,
        predicate: impl Into<Iri>,
        object: impl Into<Iri>,
    ) -> Self {
        Self::new(subject, predicate, Object::Resource(object.into()))
    }

    /// Creates a triple whose object is a literal.
    pub fn literal(
        subject: impl Into<Iri>,
        predicate: impl Into<Iri>,
        value: impl IntoLiteral,
    ) -> Self {
        Self::new(subject, predicate, Object::Literal(value.into_literal()))
    }
}
