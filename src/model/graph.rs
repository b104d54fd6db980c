//! Named-graph payload: a deduplicating set of triples.

use serde::{Deserialize, Serialize};

use super::term::{Iri, Object};
use super::triple::Triple;
use crate::vocab;

/// The contents of one named graph.
///
/// Insertion order is preserved and duplicate statements are dropped, so
/// repeated field rules or repeated relation entries never inflate the graph.
/// Lookups are linear scans; graphs in this crate are entity-sized, not
/// dataset-sized.
///
/// ```
/// use tripod::{Graph, Triple};
///
/// let mut graph = Graph::new();
/// graph.insert(Triple::literal("https://e.org/h/1", "https://e.org/ns/age", 30_i64));
/// assert_eq!(graph.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Graph {
    triples: Vec<Triple>,
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            triples: Vec::new(),
        }
    }

    /// Number of statements in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Returns `true` when the graph holds no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Returns `true` when the graph contains the statement.
    #[must_use]
    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Adds a statement unless it is already present.
    ///
    /// Returns `true` when the statement was newly added.
    pub fn insert(&mut self, triple: Triple) -> bool {
        if self.contains(&triple) {
            return false;
        }
        self.triples.push(triple);
        true
    }

    /// Adds every statement from `triples`, deduplicating as it goes.
    pub fn extend(&mut self, triples: impl IntoIterator<Item = Triple>) {
        for triple in triples {
            self.insert(triple);
        }
    }

    /// Iterates over the statements in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Triple> {
        self.triples.iter()
    }

    /// Iterates over the objects of statements matching subject and predicate.
    pub fn objects<'g>(
        &'g self,
        subject: &'g Iri,
        predicate: &'g str,
    ) -> impl Iterator<Item = &'g Object> {
        self.triples
            .iter()
            .filter(move |t| t.subject == *subject && t.predicate.as_str() == predicate)
            .map(|t| &t.object)
    }

    /// Finds the subject carrying an `rdf:type` statement for `class`.
    ///
    /// Structural graphs written by the mapping layer contain exactly one
    /// such subject; scans use this to recover the entity id from graph
    /// content rather than from the graph name.
    #[must_use]
    pub fn subject_of_type(&self, class: &Iri) -> Option<&Iri> {
        self.triples
            .iter()
            .find(|t| {
                t.predicate.as_str() == vocab::rdf::TYPE && t.object.as_resource() == Some(class)
            })
            .map(|t| &t.subject)
    }

    /// Renders the graph as N-Triples text, one statement per line.
    ///
    /// The output is valid inside a SPARQL `INSERT DATA` block, which is how
    /// the remote backend ships graphs to an endpoint.
    #[must_use]
    pub fn to_ntriples(&self) -> String {
        let mut out = String::new();
        for triple in &self.triples {
            out.push_str(&render_iri(&triple.subject));
            out.push(' ');
            out.push_str(&render_iri(&triple.predicate));
            out.push(' ');
            out.push_str(&render_object(&triple.object));
            out.push_str(" .\n");
        }
        out
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut graph = Self::new();
        graph.extend(iter);
        graph
    }
}

impl IntoIterator for Graph {
    type Item = Triple;
    type IntoIter = std::vec::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

impl<'g> IntoIterator for &'g Graph {
    type Item = &'g Triple;
    type IntoIter = std::slice::Iter<'g, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

fn render_iri(iri: &Iri) -> String {
    format!("<{}>", iri.as_str())
}

fn render_object(object: &Object) -> String {
    match object {
        Object::Resource(iri) => render_iri(iri),
        Object::Literal(lit) => {
            let quoted = format!("\"{}\"", escape_literal(lit.lexical()));
            match lit.datatype() {
                Some(datatype) => format!("{quoted}^^{}", render_iri(datatype)),
                None => quoted,
            }
        }
    }
}

fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}
