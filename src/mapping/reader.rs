//! Structured read view over a stored entity graph.

use crate::model::{FromLiteral, Graph, Iri, Literal, Object};
use crate::{Error, Result, vocab};

/// Read view a repository factory consumes to rebuild an entity.
///
/// Lookups are by predicate IRI. Optional lookups answer absence with
/// `Ok(None)`; `require_*` lookups turn absence into a mapping-configuration
/// error, because a required predicate missing from a graph this crate wrote
/// is a wiring mistake, not user data. Values of the wrong shape raise
/// [`Error::TypeMismatch`] naming the predicate, the owning class, and the
/// expected type.
pub struct EntityReader<'g> {
    graph: &'g Graph,
    subject: Iri,
    class: Iri,
}

impl<'g> EntityReader<'g> {
    pub(crate) const fn new(graph: &'g Graph, subject: Iri, class: Iri) -> Self {
        Self {
            graph,
            subject,
            class,
        }
    }

    /// The entity's id (the graph subject being read).
    #[must_use]
    pub const fn id(&self) -> &Iri {
        &self.subject
    }

    /// The class the mapping declared for this entity type.
    #[must_use]
    pub const fn class(&self) -> &Iri {
        &self.class
    }

    /// The raw graph, for factories that need statements outside the
    /// declared fields.
    #[must_use]
    pub const fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// The entity's `rdfs:label`, when one is stored.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.graph
            .objects(&self.subject, vocab::rdfs::LABEL)
            .find_map(Object::as_literal)
            .map(Literal::lexical)
    }

    /// Reads an optional literal field.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] when the stored value is a resource reference
    /// or its lexical form does not parse as `V`.
    pub fn literal<V: FromLiteral>(&self, predicate: &str) -> Result<Option<V>> {
        let Some(object) = self.graph.objects(&self.subject, predicate).next() else {
            return Ok(None);
        };
        let literal = object
            .as_literal()
            .ok_or_else(|| self.mismatch(predicate, literal_expectation::<V>()))?;
        let value = V::from_literal(literal)
            .ok_or_else(|| self.mismatch(predicate, literal_expectation::<V>()))?;
        Ok(Some(value))
    }

    /// Reads a required literal field.
    ///
    /// # Errors
    ///
    /// [`Error::MappingConfig`] when absent, [`Error::TypeMismatch`] as for
    /// [`Self::literal`].
    pub fn require_literal<V: FromLiteral>(&self, predicate: &str) -> Result<V> {
        self.literal(predicate)?
            .ok_or_else(|| self.missing(predicate))
    }

    /// Reads an optional reference field.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] when the stored value is a literal.
    pub fn resource(&self, predicate: &str) -> Result<Option<Iri>> {
        match self.graph.objects(&self.subject, predicate).next() {
            None => Ok(None),
            Some(object) => {
                let iri = object
                    .as_resource()
                    .ok_or_else(|| self.mismatch(predicate, "a resource reference"))?;
                Ok(Some(iri.clone()))
            }
        }
    }

    /// Reads a required reference field.
    ///
    /// # Errors
    ///
    /// [`Error::MappingConfig`] when absent, [`Error::TypeMismatch`] when the
    /// stored value is a literal.
    pub fn require_resource(&self, predicate: &str) -> Result<Iri> {
        self.resource(predicate)?
            .ok_or_else(|| self.missing(predicate))
    }

    /// Reads a collection-valued reference field. Absence is an empty vec.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] when any stored value under the predicate is a
    /// literal.
    pub fn resources(&self, predicate: &str) -> Result<Vec<Iri>> {
        self.graph
            .objects(&self.subject, predicate)
            .map(|object| {
                object
                    .as_resource()
                    .cloned()
                    .ok_or_else(|| self.mismatch(predicate, "a resource reference"))
            })
            .collect()
    }

    fn mismatch(&self, predicate: &str, expected: impl Into<String>) -> Error {
        Error::TypeMismatch {
            field: predicate.to_string(),
            entity_type: self.class.to_string(),
            expected: expected.into(),
        }
    }

    fn missing(&self, predicate: &str) -> Error {
        Error::MappingConfig(format!(
            "required field '{predicate}' is absent from the stored graph of {}",
            self.subject
        ))
    }
}

/// "i64 literal", "String literal", ... for mismatch messages.
fn literal_expectation<V>() -> String {
    let name = std::any::type_name::<V>();
    let short = name.rsplit("::").next().unwrap_or(name);
    format!("{short} literal")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::model::Triple;

    const SUBJECT: &str = "https://e.org/ns/House/1";
    const CLASS: &str = "https://e.org/ns/House";

    fn stored_graph() -> Graph {
        let mut graph = Graph::new();
        graph.insert(Triple::resource(SUBJECT, vocab::rdf::TYPE, CLASS));
        graph.insert(Triple::literal(SUBJECT, vocab::rdfs::LABEL, "home"));
        graph.insert(Triple::literal(SUBJECT, "https://e.org/ns/age", 30_i64));
        graph.insert(Triple::resource(SUBJECT, "https://e.org/ns/garage", "https://e.org/ns/Garage/1"));
        graph.insert(Triple::resource(SUBJECT, "https://e.org/ns/room", "https://e.org/ns/Room/1"));
        graph.insert(Triple::resource(SUBJECT, "https://e.org/ns/room", "https://e.org/ns/Room/2"));
        graph
    }

    fn reader(graph: &Graph) -> EntityReader<'_> {
        EntityReader::new(graph, Iri::new(SUBJECT), Iri::new(CLASS))
    }

    #[test]
    fn test_label_and_id() {
        let graph = stored_graph();
        let reader = reader(&graph);
        assert_eq!(reader.id().as_str(), SUBJECT);
        assert_eq!(reader.label(), Some("home"));
    }

    #[test]
    fn test_typed_literal_parses() {
        let graph = stored_graph();
        let age: Option<i64> = reader(&graph).literal("https://e.org/ns/age").unwrap();
        assert_eq!(age, Some(30));
    }

    #[test]
    fn test_absent_optional_is_none() {
        let graph = stored_graph();
        let missing: Option<String> = reader(&graph).literal("https://e.org/ns/nickname").unwrap();
        assert_eq!(missing, None);
        assert_eq!(reader(&graph).resource("https://e.org/ns/cellar").unwrap(), None);
        assert!(reader(&graph).resources("https://e.org/ns/chimney").unwrap().is_empty());
    }

    #[test]
    fn test_absent_required_is_mapping_config() {
        let graph = stored_graph();
        let err = reader(&graph)
            .require_literal::<String>("https://e.org/ns/nickname")
            .unwrap_err();
        match err {
            Error::MappingConfig(msg) => {
                assert!(msg.contains("https://e.org/ns/nickname"));
                assert!(msg.contains(SUBJECT));
            }
            other => panic!("expected MappingConfig, got {other:?}"),
        }
    }

    #[test]
    fn test_resource_under_literal_lookup_mismatches() {
        let graph = stored_graph();
        let err = reader(&graph)
            .literal::<String>("https://e.org/ns/garage")
            .unwrap_err();
        match err {
            Error::TypeMismatch {
                field,
                entity_type,
                expected,
            } => {
                assert_eq!(field, "https://e.org/ns/garage");
                assert_eq!(entity_type, CLASS);
                assert_eq!(expected, "String literal");
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_unparseable_literal_mismatches() {
        let graph = stored_graph();
        let err = reader(&graph)
            .literal::<i64>(vocab::rdfs::LABEL)
            .unwrap_err();
        match err {
            Error::TypeMismatch { expected, .. } => assert_eq!(expected, "i64 literal"),
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_literal_under_resource_lookup_mismatches() {
        let graph = stored_graph();
        let err = reader(&graph).resource(vocab::rdfs::LABEL).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
        let err = reader(&graph).resources(vocab::rdfs::LABEL).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_resources_collects_all() {
        let graph = stored_graph();
        let rooms = reader(&graph).resources("https://e.org/ns/room").unwrap();
        assert_eq!(rooms.len(), 2);
        assert!(rooms.contains(&Iri::new("https://e.org/ns/Room/1")));
        assert!(rooms.contains(&Iri::new("https://e.org/ns/Room/2")));
    }

    #[test]
    fn test_require_resource() {
        let graph = stored_graph();
        let garage = reader(&graph).require_resource("https://e.org/ns/garage").unwrap();
        assert_eq!(garage.as_str(), "https://e.org/ns/Garage/1");
        assert!(reader(&graph).require_resource("https://e.org/ns/cellar").is_err());
    }
}
