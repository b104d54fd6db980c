//! Declarative entity ↔ graph mapping.
//!
//! A [`SubjectMapping`] is built once per entity type from typed accessor
//! closures and then compiled into the forward transform: entity in, one
//! named-graph payload out. The inverse direction goes through an
//! [`EntityReader`], a structured view over a stored graph that a
//! repository's factory closure consumes to rebuild the entity.
//!
//! Field rules are independent of declaration order and skip `None` values,
//! so the emitted graph contains exactly the statements the entity's state
//! calls for, plus one `rdf:type` statement for the mapped class.
//!
//! ```
//! use tripod::{Iri, SubjectMapping};
//!
//! struct House {
//!     id: Iri,
//!     label: Option<String>,
//!     age: Option<i64>,
//! }
//!
//! let mapping = SubjectMapping::builder("https://example.org/ns/House")
//!     .id(|h: &House| &h.id)
//!     .literal("http://www.w3.org/2000/01/rdf-schema#label", |h: &House| h.label.clone())
//!     .literal("https://example.org/ns/age", |h: &House| h.age)
//!     .build()?;
//!
//! let house = House {
//!     id: Iri::new("https://example.org/ns/House/1"),
//!     label: Some("home".to_string()),
//!     age: Some(30),
//! };
//! assert_eq!(mapping.to_graph(&house).len(), 3);
//! # Ok::<(), tripod::Error>(())
//! ```

mod reader;

pub use reader::EntityReader;

use crate::model::{Graph, IntoLiteral, Iri, Triple};
use crate::{Error, Result, vocab};

/// Borrows the entity's id.
type IdAccessor<T> = Box<dyn for<'e> Fn(&'e T) -> &'e Iri + Send + Sync>;

/// One compiled field rule: emits this field's statements for an entity.
type FieldRule<T> = Box<dyn Fn(&Iri, &T, &mut Graph) + Send + Sync>;

/// Compiled mapping between an entity type and its graph shape.
///
/// Construction goes through [`SubjectMapping::builder`]; a mapping without
/// an id accessor never comes into existence, so the wiring mistake surfaces
/// at startup rather than on first save.
pub struct SubjectMapping<T> {
    class: Iri,
    id: IdAccessor<T>,
    fields: Vec<FieldRule<T>>,
}

impl<T> SubjectMapping<T> {
    /// Starts declaring a mapping for entities of `class`.
    pub fn builder(class: impl Into<Iri>) -> MappingBuilder<T> {
        MappingBuilder {
            class: class.into(),
            id: None,
            fields: Vec::new(),
        }
    }

    /// The mapped class IRI.
    #[must_use]
    pub const fn class(&self) -> &Iri {
        &self.class
    }

    /// Borrows the entity's id through the declared accessor.
    pub fn entity_id<'e>(&self, entity: &'e T) -> &'e Iri {
        (self.id)(entity)
    }

    /// Forward transform: renders the entity as its named-graph payload.
    ///
    /// Emits the `rdf:type` statement first, then every field rule's
    /// statements. Rules are independent, so declaration order only affects
    /// statement order, never graph content.
    pub fn to_graph(&self, entity: &T) -> Graph {
        let subject = self.entity_id(entity);
        let mut graph = Graph::new();
        graph.insert(Triple::resource(
            subject.clone(),
            vocab::rdf::TYPE,
            self.class.clone(),
        ));
        for rule in &self.fields {
            rule(subject, entity, &mut graph);
        }
        graph
    }

    /// Opens a read view over a stored graph for the given subject.
    ///
    /// The view carries the mapped class so its error messages can name the
    /// owning entity type.
    #[must_use]
    pub fn read<'g>(&self, graph: &'g Graph, subject: Iri) -> EntityReader<'g> {
        EntityReader::new(graph, subject, self.class.clone())
    }
}

/// Builder for [`SubjectMapping`].
///
/// Each declaration method adds one field rule. Accessors return `Option`s
/// (or slices for collections); absent values simply emit nothing.
pub struct MappingBuilder<T> {
    class: Iri,
    id: Option<IdAccessor<T>>,
    fields: Vec<FieldRule<T>>,
}

impl<T> MappingBuilder<T> {
    /// Declares the id accessor. Exactly one is required.
    #[must_use]
    pub fn id(mut self, accessor: impl for<'e> Fn(&'e T) -> &'e Iri + Send + Sync + 'static) -> Self {
        self.id = Some(Box::new(accessor));
        self
    }

    /// Declares a literal-valued field.
    ///
    /// The accessor returns the field's current value; `None` emits no
    /// statement. The value type picks its own XSD datatype through
    /// [`IntoLiteral`].
    #[must_use]
    pub fn literal<L>(
        mut self,
        predicate: impl Into<Iri>,
        accessor: impl Fn(&T) -> Option<L> + Send + Sync + 'static,
    ) -> Self
    where
        L: IntoLiteral,
    {
        let predicate = predicate.into();
        self.fields.push(Box::new(move |subject, entity, graph| {
            if let Some(value) = accessor(entity) {
                graph.insert(Triple::literal(
                    subject.clone(),
                    predicate.clone(),
                    value,
                ));
            }
        }));
        self
    }

    /// Declares a single-valued reference field.
    ///
    /// `accessor` borrows the referenced value, `to_ref` derives the IRI the
    /// statement points at. For fields that already hold an [`Iri`], pass
    /// `Iri::clone` as the converter.
    #[must_use]
    pub fn resource<V>(
        mut self,
        predicate: impl Into<Iri>,
        accessor: impl for<'e> Fn(&'e T) -> Option<&'e V> + Send + Sync + 'static,
        to_ref: impl Fn(&V) -> Iri + Send + Sync + 'static,
    ) -> Self
    where
        V: 'static,
    {
        let predicate = predicate.into();
        self.fields.push(Box::new(move |subject, entity, graph| {
            if let Some(value) = accessor(entity) {
                graph.insert(Triple::resource(
                    subject.clone(),
                    predicate.clone(),
                    to_ref(value),
                ));
            }
        }));
        self
    }

    /// Declares a collection-valued reference field.
    ///
    /// One statement per element; duplicates collapse because graphs are
    /// sets. An empty collection emits nothing.
    #[must_use]
    pub fn resources<V>(
        mut self,
        predicate: impl Into<Iri>,
        accessor: impl for<'e> Fn(&'e T) -> &'e [V] + Send + Sync + 'static,
        to_ref: impl Fn(&V) -> Iri + Send + Sync + 'static,
    ) -> Self
    where
        V: 'static,
    {
        let predicate = predicate.into();
        self.fields.push(Box::new(move |subject, entity, graph| {
            for value in accessor(entity) {
                graph.insert(Triple::resource(
                    subject.clone(),
                    predicate.clone(),
                    to_ref(value),
                ));
            }
        }));
        self
    }

    /// Compiles the mapping.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MappingConfig`] when no id accessor was declared;
    /// nothing can be persisted without one.
    pub fn build(self) -> Result<SubjectMapping<T>> {
        let Some(id) = self.id else {
            return Err(Error::MappingConfig(format!(
                "no id accessor declared for class {}",
                self.class
            )));
        };
        Ok(SubjectMapping {
            class: self.class,
            id,
            fields: self.fields,
        })
    }
}
