//! Entity repositories: CRUD over one named graph per entity.
//!
//! Every entity owns the graph named `{id}/graph` (the *structural* graph).
//! Saving renders the entity through its mapping and replaces that graph
//! wholesale; deleting drops it, along with the legacy graph named exactly
//! `{id}` that older datasets and payload attachment use. Scans list graph
//! names, then rebuild one entity per non-empty graph whose name is shaped
//! like a structural graph of the mapped class.

mod partial;

pub use partial::PartialDataStore;

use std::sync::Arc;

use tracing::instrument;

use crate::mapping::{EntityReader, SubjectMapping};
use crate::model::{Graph, Iri};
use crate::store::{Store, StoreExt};
use crate::{Error, Result};

/// Derives the structural graph name for an entity id.
///
/// `{id}/graph`, or `{id}graph` when the id already ends in `/` or `#`; the
/// separator is never doubled.
#[must_use]
pub fn graph_name(id: &Iri) -> String {
    if id.as_str().ends_with('/') || id.as_str().ends_with('#') {
        format!("{id}graph")
    } else {
        format!("{id}/graph")
    }
}

/// Whether a graph name looks like a structural graph of `class`.
///
/// Payload graphs live at the bare entity id and so fail the suffix check;
/// without it a scan would try to materialize attachments as entities.
fn is_structural_name(name: &str, class: &str) -> bool {
    name.starts_with(class) && (name.ends_with("/graph") || name.ends_with("#graph"))
}

type Factory<T> = Box<dyn Fn(&EntityReader<'_>) -> Result<T> + Send + Sync>;

/// Typed repository for one entity class over one store.
///
/// Holds the compiled [`SubjectMapping`] for the forward direction and a
/// factory closure for the inverse: the factory receives an [`EntityReader`]
/// over the stored graph and returns the rebuilt entity. Repositories are
/// `Send + Sync` and meant to be built once at startup.
pub struct EntityRepository<T> {
    store: Arc<dyn Store>,
    mapping: SubjectMapping<T>,
    factory: Factory<T>,
}

impl<T> EntityRepository<T> {
    /// Creates a repository from a store, a mapping, and the entity factory.
    pub fn new(
        store: Arc<dyn Store>,
        mapping: SubjectMapping<T>,
        factory: impl Fn(&EntityReader<'_>) -> Result<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            store,
            mapping,
            factory: Box::new(factory),
        }
    }

    /// The mapped class IRI.
    #[must_use]
    pub const fn class(&self) -> &Iri {
        self.mapping.class()
    }

    /// Mints a fresh entity id under the mapped class IRI.
    ///
    /// Ids minted here share the class IRI as a prefix, which is what makes
    /// [`Self::find_all`]'s name filter work.
    #[must_use]
    pub fn mint_id(&self) -> Iri {
        Iri::mint(self.mapping.class())
    }

    /// Saves the entity, replacing its structural graph. Returns the id.
    ///
    /// # Errors
    ///
    /// [`Error::Precondition`] when the entity's id is empty, or the
    /// backend's error when the write fails.
    #[instrument(skip_all, fields(class = %self.mapping.class()))]
    pub fn save(&self, entity: &T) -> Result<Iri> {
        let id = self.persistable_id(entity)?;
        let name = graph_name(&id);
        let graph = self.mapping.to_graph(entity);
        self.store
            .write_with_connection(|conn| conn.write_graph(&name, &graph))?;
        Ok(id)
    }

    /// Saves a batch of entities over one connection.
    ///
    /// Every entity is precondition-checked and rendered before the store is
    /// touched; a bad entity rejects the whole batch. On transactional
    /// backends the batch commits or rolls back as a unit.
    ///
    /// # Errors
    ///
    /// [`Error::Precondition`] for the first entity with an empty id, or the
    /// backend's error when a write fails.
    #[instrument(skip_all, fields(class = %self.mapping.class(), count = entities.len()))]
    pub fn save_all(&self, entities: &[T]) -> Result<Vec<Iri>> {
        let mut batch = Vec::with_capacity(entities.len());
        for entity in entities {
            let id = self.persistable_id(entity)?;
            let name = graph_name(&id);
            batch.push((id, name, self.mapping.to_graph(entity)));
        }

        self.store.write_with_connection(|conn| {
            for (_, name, graph) in &batch {
                conn.write_graph(name, graph)?;
            }
            Ok(())
        })?;

        Ok(batch.into_iter().map(|(id, _, _)| id).collect())
    }

    /// Loads the entity with the given id; `Ok(None)` when nothing is stored.
    ///
    /// # Errors
    ///
    /// The backend's error when the read fails, or the factory's error when
    /// the stored graph does not materialize.
    #[instrument(skip_all, fields(class = %self.mapping.class(), id = %id))]
    pub fn find_by_id(&self, id: &Iri) -> Result<Option<T>> {
        let name = graph_name(id);
        let graph = self
            .store
            .read_with_connection(|conn| conn.read_graph(&name))?;
        if graph.is_empty() {
            return Ok(None);
        }
        self.materialize(&graph, id.clone()).map(Some)
    }

    /// Loads every stored entity of the mapped class.
    ///
    /// Scans graph names over a single connection, reading only those shaped
    /// like structural graphs of this class. Graphs without a matching
    /// `rdf:type` statement are skipped rather than guessed at.
    ///
    /// # Errors
    ///
    /// The backend's error when listing or reading fails, or the factory's
    /// error for a graph that does not materialize.
    #[instrument(skip_all, fields(class = %self.mapping.class()))]
    pub fn find_all(&self) -> Result<Vec<T>> {
        let class = self.mapping.class().clone();
        let graphs: Vec<Graph> = self.store.read_with_connection(|conn| {
            let names = conn.graph_names()?;
            let mut graphs = Vec::new();
            for name in names
                .iter()
                .filter(|name| is_structural_name(name, class.as_str()))
            {
                let graph = conn.read_graph(name)?;
                if !graph.is_empty() {
                    graphs.push(graph);
                }
            }
            Ok(graphs)
        })?;

        let mut entities = Vec::with_capacity(graphs.len());
        for graph in &graphs {
            let Some(subject) = graph.subject_of_type(&class) else {
                continue;
            };
            entities.push(self.materialize(graph, subject.clone())?);
        }
        Ok(entities)
    }

    /// Deletes the entity's graphs, returning how many statements went away.
    ///
    /// Clears both the structural graph and the legacy bare-id graph, so a
    /// delete also takes any attached payload with it.
    ///
    /// # Errors
    ///
    /// [`Error::Precondition`] when the entity's id is empty, or the
    /// backend's error when a removal fails.
    #[instrument(skip_all, fields(class = %self.mapping.class()))]
    pub fn delete(&self, entity: &T) -> Result<usize> {
        let id = self.persistable_id(entity)?;
        let structural = graph_name(&id);
        self.store.write_with_connection(|conn| {
            let from_structural = conn.remove_graph(&structural)?;
            let from_legacy = conn.remove_graph(id.as_str())?;
            Ok(from_structural + from_legacy)
        })
    }

    /// Deletes a batch of entities over one connection.
    ///
    /// # Errors
    ///
    /// As for [`Self::delete`]; any empty id rejects the whole batch before
    /// the store is touched.
    #[instrument(skip_all, fields(class = %self.mapping.class(), count = entities.len()))]
    pub fn delete_all(&self, entities: &[T]) -> Result<usize> {
        let mut names = Vec::with_capacity(entities.len() * 2);
        for entity in entities {
            let id = self.persistable_id(entity)?;
            names.push(graph_name(&id));
            names.push(id.into_string());
        }

        self.store.write_with_connection(|conn| {
            let mut removed = 0;
            for name in &names {
                removed += conn.remove_graph(name)?;
            }
            Ok(removed)
        })
    }

    /// Checks the save/delete precondition and returns the id to use.
    fn persistable_id(&self, entity: &T) -> Result<Iri> {
        let id = self.mapping.entity_id(entity);
        if id.is_empty() {
            return Err(Error::Precondition(format!(
                "entity of class {} has an empty id",
                self.mapping.class()
            )));
        }
        Ok(id.clone())
    }

    /// Runs the factory over a stored graph.
    fn materialize(&self, graph: &Graph, subject: Iri) -> Result<T> {
        let reader = self.mapping.read(graph, subject);
        (self.factory)(&reader)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::vocab;
    use test_case::test_case;

    #[test_case("https://e.org/ns/House/1", "https://e.org/ns/House/1/graph" ; "plain id")]
    #[test_case("https://e.org/ns/House/1/", "https://e.org/ns/House/1/graph" ; "trailing slash")]
    #[test_case("https://e.org/ns#h1", "https://e.org/ns#h1/graph" ; "fragment id")]
    #[test_case("https://e.org/ns/h1#", "https://e.org/ns/h1#graph" ; "trailing hash")]
    fn test_graph_name(id: &str, expected: &str) {
        assert_eq!(graph_name(&Iri::new(id)), expected);
    }

    #[test]
    fn test_structural_name_filter() {
        let class = "https://e.org/ns/House";
        assert!(is_structural_name("https://e.org/ns/House/1/graph", class));
        assert!(is_structural_name("https://e.org/ns/House/1#graph", class));
        // Bare payload graph at the entity id.
        assert!(!is_structural_name("https://e.org/ns/House/1", class));
        // Structural graph of a different class.
        assert!(!is_structural_name("https://e.org/ns/Garage/1/graph", class));
    }

    struct Tagged {
        id: Iri,
        tag: Option<String>,
    }

    fn tagged_repository() -> EntityRepository<Tagged> {
        let mapping = SubjectMapping::builder("https://e.org/ns/Tagged")
            .id(|t: &Tagged| &t.id)
            .literal(vocab::rdfs::LABEL, |t: &Tagged| t.tag.clone())
            .build()
            .unwrap();
        EntityRepository::new(Arc::new(MemoryStore::new()), mapping, |reader| {
            Ok(Tagged {
                id: reader.id().clone(),
                tag: reader.label().map(String::from),
            })
        })
    }

    #[test]
    fn test_empty_id_fails_precondition() {
        let repo = tagged_repository();
        let entity = Tagged {
            id: Iri::new(""),
            tag: None,
        };
        assert!(matches!(repo.save(&entity), Err(Error::Precondition(_))));
        assert!(matches!(repo.delete(&entity), Err(Error::Precondition(_))));
    }

    #[test]
    fn test_batch_rejected_before_store_touched() {
        let repo = tagged_repository();
        let good = Tagged {
            id: repo.mint_id(),
            tag: Some("good".to_string()),
        };
        let bad = Tagged {
            id: Iri::new(""),
            tag: None,
        };

        assert!(matches!(
            repo.save_all(&[good, bad]),
            Err(Error::Precondition(_))
        ));
        assert!(repo.find_all().unwrap().is_empty(), "nothing may be written");
    }

    #[test]
    fn test_mint_id_prefixes_class() {
        let repo = tagged_repository();
        let id = repo.mint_id();
        assert!(id.as_str().starts_with("https://e.org/ns/Tagged/"));
    }

    #[test]
    fn test_find_by_id_absent_is_none() {
        let repo = tagged_repository();
        let found = repo.find_by_id(&Iri::new("https://e.org/ns/Tagged/none")).unwrap();
        assert!(found.is_none());
    }
}
