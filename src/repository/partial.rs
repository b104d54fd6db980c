//! Payload attachment alongside an entity's structural graph.

use tracing::instrument;

use super::EntityRepository;
use crate::Result;
use crate::model::{Graph, Iri};
use crate::store::StoreExt;

/// Attachment of arbitrary RDF payloads to persisted entities.
///
/// Payloads live in the graph named exactly `{id}` (the entity's own IRI,
/// not its structural `{id}/graph`), so attachment never disturbs the
/// mapped fields and mapped saves never disturb the payload. Deleting the
/// entity through its repository clears both graphs.
pub trait PartialDataStore {
    /// The entity type payloads attach to.
    type Entity;

    /// Merges `payload` into the entity's attachment graph.
    ///
    /// Existing attached statements are kept; duplicates collapse. Returns
    /// the entity id the payload is now attached to.
    ///
    /// # Errors
    ///
    /// [`Error::Precondition`](crate::Error::Precondition) when the entity's
    /// id is empty, or the backend's error when the write fails.
    fn add_data_to_entity(&self, entity: &Self::Entity, payload: &Graph) -> Result<Iri>;

    /// Reads the entity's attachment graph; empty when nothing is attached.
    ///
    /// # Errors
    ///
    /// [`Error::Precondition`](crate::Error::Precondition) when the entity's
    /// id is empty, or the backend's error when the read fails.
    fn find_data_of_entity(&self, entity: &Self::Entity) -> Result<Graph>;
}

impl<T> PartialDataStore for EntityRepository<T> {
    type Entity = T;

    #[instrument(skip_all, fields(class = %self.class(), statements = payload.len()))]
    fn add_data_to_entity(&self, entity: &T, payload: &Graph) -> Result<Iri> {
        let id = self.persistable_id(entity)?;
        self.store.write_with_connection(|conn| {
            let mut attached = conn.read_graph(id.as_str())?;
            attached.extend(payload.iter().cloned());
            conn.write_graph(id.as_str(), &attached)
        })?;
        Ok(id)
    }

    #[instrument(skip_all, fields(class = %self.class()))]
    fn find_data_of_entity(&self, entity: &T) -> Result<Graph> {
        let id = self.persistable_id(entity)?;
        self.store
            .read_with_connection(|conn| conn.read_graph(id.as_str()))
    }
}
