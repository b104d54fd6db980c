//! `EntityRepository` integration tests.
//!
//! Runs the full mapping → repository → store pipeline against real
//! backends, focusing on:
//! - Save/load roundtrips on memory and `SQLite`
//! - Overwrite semantics (no stale triples after re-save)
//! - Class-scoped scans with mixed entity types
//! - Delete completeness, including attached payload graphs
//! - Batch operations and precondition failures
//! - The built-in Root/Project/Pool/Bucket hierarchy

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;

use tempfile::TempDir;
use tripod::domain::{self, Bucket, Pool, Project};
use tripod::repository::graph_name;
use tripod::{
    EntityRepository, Error, Graph, Iri, MemoryStore, PartialDataStore, SqliteStore, Store,
    StoreExt, SubjectMapping, Triple, vocab,
};

// ============================================================================
// Test Fixtures
// ============================================================================

const HOUSE_CLASS: &str = "https://example.com/ns/House";
const GARAGE_CLASS: &str = "https://example.com/ns/Garage";
const HAS_ROOM: &str = "https://example.com/ns/hasRoom";
const AREA: &str = "https://example.com/ns/area";

#[derive(Debug, Clone, PartialEq, Eq)]
struct House {
    id: Iri,
    label: Option<String>,
    area: Option<i64>,
    rooms: Vec<Iri>,
}

impl House {
    fn new(label: &str) -> Self {
        Self {
            id: Iri::mint(&Iri::new(HOUSE_CLASS)),
            label: Some(label.to_string()),
            area: None,
            rooms: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Garage {
    id: Iri,
    label: Option<String>,
}

fn house_mapping() -> SubjectMapping<House> {
    SubjectMapping::builder(HOUSE_CLASS)
        .id(|h: &House| &h.id)
        .literal(vocab::rdfs::LABEL, |h: &House| h.label.clone())
        .literal(AREA, |h: &House| h.area)
        .resources(HAS_ROOM, |h: &House| h.rooms.as_slice(), Iri::clone)
        .build()
        .expect("house mapping")
}

fn house_repository(store: Arc<dyn Store>) -> EntityRepository<House> {
    EntityRepository::new(store, house_mapping(), |reader| {
        Ok(House {
            id: reader.id().clone(),
            label: reader.label().map(String::from),
            area: reader.literal(AREA)?,
            rooms: reader.resources(HAS_ROOM)?,
        })
    })
}

fn garage_repository(store: Arc<dyn Store>) -> EntityRepository<Garage> {
    let mapping = SubjectMapping::builder(GARAGE_CLASS)
        .id(|g: &Garage| &g.id)
        .literal(vocab::rdfs::LABEL, |g: &Garage| g.label.clone())
        .build()
        .expect("garage mapping");
    EntityRepository::new(store, mapping, |reader| {
        Ok(Garage {
            id: reader.id().clone(),
            label: reader.label().map(String::from),
        })
    })
}

fn memory_store() -> Arc<dyn Store> {
    Arc::new(MemoryStore::new())
}

fn sqlite_store(dir: &TempDir) -> Arc<dyn Store> {
    Arc::new(SqliteStore::new(dir.path().join("entities.db")).expect("open sqlite"))
}

// ============================================================================
// Roundtrips
// ============================================================================

fn assert_roundtrip(store: Arc<dyn Store>) {
    let repo = house_repository(store);
    let mut house = House::new("lakeside");
    house.area = Some(240);
    house.rooms = vec![
        Iri::new("https://example.com/rooms/kitchen"),
        Iri::new("https://example.com/rooms/attic"),
    ];

    let id = repo.save(&house).expect("save");
    assert_eq!(id, house.id);

    let reloaded = repo.find_by_id(&house.id).expect("find").expect("present");
    assert_eq!(reloaded.label, house.label);
    assert_eq!(reloaded.area, house.area);
    assert_eq!(reloaded.rooms.len(), 2);
    assert!(reloaded.rooms.contains(&house.rooms[0]));
    assert!(reloaded.rooms.contains(&house.rooms[1]));
}

#[test]
fn test_roundtrip_on_memory() {
    assert_roundtrip(memory_store());
}

#[test]
fn test_roundtrip_on_sqlite() {
    let dir = TempDir::new().unwrap();
    assert_roundtrip(sqlite_store(&dir));
}

#[test]
fn test_save_overwrites_previous_state() {
    let store = memory_store();
    let repo = house_repository(Arc::clone(&store));
    let mut house = House::new("before");
    house.rooms = vec![Iri::new("https://example.com/rooms/old")];
    repo.save(&house).unwrap();

    house.label = Some("after".to_string());
    house.rooms = vec![Iri::new("https://example.com/rooms/new")];
    repo.save(&house).unwrap();

    let all = repo.find_all().unwrap();
    assert_eq!(all.len(), 1, "re-save must not create a second entity");
    assert_eq!(all[0].label.as_deref(), Some("after"));
    assert_eq!(all[0].rooms, house.rooms, "stale rooms must be gone");

    let stored = store
        .read_with_connection(|conn| conn.read_graph(&graph_name(&house.id)))
        .unwrap();
    let labels: Vec<_> = stored.objects(&house.id, vocab::rdfs::LABEL).collect();
    assert_eq!(labels.len(), 1, "exactly one label statement after re-save");
}

#[test]
fn test_find_by_id_absent_is_none() {
    let repo = house_repository(memory_store());
    let missing = Iri::new("https://example.com/ns/House/nope");
    assert!(repo.find_by_id(&missing).unwrap().is_none());
}

#[test]
fn test_find_by_id_type_mismatch_is_error() {
    let store = memory_store();
    let repo = house_repository(Arc::clone(&store));

    // A graph whose area literal cannot parse as an integer.
    let id = Iri::new("https://example.com/ns/House/broken");
    let mut graph = Graph::new();
    graph.insert(Triple::resource(id.clone(), vocab::rdf::TYPE, HOUSE_CLASS));
    graph.insert(Triple::literal(id.clone(), AREA, "not-a-number"));
    store
        .write_with_connection(|conn| conn.write_graph(&graph_name(&id), &graph))
        .unwrap();

    let err = repo.find_by_id(&id).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }), "got {err:?}");
}

// ============================================================================
// Scans
// ============================================================================

#[test]
fn test_find_all_is_scoped_to_class() {
    let store = memory_store();
    let houses = house_repository(Arc::clone(&store));
    let garages = garage_repository(Arc::clone(&store));

    houses.save(&House::new("a")).unwrap();
    houses.save(&House::new("b")).unwrap();
    garages
        .save(&Garage {
            id: Iri::mint(&Iri::new(GARAGE_CLASS)),
            label: Some("parking".to_string()),
        })
        .unwrap();

    assert_eq!(houses.find_all().unwrap().len(), 2);
    assert_eq!(garages.find_all().unwrap().len(), 1);
}

#[test]
fn test_find_all_skips_payload_graphs() {
    let store = memory_store();
    let repo = house_repository(Arc::clone(&store));
    let house = House::new("with-payload");
    repo.save(&house).unwrap();

    let mut payload = Graph::new();
    payload.insert(Triple::literal(
        house.id.clone(),
        "https://example.com/ns/note",
        "free-form",
    ));
    repo.add_data_to_entity(&house, &payload).unwrap();

    // The payload graph lives under the bare id and must not surface as an
    // extra entity.
    assert_eq!(repo.find_all().unwrap().len(), 1);
}

// ============================================================================
// Deletes
// ============================================================================

#[test]
fn test_delete_clears_entity_and_payload() {
    let store = memory_store();
    let repo = house_repository(Arc::clone(&store));
    let house = House::new("doomed");
    repo.save(&house).unwrap();

    let mut payload = Graph::new();
    payload.insert(Triple::literal(
        house.id.clone(),
        "https://example.com/ns/note",
        "attachment",
    ));
    repo.add_data_to_entity(&house, &payload).unwrap();

    // 2 structural statements (type + label) + 1 attached.
    let removed = repo.delete(&house).unwrap();
    assert_eq!(removed, 3);

    assert!(repo.find_by_id(&house.id).unwrap().is_none());
    assert!(repo.find_data_of_entity(&house).unwrap().is_empty());
    assert_eq!(repo.delete(&house).unwrap(), 0, "second delete finds nothing");

    let names = store
        .read_with_connection(|conn| conn.graph_names())
        .unwrap();
    assert!(names.is_empty(), "leftover graphs: {names:?}");
}

// ============================================================================
// Batches and Preconditions
// ============================================================================

#[test]
fn test_save_all_and_delete_all() {
    let repo = house_repository(memory_store());
    let houses = vec![House::new("one"), House::new("two"), House::new("three")];

    let ids = repo.save_all(&houses).unwrap();
    assert_eq!(ids.len(), 3);
    assert_eq!(repo.find_all().unwrap().len(), 3);

    let removed = repo.delete_all(&houses).unwrap();
    assert!(removed > 0);
    assert!(repo.find_all().unwrap().is_empty());
}

#[test]
fn test_save_all_rejects_batch_with_empty_id() {
    let repo = house_repository(memory_store());
    let good = House::new("good");
    let mut bad = House::new("bad");
    bad.id = Iri::new("");

    let err = repo.save_all(&[good, bad]).unwrap_err();
    assert!(matches!(err, Error::Precondition(_)));
    assert!(
        repo.find_all().unwrap().is_empty(),
        "a rejected batch must not be partially written"
    );
}

// ============================================================================
// Built-in Hierarchy
// ============================================================================

#[test]
fn test_workspace_hierarchy_on_sqlite() {
    let dir = TempDir::new().unwrap();
    let store = sqlite_store(&dir);

    let roots = domain::root_repository(Arc::clone(&store)).unwrap();
    let projects = domain::project_repository(Arc::clone(&store)).unwrap();
    let pools = domain::pool_repository(Arc::clone(&store)).unwrap();
    let buckets = domain::bucket_repository(Arc::clone(&store)).unwrap();

    let pool = Pool::new().with_label("models");
    pools.save(&pool).unwrap();

    let bucket = Bucket::new().with_label("data").with_source_pool(&pool);
    buckets.save(&bucket).unwrap();

    let mut project = Project::new().with_label("demo");
    project.add_pool(&pool);
    project.add_bucket(&bucket);
    projects.save(&project).unwrap();

    let mut root = domain::get_or_create_root(&roots).unwrap();
    root.add_project(&project);
    roots.save(&root).unwrap();

    // Walk the hierarchy back up from a fresh load.
    let root = domain::get_or_create_root(&roots).unwrap();
    assert_eq!(root.projects, vec![project.id.clone()]);

    let project = projects
        .find_by_id(&root.projects[0])
        .unwrap()
        .expect("project");
    assert_eq!(project.label.as_deref(), Some("demo"));

    let pool = pools.find_by_id(&project.pools[0]).unwrap().expect("pool");
    let bucket = buckets
        .find_by_id(&project.buckets[0])
        .unwrap()
        .expect("bucket");
    assert_eq!(bucket.pool.as_ref(), Some(&pool.id));
}
