//! Built-in entity types and their wired repositories.
//!
//! The workspace hierarchy is Root → Project → {Pool, Bucket}: one
//! well-known [`Root`] holds projects, a project groups pools of models and
//! buckets of data, and relations are held as ids rather than owned child
//! values so partially loaded object trees are impossible by construction.
//!
//! The `*_repository` constructors double as the reference wiring for the
//! mapping DSL; custom entity types follow the same shape.

use std::sync::Arc;

use crate::mapping::SubjectMapping;
use crate::model::Iri;
use crate::repository::EntityRepository;
use crate::store::Store;
use crate::{Result, vocab};

/// Well-known id of the workspace root.
pub const ROOT_ID: &str = "https://tripod.dev/ns/1.0/Root/root";

/// The singleton workspace root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Root {
    /// Always [`ROOT_ID`]; kept as a field so the id accessor has something
    /// to borrow.
    pub id: Iri,
    /// Ids of the projects in this workspace.
    pub projects: Vec<Iri>,
}

impl Root {
    /// Creates the root value (not yet persisted).
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Iri::new(ROOT_ID),
            projects: Vec::new(),
        }
    }

    /// Registers a project.
    pub fn add_project(&mut self, project: &Project) {
        self.projects.push(project.id.clone());
    }
}

impl Default for Root {
    fn default() -> Self {
        Self::new()
    }
}

/// A project grouping pools and buckets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// Entity id, minted under the Project class IRI.
    pub id: Iri,
    /// Human-readable name.
    pub label: Option<String>,
    /// Ids of the project's pools.
    pub pools: Vec<Iri>,
    /// Ids of the project's buckets.
    pub buckets: Vec<Iri>,
}

impl Project {
    /// Creates a project with a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Iri::mint(&Iri::new(vocab::class::PROJECT)),
            label: None,
            pools: Vec::new(),
            buckets: Vec::new(),
        }
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Registers a pool.
    pub fn add_pool(&mut self, pool: &Pool) {
        self.pools.push(pool.id.clone());
    }

    /// Registers a bucket.
    pub fn add_bucket(&mut self, bucket: &Bucket) {
        self.buckets.push(bucket.id.clone());
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

/// A pool of model resources inside a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    /// Entity id, minted under the Pool class IRI.
    pub id: Iri,
    /// Human-readable name.
    pub label: Option<String>,
}

impl Pool {
    /// Creates a pool with a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Iri::mint(&Iri::new(vocab::class::POOL)),
            label: None,
        }
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

/// A bucket of data resources inside a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    /// Entity id, minted under the Bucket class IRI.
    pub id: Iri,
    /// Human-readable name.
    pub label: Option<String>,
    /// The pool this bucket's contents came from, when known.
    pub pool: Option<Iri>,
}

impl Bucket {
    /// Creates a bucket with a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Iri::mint(&Iri::new(vocab::class::BUCKET)),
            label: None,
            pool: None,
        }
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the source pool.
    #[must_use]
    pub fn with_source_pool(mut self, pool: &Pool) -> Self {
        self.pool = Some(pool.id.clone());
        self
    }
}

impl Default for Bucket {
    fn default() -> Self {
        Self::new()
    }
}

/// Repository for the workspace root.
///
/// # Errors
///
/// Propagates mapping construction failures.
pub fn root_repository(store: Arc<dyn Store>) -> Result<EntityRepository<Root>> {
    let mapping = SubjectMapping::builder(vocab::class::ROOT)
        .id(|r: &Root| &r.id)
        .resources(
            vocab::predicate::HAS_PROJECT,
            |r: &Root| r.projects.as_slice(),
            Iri::clone,
        )
        .build()?;
    Ok(EntityRepository::new(store, mapping, |reader| {
        Ok(Root {
            id: reader.id().clone(),
            projects: reader.resources(vocab::predicate::HAS_PROJECT)?,
        })
    }))
}

/// Repository for projects.
///
/// # Errors
///
/// Propagates mapping construction failures.
pub fn project_repository(store: Arc<dyn Store>) -> Result<EntityRepository<Project>> {
    let mapping = SubjectMapping::builder(vocab::class::PROJECT)
        .id(|p: &Project| &p.id)
        .literal(vocab::rdfs::LABEL, |p: &Project| p.label.clone())
        .resources(
            vocab::predicate::HAS_POOL,
            |p: &Project| p.pools.as_slice(),
            Iri::clone,
        )
        .resources(
            vocab::predicate::HAS_BUCKET,
            |p: &Project| p.buckets.as_slice(),
            Iri::clone,
        )
        .build()?;
    Ok(EntityRepository::new(store, mapping, |reader| {
        Ok(Project {
            id: reader.id().clone(),
            label: reader.label().map(String::from),
            pools: reader.resources(vocab::predicate::HAS_POOL)?,
            buckets: reader.resources(vocab::predicate::HAS_BUCKET)?,
        })
    }))
}

/// Repository for pools.
///
/// # Errors
///
/// Propagates mapping construction failures.
pub fn pool_repository(store: Arc<dyn Store>) -> Result<EntityRepository<Pool>> {
    let mapping = SubjectMapping::builder(vocab::class::POOL)
        .id(|p: &Pool| &p.id)
        .literal(vocab::rdfs::LABEL, |p: &Pool| p.label.clone())
        .build()?;
    Ok(EntityRepository::new(store, mapping, |reader| {
        Ok(Pool {
            id: reader.id().clone(),
            label: reader.label().map(String::from),
        })
    }))
}

/// Repository for buckets.
///
/// # Errors
///
/// Propagates mapping construction failures.
pub fn bucket_repository(store: Arc<dyn Store>) -> Result<EntityRepository<Bucket>> {
    let mapping = SubjectMapping::builder(vocab::class::BUCKET)
        .id(|b: &Bucket| &b.id)
        .literal(vocab::rdfs::LABEL, |b: &Bucket| b.label.clone())
        .resource(
            vocab::predicate::SOURCE_POOL,
            |b: &Bucket| b.pool.as_ref(),
            Iri::clone,
        )
        .build()?;
    Ok(EntityRepository::new(store, mapping, |reader| {
        Ok(Bucket {
            id: reader.id().clone(),
            label: reader.label().map(String::from),
            pool: reader.resource(vocab::predicate::SOURCE_POOL)?,
        })
    }))
}

/// Loads the workspace root, creating and persisting it on first call.
///
/// Idempotent: the root lives at the well-known [`ROOT_ID`], so every call
/// converges on the same graph, including concurrent first calls (both write
/// the same initial content).
///
/// # Errors
///
/// Propagates store failures from the lookup or the initial save.
pub fn get_or_create_root(repo: &EntityRepository<Root>) -> Result<Root> {
    let id = Iri::new(ROOT_ID);
    if let Some(root) = repo.find_by_id(&id)? {
        return Ok(root);
    }
    let root = Root::new();
    repo.save(&root)?;
    Ok(root)
}
