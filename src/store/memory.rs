//! In-memory backend.
//!
//! Graphs live in a `RwLock`-guarded map. Useful for tests and for
//! deployments that treat the graph as a rebuildable cache; nothing survives
//! the process.

use std::collections::HashMap;
use std::sync::RwLock;

use super::{Connection, Lock, Store, locks};
use crate::model::Graph;
use crate::{Error, Result};

/// In-memory triple store.
///
/// Transactions are staged per connection: writes land in a private overlay
/// and are applied to the shared map under a single write guard on commit,
/// so a rolled-back batch is never visible to other connections.
#[derive(Debug, Default)]
pub struct MemoryStore {
    graphs: RwLock<HashMap<String, Graph>>,
}

impl MemoryStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of named graphs currently held (including empty ones).
    #[must_use]
    pub fn graph_count(&self) -> usize {
        locks::read_lock(&self.graphs).len()
    }
}

impl Store for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn connect(&self) -> Result<Box<dyn Connection + '_>> {
        Ok(Box::new(MemoryConnection {
            graphs: &self.graphs,
            staged: None,
        }))
    }
}

/// One connection's view of the shared map.
///
/// `staged` is `Some` while a transaction is open; an entry of `None` marks a
/// pending removal. Reads through the connection see staged state first, so a
/// transaction reads its own writes.
struct MemoryConnection<'s> {
    graphs: &'s RwLock<HashMap<String, Graph>>,
    staged: Option<HashMap<String, Option<Graph>>>,
}

impl Connection for MemoryConnection<'_> {
    fn read_graph(&self, name: &str) -> Result<Graph> {
        if let Some(staged) = &self.staged
            && let Some(pending) = staged.get(name)
        {
            return Ok(pending.clone().unwrap_or_default());
        }
        Ok(locks::read_lock(self.graphs)
            .get(name)
            .cloned()
            .unwrap_or_default())
    }

    fn write_graph(&mut self, name: &str, graph: &Graph) -> Result<()> {
        match &mut self.staged {
            Some(staged) => {
                staged.insert(name.to_string(), Some(graph.clone()));
            }
            None => {
                locks::write_lock(self.graphs).insert(name.to_string(), graph.clone());
            }
        }
        Ok(())
    }

    fn remove_graph(&mut self, name: &str) -> Result<usize> {
        let removed = self.read_graph(name)?.len();
        match &mut self.staged {
            Some(staged) => {
                staged.insert(name.to_string(), None);
            }
            None => {
                locks::write_lock(self.graphs).remove(name);
            }
        }
        Ok(removed)
    }

    fn graph_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = locks::read_lock(self.graphs).keys().cloned().collect();
        if let Some(staged) = &self.staged {
            for (name, pending) in staged {
                match pending {
                    Some(_) => {
                        if !names.contains(name) {
                            names.push(name.clone());
                        }
                    }
                    None => names.retain(|n| n != name),
                }
            }
        }
        names.sort_unstable();
        Ok(names)
    }

    fn supports_transactions(&self) -> bool {
        true
    }

    fn begin(&mut self, _lock: Lock) -> Result<()> {
        if self.staged.is_some() {
            return Err(Error::store("begin", "transaction already open"));
        }
        self.staged = Some(HashMap::new());
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        let Some(staged) = self.staged.take() else {
            return Err(Error::store("commit", "no open transaction"));
        };
        let mut graphs = locks::write_lock(self.graphs);
        for (name, pending) in staged {
            match pending {
                Some(graph) => {
                    graphs.insert(name, graph);
                }
                None => {
                    graphs.remove(&name);
                }
            }
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        if self.staged.take().is_none() {
            return Err(Error::store("rollback", "no open transaction"));
        }
        Ok(())
    }
}
