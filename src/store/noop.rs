//! Disabled-persistence backend.
//!
//! Every operation succeeds and touches nothing: reads come back empty,
//! writes vanish, removals count zero. Deployments that switch persistence
//! off keep the same code paths and lose only the data.

use super::{Connection, Lock, Store};
use crate::Result;
use crate::model::Graph;

/// Store that accepts everything and retains nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStore;

impl NoopStore {
    /// Creates the no-op store.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Store for NoopStore {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn connect(&self) -> Result<Box<dyn Connection + '_>> {
        Ok(Box::new(NoopConnection))
    }
}

struct NoopConnection;

impl Connection for NoopConnection {
    fn read_graph(&self, _name: &str) -> Result<Graph> {
        Ok(Graph::new())
    }

    fn write_graph(&mut self, _name: &str, _graph: &Graph) -> Result<()> {
        Ok(())
    }

    fn remove_graph(&mut self, _name: &str) -> Result<usize> {
        Ok(0)
    }

    fn graph_names(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn supports_transactions(&self) -> bool {
        false
    }

    fn begin(&mut self, _lock: Lock) -> Result<()> {
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        Ok(())
    }
}
