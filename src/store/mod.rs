//! Pluggable triple-store backends behind a single connection contract.
//!
//! A [`Store`] hands out [`Connection`]s; everything above this module talks
//! to connections only, so swapping the in-memory backend for SQLite or a
//! remote SPARQL endpoint is a configuration change, not a code change.
//!
//! Connections expose whole-graph operations (read, replace, remove, list)
//! plus a transaction surface. Backends without transactions report so via
//! [`Connection::supports_transactions`] and the scoped helpers in
//! [`StoreExt`] skip the begin/commit/rollback envelope for them.

mod locks;
mod memory;
mod metrics;
mod noop;
mod sparql;
mod sqlite;

pub use memory::MemoryStore;
pub use noop::NoopStore;
pub use sparql::SparqlStore;
pub use sqlite::SqliteStore;

use std::any::Any;
use std::time::Instant;

use crate::Result;
use crate::model::Graph;

/// Advisory lock hint for a unit of store work.
///
/// Backends are free to ignore the hint; the SQLite backend maps it onto its
/// transaction kind (`Read` → `BEGIN DEFERRED`, `Write` → `BEGIN IMMEDIATE`)
/// so writers take the database lock up front instead of deadlocking on
/// upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lock {
    /// The closure only reads.
    Read,
    /// The closure may write.
    Write,
}

impl Lock {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

/// A live connection to one backend.
///
/// Graph names are opaque strings (in practice IRIs). Reading an absent graph
/// yields an empty [`Graph`], never an error; absence is a normal answer.
///
/// Transactional backends pair `begin` with exactly one `commit` or
/// `rollback` and report misuse (commit without begin, nested begin) as
/// [`Error::Store`](crate::Error::Store). Non-transactional backends accept
/// the whole transaction surface as a no-op.
pub trait Connection {
    /// Reads the full contents of the named graph.
    fn read_graph(&self, name: &str) -> Result<Graph>;

    /// Replaces the named graph with `graph`, creating it if absent.
    fn write_graph(&mut self, name: &str, graph: &Graph) -> Result<()>;

    /// Removes the named graph, returning how many statements it held.
    fn remove_graph(&mut self, name: &str) -> Result<usize>;

    /// Lists all graph names, lexicographically sorted.
    fn graph_names(&self) -> Result<Vec<String>>;

    /// Whether `begin`/`commit`/`rollback` actually delimit a transaction.
    fn supports_transactions(&self) -> bool;

    /// Opens a transaction under the given lock hint.
    fn begin(&mut self, lock: Lock) -> Result<()>;

    /// Commits the open transaction.
    fn commit(&mut self) -> Result<()>;

    /// Discards the open transaction.
    fn rollback(&mut self) -> Result<()>;

    /// The backend-native handle, for callers that need to step outside the
    /// contract. Backends without a meaningful handle return `None`.
    fn native(&self) -> Option<&dyn Any> {
        None
    }
}

impl<'c> dyn Connection + 'c {
    /// Downcasts the backend-native handle to a concrete type.
    ///
    /// Returns `None` when the backend exposes no handle or the handle is
    /// not a `T`.
    ///
    /// ```ignore
    /// if let Some(sqlite) = conn.native_as::<rusqlite::Connection>() {
    ///     sqlite.execute("VACUUM", [])?;
    /// }
    /// ```
    #[must_use]
    pub fn native_as<T: Any>(&self) -> Option<&T> {
        self.native().and_then(<dyn Any>::downcast_ref)
    }
}

/// A triple-store backend.
///
/// Stores are shared across threads behind `Arc<dyn Store>`; connections are
/// short-lived and stay on the thread that opened them.
pub trait Store: Send + Sync {
    /// Stable backend name used in logs and metric labels.
    fn name(&self) -> &'static str;

    /// Opens a connection.
    fn connect(&self) -> Result<Box<dyn Connection + '_>>;
}

/// Scoped connection helpers for any [`Store`].
///
/// `with_connection` owns the transaction envelope: begin under the lock
/// hint, run the closure, commit on success, roll back on failure. The
/// closure's error is always the one propagated; a rollback failure on top of
/// it is logged, not raised, so the original cause is never masked.
pub trait StoreExt: Store {
    /// Runs `op` on a fresh connection under the given lock hint.
    fn with_connection<T, F>(&self, lock: Lock, op: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Connection) -> Result<T>,
    {
        let start = Instant::now();
        let result = (|| {
            let mut conn = self.connect()?;
            if conn.supports_transactions() {
                conn.begin(lock)?;
                match op(&mut *conn) {
                    Ok(value) => {
                        conn.commit()?;
                        Ok(value)
                    }
                    Err(err) => {
                        if let Err(rollback_err) = conn.rollback() {
                            tracing::warn!(
                                backend = self.name(),
                                error = %rollback_err,
                                "rollback failed after aborted store operation"
                            );
                        }
                        Err(err)
                    }
                }
            } else {
                op(&mut *conn)
            }
        })();

        let status = if result.is_ok() { "success" } else { "error" };
        metrics::record_store_operation(self.name(), lock.as_str(), start, status);
        result
    }

    /// Runs a read-only `op` on a fresh connection.
    fn read_with_connection<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Connection) -> Result<T>,
    {
        self.with_connection(Lock::Read, op)
    }

    /// Runs a writing `op` on a fresh connection.
    fn write_with_connection<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Connection) -> Result<T>,
    {
        self.with_connection(Lock::Write, op)
    }
}

impl<S: Store + ?Sized> StoreExt for S {}
