//! SQLite-backed triple store.
//!
//! Durable single-file storage. Triples are rows keyed by graph name, so
//! whole-graph reads and replacements are single indexed statements rather
//! than graph traversals.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection as SqliteHandle, params};

use super::{Connection, Lock, Store, locks};
use crate::model::{Graph, Iri, Literal, Object, Triple};
use crate::{Error, Result};

/// SQLite triple store.
///
/// # Concurrency Model
///
/// Uses a `Mutex<rusqlite::Connection>` because `rusqlite::Connection` is not
/// `Sync`; a [`Connection`] handed out by [`Store::connect`] holds the guard
/// for its whole lifetime, so store work is serialized per process. WAL mode
/// and the `busy_timeout` pragma keep cross-process access graceful.
///
/// # Schema
///
/// One `triples` table: graph name, subject, predicate, and the object split
/// into kind (`iri` or `literal`), value, and optional datatype. The graph
/// name index makes per-graph operations cheap.
pub struct SqliteStore {
    /// Guarded database handle; see the concurrency notes above.
    conn: Mutex<SqliteHandle>,
    /// Path to the database file (None for in-memory).
    db_path: Option<PathBuf>,
}

impl SqliteStore {
    /// Opens (and if needed creates) a database file.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        let conn = SqliteHandle::open(&db_path).map_err(|e| Error::store("open_sqlite", e))?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path: Some(db_path),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Creates an in-memory database (useful for testing).
    ///
    /// All connections from this store share the one underlying database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory() -> Result<Self> {
        let conn =
            SqliteHandle::open_in_memory().map_err(|e| Error::store("open_sqlite_in_memory", e))?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path: None,
        };
        store.initialize()?;
        Ok(store)
    }

    /// Returns the database path (None for in-memory).
    #[must_use]
    pub const fn db_path(&self) -> Option<&PathBuf> {
        self.db_path.as_ref()
    }

    /// Initializes pragmas and the schema.
    fn initialize(&self) -> Result<()> {
        let conn = locks::acquire_lock(&self.conn);

        configure_connection(&conn);

        conn.execute(
            "CREATE TABLE IF NOT EXISTS triples (
                graph_name TEXT NOT NULL,
                subject TEXT NOT NULL,
                predicate TEXT NOT NULL,
                object_kind TEXT NOT NULL,
                object_value TEXT NOT NULL,
                object_datatype TEXT
            )",
            [],
        )
        .map_err(|e| Error::store("create_triples_table", e))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_triples_graph_name ON triples(graph_name)",
            [],
        )
        .map_err(|e| Error::store("create_graph_name_index", e))?;

        Ok(())
    }
}

impl Store for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn connect(&self) -> Result<Box<dyn Connection + '_>> {
        Ok(Box::new(SqliteConnection {
            guard: locks::acquire_lock(&self.conn),
        }))
    }
}

/// Configures a connection for concurrent access.
///
/// WAL allows concurrent readers with a single writer, NORMAL synchronous
/// balances durability with speed, and `busy_timeout` waits out lock
/// contention instead of failing with `SQLITE_BUSY` immediately.
fn configure_connection(conn: &SqliteHandle) {
    // journal_mode returns a result row ("wal"), so pragma_update's
    // value check is ignored rather than treated as a failure.
    let _ = conn.pragma_update(None, "journal_mode", "WAL");
    let _ = conn.pragma_update(None, "synchronous", "NORMAL");
    let _ = conn.pragma_update(None, "busy_timeout", "5000");
}

struct SqliteConnection<'s> {
    guard: MutexGuard<'s, SqliteHandle>,
}

impl Connection for SqliteConnection<'_> {
    fn read_graph(&self, name: &str) -> Result<Graph> {
        let mut stmt = self
            .guard
            .prepare(
                "SELECT subject, predicate, object_kind, object_value, object_datatype
                 FROM triples WHERE graph_name = ?1",
            )
            .map_err(|e| Error::store("prepare_read_graph", e))?;

        let rows = stmt
            .query_map(params![name], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                ))
            })
            .map_err(|e| Error::store("read_graph", e))?;

        let mut graph = Graph::new();
        for row in rows {
            let (subject, predicate, kind, value, datatype) =
                row.map_err(|e| Error::store("read_graph_row", e))?;
            graph.insert(Triple::new(subject, predicate, decode_object(&kind, value, datatype)?));
        }
        Ok(graph)
    }

    fn write_graph(&mut self, name: &str, graph: &Graph) -> Result<()> {
        self.guard
            .execute("DELETE FROM triples WHERE graph_name = ?1", params![name])
            .map_err(|e| Error::store("clear_graph", e))?;

        let mut stmt = self
            .guard
            .prepare(
                "INSERT INTO triples (graph_name, subject, predicate, object_kind, object_value, object_datatype)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .map_err(|e| Error::store("prepare_write_graph", e))?;

        for triple in graph {
            let (kind, value, datatype) = encode_object(&triple.object);
            stmt.execute(params![
                name,
                triple.subject.as_str(),
                triple.predicate.as_str(),
                kind,
                value,
                datatype,
            ])
            .map_err(|e| Error::store("write_graph", e))?;
        }
        Ok(())
    }

    fn remove_graph(&mut self, name: &str) -> Result<usize> {
        self.guard
            .execute("DELETE FROM triples WHERE graph_name = ?1", params![name])
            .map_err(|e| Error::store("remove_graph", e))
    }

    fn graph_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .guard
            .prepare("SELECT DISTINCT graph_name FROM triples ORDER BY graph_name")
            .map_err(|e| Error::store("prepare_graph_names", e))?;

        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| Error::store("graph_names", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::store("graph_names_row", e))?;
        Ok(names)
    }

    fn supports_transactions(&self) -> bool {
        true
    }

    fn begin(&mut self, lock: Lock) -> Result<()> {
        // DEFERRED takes no database lock until first use; IMMEDIATE takes
        // the write lock up front so a writing batch cannot deadlock on
        // upgrade halfway through.
        let statement = match lock {
            Lock::Read => "BEGIN DEFERRED",
            Lock::Write => "BEGIN IMMEDIATE",
        };
        self.guard
            .execute(statement, [])
            .map_err(|e| Error::store("begin_transaction", e))?;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.guard
            .execute("COMMIT", [])
            .map_err(|e| Error::store("commit_transaction", e))?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.guard
            .execute("ROLLBACK", [])
            .map_err(|e| Error::store("rollback_transaction", e))?;
        Ok(())
    }

    fn native(&self) -> Option<&dyn std::any::Any> {
        Some(&*self.guard)
    }
}

fn encode_object(object: &Object) -> (&'static str, &str, Option<&str>) {
    match object {
        Object::Resource(iri) => ("iri", iri.as_str(), None),
        Object::Literal(lit) => ("literal", lit.lexical(), lit.datatype().map(Iri::as_str)),
    }
}

fn decode_object(kind: &str, value: String, datatype: Option<String>) -> Result<Object> {
    match kind {
        "iri" => Ok(Object::Resource(Iri::new(value))),
        "literal" => Ok(Object::Literal(match datatype {
            Some(dt) => Literal::typed(value, dt),
            None => Literal::new(value),
        })),
        other => Err(Error::store(
            "decode_object",
            format!("unknown object kind '{other}'"),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::StoreExt;
    use crate::vocab;

    fn house_graph() -> Graph {
        let mut graph = Graph::new();
        graph.insert(Triple::resource(
            "https://e.org/h/1",
            vocab::rdf::TYPE,
            "https://e.org/ns/House",
        ));
        graph.insert(Triple::literal("https://e.org/h/1", vocab::rdfs::LABEL, "home"));
        graph.insert(Triple::literal("https://e.org/h/1", "https://e.org/ns/age", 30_i64));
        graph
    }

    #[test]
    fn test_write_read_roundtrip() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .write_with_connection(|conn| conn.write_graph("https://e.org/h/1/graph", &house_graph()))
            .unwrap();

        let read = store
            .read_with_connection(|conn| conn.read_graph("https://e.org/h/1/graph"))
            .unwrap();
        assert_eq!(read.len(), 3);
        for triple in &house_graph() {
            assert!(read.contains(triple), "missing {triple:?}");
        }
    }

    #[test]
    fn test_overwrite_replaces_graph() {
        let store = SqliteStore::in_memory().unwrap();
        let mut small = Graph::new();
        small.insert(Triple::literal("https://e.org/h/1", vocab::rdfs::LABEL, "renamed"));

        store
            .write_with_connection(|conn| {
                conn.write_graph("https://e.org/h/1/graph", &house_graph())?;
                conn.write_graph("https://e.org/h/1/graph", &small)
            })
            .unwrap();

        let read = store
            .read_with_connection(|conn| conn.read_graph("https://e.org/h/1/graph"))
            .unwrap();
        assert_eq!(read.len(), 1);
    }

    #[test]
    fn test_remove_graph_counts_statements() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .write_with_connection(|conn| conn.write_graph("https://e.org/h/1/graph", &house_graph()))
            .unwrap();

        let removed = store
            .write_with_connection(|conn| conn.remove_graph("https://e.org/h/1/graph"))
            .unwrap();
        assert_eq!(removed, 3);

        let removed_again = store
            .write_with_connection(|conn| conn.remove_graph("https://e.org/h/1/graph"))
            .unwrap();
        assert_eq!(removed_again, 0);
    }

    #[test]
    fn test_graph_names_distinct_and_sorted() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .write_with_connection(|conn| {
                conn.write_graph("https://e.org/b", &house_graph())?;
                conn.write_graph("https://e.org/a", &house_graph())
            })
            .unwrap();

        let names = store
            .read_with_connection(|conn| conn.graph_names())
            .unwrap();
        assert_eq!(names, vec!["https://e.org/a".to_string(), "https://e.org/b".to_string()]);
    }

    #[test]
    fn test_rollback_leaves_prior_state() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .write_with_connection(|conn| conn.write_graph("https://e.org/h/1/graph", &house_graph()))
            .unwrap();

        let result: Result<()> = store.write_with_connection(|conn| {
            conn.remove_graph("https://e.org/h/1/graph")?;
            Err(Error::Precondition("abort".to_string()))
        });
        assert!(result.is_err());

        let read = store
            .read_with_connection(|conn| conn.read_graph("https://e.org/h/1/graph"))
            .unwrap();
        assert_eq!(read.len(), 3, "rolled-back removal must not stick");
    }

    #[test]
    fn test_typed_literal_datatype_survives() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .write_with_connection(|conn| conn.write_graph("https://e.org/h/1/graph", &house_graph()))
            .unwrap();

        let read = store
            .read_with_connection(|conn| conn.read_graph("https://e.org/h/1/graph"))
            .unwrap();
        let subject = Iri::new("https://e.org/h/1");
        let age = read
            .objects(&subject, "https://e.org/ns/age")
            .next()
            .and_then(Object::as_literal)
            .unwrap();
        assert_eq!(age.lexical(), "30");
        assert_eq!(age.datatype().map(Iri::as_str), Some(vocab::xsd::INTEGER));
    }

    #[test]
    fn test_decode_object_rejects_unknown_kind() {
        let err = decode_object("blank", "x".to_string(), None).unwrap_err();
        assert!(matches!(err, Error::Store { .. }));
    }

    #[test]
    fn test_in_memory_has_no_path() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.db_path().is_none());
    }
}
