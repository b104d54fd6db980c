//! Store backend configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::store::{MemoryStore, NoopStore, SparqlStore, SqliteStore, Store};
use crate::{Error, Result};

/// Declarative choice of persistence backend.
///
/// Typically parsed from a TOML file and opened once at startup:
///
/// ```toml
/// backend = "sqlite"
/// path = "/var/lib/tripod/workspace.db"
/// ```
///
/// ```toml
/// backend = "sparql"
/// endpoint = "http://localhost:3030/ds/sparql"
/// update_endpoint = "http://localhost:3030/ds/update"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Process-local, non-durable storage.
    #[default]
    Memory,
    /// Durable single-file storage.
    Sqlite {
        /// Database file location; created on first open.
        path: PathBuf,
    },
    /// Remote SPARQL 1.1 endpoint.
    Sparql {
        /// Query endpoint URL.
        endpoint: String,
        /// Update endpoint URL, when it differs from the query endpoint.
        update_endpoint: Option<String>,
    },
    /// Persistence switched off: writes are discarded, reads come back empty.
    Disabled,
}

impl StoreConfig {
    /// Loads a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| Error::store("read_store_config", e))?;
        toml::from_str(&contents).map_err(|e| Error::store("parse_store_config", e))
    }

    /// Opens the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to initialize, such as an
    /// unreachable database file.
    pub fn open(&self) -> Result<Arc<dyn Store>> {
        tracing::debug!(backend = self.backend_name(), "opening store backend");
        match self {
            Self::Memory => Ok(Arc::new(MemoryStore::new())),
            Self::Sqlite { path } => Ok(Arc::new(SqliteStore::new(path.clone())?)),
            Self::Sparql {
                endpoint,
                update_endpoint,
            } => {
                let mut store = SparqlStore::new(endpoint.clone());
                if let Some(update) = update_endpoint {
                    store = store.with_update_endpoint(update.clone());
                }
                Ok(Arc::new(store))
            }
            Self::Disabled => Ok(Arc::new(NoopStore::new())),
        }
    }

    /// Name of the backend this configuration selects, matching
    /// [`Store::name`].
    #[must_use]
    pub const fn backend_name(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Sqlite { .. } => "sqlite",
            Self::Sparql { .. } => "sparql",
            Self::Disabled => "noop",
        }
    }
}
