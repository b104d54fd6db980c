//! Remote SPARQL 1.1 protocol backend.
//!
//! Talks to any SPARQL 1.1 endpoint (Fuseki, Virtuoso, GraphDB, ...): reads
//! go through `SELECT` queries answered as SPARQL JSON results, writes go
//! through `DROP SILENT` / `INSERT DATA` updates carrying the graph as
//! N-Triples. The endpoint offers no cross-request transactions, so this
//! backend reports itself non-transactional and each operation stands alone.
//!
//! Query rendering and result decoding are pure functions, tested without a
//! network.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use super::{Connection, Lock, Store};
use crate::model::{Graph, Iri, Literal, Object, Triple};
use crate::{Error, Result};

/// SPARQL protocol triple store.
pub struct SparqlStore {
    /// Endpoint answering `SELECT` queries.
    query_endpoint: String,
    /// Endpoint accepting updates; defaults to the query endpoint.
    update_endpoint: String,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl SparqlStore {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Creates a client for an endpoint that answers both queries and
    /// updates (the common single-dataset deployment).
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        Self {
            query_endpoint: endpoint.clone(),
            update_endpoint: endpoint,
            client: build_client(Self::DEFAULT_TIMEOUT),
        }
    }

    /// Sets a separate update endpoint (Fuseki-style `/query` + `/update`).
    #[must_use]
    pub fn with_update_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.update_endpoint = endpoint.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    /// Runs a `SELECT` query and decodes the JSON results.
    fn select(&self, operation: &'static str, query: &str) -> Result<SelectResults> {
        let response = self
            .client
            .post(&self.query_endpoint)
            .header(reqwest::header::ACCEPT, "application/sparql-results+json")
            .form(&[("query", query)])
            .send()
            .map_err(|e| {
                let error_kind = classify_error(&e);
                tracing::error!(
                    backend = "sparql",
                    endpoint = %self.query_endpoint,
                    error = %e,
                    error_kind = error_kind,
                    "SPARQL query request failed"
                );
                Error::store(operation, format!("{error_kind} error: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            tracing::error!(
                backend = "sparql",
                endpoint = %self.query_endpoint,
                status = %status,
                body = %body,
                "SPARQL endpoint returned error status"
            );
            return Err(Error::store(
                operation,
                format!("endpoint returned status: {status} - {body}"),
            ));
        }

        response.json().map_err(|e| {
            tracing::error!(
                backend = "sparql",
                endpoint = %self.query_endpoint,
                error = %e,
                "Failed to parse SPARQL results"
            );
            Error::store(operation, format!("invalid results body: {e}"))
        })
    }

    /// Posts a SPARQL update.
    fn update(&self, operation: &'static str, update: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.update_endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/sparql-update")
            .body(update.to_string())
            .send()
            .map_err(|e| {
                let error_kind = classify_error(&e);
                tracing::error!(
                    backend = "sparql",
                    endpoint = %self.update_endpoint,
                    error = %e,
                    error_kind = error_kind,
                    "SPARQL update request failed"
                );
                Error::store(operation, format!("{error_kind} error: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            tracing::error!(
                backend = "sparql",
                endpoint = %self.update_endpoint,
                status = %status,
                body = %body,
                "SPARQL endpoint rejected update"
            );
            return Err(Error::store(
                operation,
                format!("endpoint returned status: {status} - {body}"),
            ));
        }
        Ok(())
    }
}

impl Store for SparqlStore {
    fn name(&self) -> &'static str {
        "sparql"
    }

    fn connect(&self) -> Result<Box<dyn Connection + '_>> {
        Ok(Box::new(SparqlConnection { store: self }))
    }
}

fn build_client(timeout: Duration) -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|err| {
            tracing::warn!("Failed to build SPARQL HTTP client: {err}");
            reqwest::blocking::Client::new()
        })
}

fn classify_error(e: &reqwest::Error) -> &'static str {
    if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connect"
    } else if e.is_request() {
        "request"
    } else {
        "unknown"
    }
}

struct SparqlConnection<'s> {
    store: &'s SparqlStore,
}

impl Connection for SparqlConnection<'_> {
    fn read_graph(&self, name: &str) -> Result<Graph> {
        let results = self.store.select("read_graph", &select_graph_query(name))?;
        let mut graph = Graph::new();
        for binding in &results.results.bindings {
            graph.insert(binding_to_triple(binding)?);
        }
        Ok(graph)
    }

    fn write_graph(&mut self, name: &str, graph: &Graph) -> Result<()> {
        self.store
            .update("write_graph", &replace_graph_update(name, graph))
    }

    fn remove_graph(&mut self, name: &str) -> Result<usize> {
        let results = self.store.select("remove_graph", &graph_count_query(name))?;
        let removed = decode_count(&results);
        self.store.update("remove_graph", &drop_graph_update(name))?;
        Ok(removed)
    }

    fn graph_names(&self) -> Result<Vec<String>> {
        let results = self.store.select("graph_names", &graph_names_query())?;
        let names = results
            .results
            .bindings
            .iter()
            .filter_map(|binding| binding.get("g").map(|term| term.value.clone()))
            .collect();
        Ok(names)
    }

    fn supports_transactions(&self) -> bool {
        false
    }

    // The protocol has no cross-request transactions; the envelope is
    // accepted and ignored.
    fn begin(&mut self, _lock: Lock) -> Result<()> {
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        Ok(())
    }

    fn native(&self) -> Option<&dyn std::any::Any> {
        Some(&self.store.client)
    }
}

fn select_graph_query(name: &str) -> String {
    format!("SELECT ?s ?p ?o WHERE {{ GRAPH <{name}> {{ ?s ?p ?o }} }}")
}

fn graph_count_query(name: &str) -> String {
    format!("SELECT (COUNT(*) AS ?n) WHERE {{ GRAPH <{name}> {{ ?s ?p ?o }} }}")
}

fn graph_names_query() -> String {
    "SELECT DISTINCT ?g WHERE { GRAPH ?g { ?s ?p ?o } } ORDER BY ?g".to_string()
}

/// Renders the whole-graph replacement as one update request.
///
/// `DROP SILENT` first so the update succeeds whether or not the graph
/// already exists; both statements travel in one request, which is as atomic
/// as the protocol gets.
fn replace_graph_update(name: &str, graph: &Graph) -> String {
    format!(
        "DROP SILENT GRAPH <{name}> ;\nINSERT DATA {{ GRAPH <{name}> {{\n{}}} }}",
        graph.to_ntriples()
    )
}

fn drop_graph_update(name: &str) -> String {
    format!("DROP SILENT GRAPH <{name}>")
}

/// SPARQL JSON results document (the parts this backend reads).
#[derive(Debug, Deserialize)]
struct SelectResults {
    results: SelectBindings,
}

#[derive(Debug, Deserialize)]
struct SelectBindings {
    bindings: Vec<HashMap<String, BoundTerm>>,
}

/// One bound RDF term in a results row.
#[derive(Debug, Deserialize)]
struct BoundTerm {
    #[serde(rename = "type")]
    kind: String,
    value: String,
    #[serde(default)]
    datatype: Option<String>,
}

fn binding_to_triple(binding: &HashMap<String, BoundTerm>) -> Result<Triple> {
    let subject = required_term(binding, "s")?;
    let predicate = required_term(binding, "p")?;
    let object = required_term(binding, "o")?;
    Ok(Triple {
        subject: term_to_iri(subject),
        predicate: term_to_iri(predicate),
        object: term_to_object(object),
    })
}

fn required_term<'b>(
    binding: &'b HashMap<String, BoundTerm>,
    variable: &str,
) -> Result<&'b BoundTerm> {
    binding.get(variable).ok_or_else(|| {
        Error::store(
            "decode_results",
            format!("binding is missing variable '{variable}'"),
        )
    })
}

/// Blank node labels are kept as `_:label` pseudo-IRIs so round-tripped
/// graphs stay self-consistent even though the model has no bnode term.
fn term_to_iri(term: &BoundTerm) -> Iri {
    if term.kind == "bnode" {
        Iri::new(format!("_:{}", term.value))
    } else {
        Iri::new(term.value.clone())
    }
}

fn term_to_object(term: &BoundTerm) -> Object {
    // "typed-literal" is the legacy spelling some endpoints still emit.
    if term.kind == "literal" || term.kind == "typed-literal" {
        Object::Literal(match &term.datatype {
            Some(datatype) => Literal::typed(term.value.clone(), datatype.clone()),
            None => Literal::new(term.value.clone()),
        })
    } else {
        Object::Resource(term_to_iri(term))
    }
}

fn decode_count(results: &SelectResults) -> usize {
    results
        .results
        .bindings
        .first()
        .and_then(|binding| binding.get("n"))
        .and_then(|term| term.value.parse().ok())
        .unwrap_or(0)
}
