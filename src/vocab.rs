//! Fixed vocabulary: well-known RDF IRIs plus the crate's own namespace.
//!
//! All constants are full IRIs. The crate namespace is versioned; bumping
//! [`NS`] is a data migration, not a refactor, so built-in class and
//! predicate IRIs are spelled out rather than concatenated at runtime.

/// The crate namespace all built-in classes and predicates live under.
pub const NS: &str = "https://tripod.dev/ns/1.0/";

/// RDF core vocabulary.
pub mod rdf {
    /// `rdf:type`.
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
}

/// RDF Schema vocabulary.
pub mod rdfs {
    /// `rdfs:label`.
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
}

/// XML Schema datatypes used by typed literals.
pub mod xsd {
    /// `xsd:string`.
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    /// `xsd:integer`.
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    /// `xsd:double`.
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    /// `xsd:boolean`.
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
}

/// Built-in entity classes.
pub mod class {
    /// The singleton workspace root.
    pub const ROOT: &str = "https://tripod.dev/ns/1.0/Root";
    /// A project grouping pools and buckets.
    pub const PROJECT: &str = "https://tripod.dev/ns/1.0/Project";
    /// A pool of model resources inside a project.
    pub const POOL: &str = "https://tripod.dev/ns/1.0/Pool";
    /// A bucket of data resources inside a project.
    pub const BUCKET: &str = "https://tripod.dev/ns/1.0/Bucket";
}

/// Built-in relation predicates.
pub mod predicate {
    /// Root → Project membership.
    pub const HAS_PROJECT: &str = "https://tripod.dev/ns/1.0/hasProject";
    /// Project → Pool membership.
    pub const HAS_POOL: &str = "https://tripod.dev/ns/1.0/hasPool";
    /// Project → Bucket membership.
    pub const HAS_BUCKET: &str = "https://tripod.dev/ns/1.0/hasBucket";
    /// Bucket → Pool provenance: the pool the bucket's contents came from.
    pub const SOURCE_POOL: &str = "https://tripod.dev/ns/1.0/sourcePool";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_iris_live_under_the_namespace() {
        for iri in [
            class::ROOT,
            class::PROJECT,
            class::POOL,
            class::BUCKET,
            predicate::HAS_PROJECT,
            predicate::HAS_POOL,
            predicate::HAS_BUCKET,
            predicate::SOURCE_POOL,
        ] {
            assert!(iri.starts_with(NS), "{iri} escapes the crate namespace");
        }
    }

    #[test]
    fn test_well_known_iris_are_absolute() {
        for iri in [rdf::TYPE, rdfs::LABEL, xsd::STRING, xsd::INTEGER, xsd::DOUBLE, xsd::BOOLEAN] {
            assert!(iri.starts_with("http://www.w3.org/"));
        }
    }
}
