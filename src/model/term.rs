//! Term types: IRIs, literals, and the object position of a triple.

use serde::{Deserialize, Serialize};

use crate::vocab;

/// An absolute IRI.
///
/// Stored as its plain string form (no angle brackets). The crate treats IRIs
/// as opaque identifiers: it never resolves, normalizes, or dereferences
/// them, it only compares and concatenates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iri(String);

impl Iri {
    /// Creates an IRI from its string form.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the IRI as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the IRI, returning the underlying string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns `true` when the IRI is the empty string.
    ///
    /// Empty ids are rejected by repository preconditions before any store
    /// access happens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Mints a fresh IRI under `base` using a random UUID.
    ///
    /// A `/` separator is inserted unless `base` already ends with `/` or
    /// `#`, so minted ids always share their class IRI as a prefix:
    ///
    /// ```
    /// use tripod::Iri;
    ///
    /// let base = Iri::new("https://example.org/ns/House");
    /// let id = Iri::mint(&base);
    /// assert!(id.as_str().starts_with("https://example.org/ns/House/"));
    /// ```
    #[must_use]
    pub fn mint(base: &Self) -> Self {
        let uuid = uuid::Uuid::new_v4();
        if base.0.ends_with('/') || base.0.ends_with('#') {
            Self(format!("{}{uuid}", base.0))
        } else {
            Self(format!("{}/{uuid}", base.0))
        }
    }
}

impl std::fmt::Display for Iri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Iri {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Iri {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&String> for Iri {
    fn from(value: &String) -> Self {
        Self(value.clone())
    }
}

/// An RDF literal: a lexical form plus an optional datatype IRI.
///
/// Plain strings carry no datatype (RDF 1.1 treats them as `xsd:string`
/// anyway); typed values carry the XSD datatype their [`IntoLiteral`]
/// conversion assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    lexical: String,
    datatype: Option<Iri>,
}

impl Literal {
    /// Creates a plain (untyped) literal.
    pub fn new(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
        }
    }

    /// Creates a literal with an explicit datatype IRI.
    pub fn typed(lexical: impl Into<String>, datatype: impl Into<Iri>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: Some(datatype.into()),
        }
    }

    /// The lexical form.
    #[must_use]
    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    /// The datatype IRI, if the literal is typed.
    #[must_use]
    pub const fn datatype(&self) -> Option<&Iri> {
        self.datatype.as_ref()
    }
}

/// The object position of a triple: a resource reference or a literal value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Object {
    /// A reference to another resource.
    Resource(Iri),
    /// A literal value.
    Literal(Literal),
}

impl Object {
    /// Returns the IRI when the object is a resource reference.
    #[must_use]
    pub const fn as_resource(&self) -> Option<&Iri> {
        match self {
            Self::Resource(iri) => Some(iri),
            Self::Literal(_) => None,
        }
    }

    /// Returns the literal when the object is one.
    #[must_use]
    pub const fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(lit) => Some(lit),
            Self::Resource(_) => None,
        }
    }
}

impl From<Iri> for Object {
    fn from(value: Iri) -> Self {
        Self::Resource(value)
    }
}

impl From<Literal> for Object {
    fn from(value: Literal) -> Self {
        Self::Literal(value)
    }
}

/// Conversion of a Rust value into an RDF literal.
///
/// Implemented for the primitive types the mapping DSL accepts in literal
/// field rules. Strings become plain literals; numeric and boolean values
/// carry their XSD datatype.
pub trait IntoLiteral {
    /// Converts the value into a literal.
    fn into_literal(self) -> Literal;
}

impl IntoLiteral for Literal {
    fn into_literal(self) -> Literal {
        self
    }
}

impl IntoLiteral for String {
    fn into_literal(self) -> Literal {
        Literal::new(self)
    }
}

impl IntoLiteral for &str {
    fn into_literal(self) -> Literal {
        Literal::new(self)
    }
}

macro_rules! impl_into_literal_via_display {
    ($($ty:ty => $datatype:expr),+ $(,)?) => {
        $(impl IntoLiteral for $ty {
            fn into_literal(self) -> Literal {
                Literal::typed(self.to_string(), $datatype)
            }
        })+
    };
}

impl_into_literal_via_display! {
    i32 => vocab::xsd::INTEGER,
    i64 => vocab::xsd::INTEGER,
    u32 => vocab::xsd::INTEGER,
    u64 => vocab::xsd::INTEGER,
    f64 => vocab::xsd::DOUBLE,
    bool => vocab::xsd::BOOLEAN,
}

/// Conversion of an RDF literal back into a Rust value.
///
/// Conversions go by lexical form and ignore the stored datatype, which keeps
/// reads working against endpoints that normalize or strip datatypes. A
/// failed conversion surfaces as a type-mismatch error naming the declared
/// type.
pub trait FromLiteral: Sized {
    /// Attempts the conversion; `None` when the lexical form does not parse.
    fn from_literal(literal: &Literal) -> Option<Self>;
}

impl FromLiteral for String {
    fn from_literal(literal: &Literal) -> Option<Self> {
        Some(literal.lexical().to_string())
    }
}

impl FromLiteral for bool {
    fn from_literal(literal: &Literal) -> Option<Self> {
        // xsd:boolean admits 1/0 as well as true/false.
        match literal.lexical() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }
}

macro_rules! impl_from_literal_via_parse {
    ($($ty:ty),+ $(,)?) => {
        $(impl FromLiteral for $ty {
            fn from_literal(literal: &Literal) -> Option<Self> {
                literal.lexical().parse().ok()
            }
        })+
    };
}

impl_from_literal_via_parse!(i32, i64, u32, u64, f64);
