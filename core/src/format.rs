//! MIME types, query languages and storage kinds.
//!
//! # Design
//! Result formats and input formats are two closed enumerations. Only
//! `ResultFormat::SparqlXml` has response handling downstream; the other
//! result formats are recognized so they can be named, but validation
//! rejects them through `ResultFormat::is_implemented`.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::SesameError;

pub const FORM: &str = "application/x-www-form-urlencoded";
pub const TEXT_PLAIN: &str = "text/plain";
pub const UTF8: &str = "UTF-8";

/// Response formats for query and listing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultFormat {
    #[default]
    SparqlXml,
    SparqlJson,
    BinaryTable,
    Boolean,
}

impl ResultFormat {
    pub const ALL: [ResultFormat; 4] = [
        ResultFormat::SparqlXml,
        ResultFormat::SparqlJson,
        ResultFormat::BinaryTable,
        ResultFormat::Boolean,
    ];

    pub fn mime(self) -> &'static str {
        match self {
            ResultFormat::SparqlXml => "application/sparql-results+xml",
            ResultFormat::SparqlJson => "application/sparql-results+json",
            ResultFormat::BinaryTable => "application/x-binary-rdf-results-table",
            ResultFormat::Boolean => "text/boolean",
        }
    }

    /// Whether responses in this format can be consumed.
    pub fn is_implemented(self) -> bool {
        matches!(self, ResultFormat::SparqlXml)
    }

    pub fn from_mime(mime: &str) -> Result<Self, SesameError> {
        Self::ALL
            .into_iter()
            .find(|f| f.mime() == mime)
            .ok_or_else(|| SesameError::UnsupportedFormat(format!("unknown result format {mime}")))
    }
}

impl fmt::Display for ResultFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// Serialization formats accepted for statement bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    #[default]
    RdfXml,
    NTriples,
    Turtle,
    N3,
    TriX,
    TriG,
}

impl InputFormat {
    pub const ALL: [InputFormat; 6] = [
        InputFormat::RdfXml,
        InputFormat::NTriples,
        InputFormat::Turtle,
        InputFormat::N3,
        InputFormat::TriX,
        InputFormat::TriG,
    ];

    pub fn mime(self) -> &'static str {
        match self {
            InputFormat::RdfXml => "application/rdf+xml",
            InputFormat::NTriples => "text/plain",
            InputFormat::Turtle => "application/x-turtle",
            InputFormat::N3 => "text/rdf+n3",
            InputFormat::TriX => "application/trix",
            InputFormat::TriG => "application/x-trig",
        }
    }

    pub fn from_mime(mime: &str) -> Result<Self, SesameError> {
        Self::ALL
            .into_iter()
            .find(|f| f.mime() == mime)
            .ok_or_else(|| SesameError::InvalidArgument(format!("unsupported input format {mime}")))
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryLanguage {
    #[default]
    Sparql,
    Serql,
}

impl QueryLanguage {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryLanguage::Sparql => "sparql",
            QueryLanguage::Serql => "serql",
        }
    }
}

/// Exact, case-sensitive match on `sparql` or `serql`.
impl FromStr for QueryLanguage {
    type Err = SesameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sparql" => Ok(QueryLanguage::Sparql),
            "serql" => Ok(QueryLanguage::Serql),
            other => Err(SesameError::InvalidArgument(format!(
                "unsupported query language {other:?}, SPARQL or SeRQL supported"
            ))),
        }
    }
}

impl fmt::Display for QueryLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend for a newly created repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Memory,
    Native,
}

impl FromStr for StorageKind {
    type Err = SesameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory" => Ok(StorageKind::Memory),
            "native" => Ok(StorageKind::Native),
            other => Err(SesameError::InvalidArgument(format!("unknown storage kind {other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_sparql_xml_is_implemented() {
        let implemented: Vec<_> = ResultFormat::ALL.into_iter().filter(|f| f.is_implemented()).collect();
        assert_eq!(implemented, vec![ResultFormat::SparqlXml]);
    }

    #[test]
    fn result_format_from_mime() {
        assert_eq!(
            ResultFormat::from_mime("application/sparql-results+json").unwrap(),
            ResultFormat::SparqlJson
        );
        let err = ResultFormat::from_mime("application/json").unwrap_err();
        assert!(matches!(err, SesameError::UnsupportedFormat(_)));
    }

    #[test]
    fn input_format_from_mime_covers_all_six() {
        for mime in [
            "application/rdf+xml",
            "text/plain",
            "application/x-turtle",
            "text/rdf+n3",
            "application/trix",
            "application/x-trig",
        ] {
            assert_eq!(InputFormat::from_mime(mime).unwrap().mime(), mime);
        }
        let err = InputFormat::from_mime("application/ld+json").unwrap_err();
        assert!(matches!(err, SesameError::InvalidArgument(_)));
    }

    #[test]
    fn query_language_is_case_sensitive() {
        assert_eq!("sparql".parse::<QueryLanguage>().unwrap(), QueryLanguage::Sparql);
        assert_eq!("serql".parse::<QueryLanguage>().unwrap(), QueryLanguage::Serql);
        for bad in ["SPARQL", "Sparql", "sql", "", " sparql"] {
            let err = bad.parse::<QueryLanguage>().unwrap_err();
            assert!(matches!(err, SesameError::InvalidArgument(_)), "{bad:?}");
        }
    }

    #[test]
    fn storage_kind_parses() {
        assert_eq!("native".parse::<StorageKind>().unwrap(), StorageKind::Native);
        assert!("disk".parse::<StorageKind>().is_err());
    }
}
