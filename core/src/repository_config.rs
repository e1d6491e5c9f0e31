//! Turtle configuration document used to create a repository.
//!
//! The document is appended to the store's `SYSTEM` repository; the store
//! reads `rep:repositoryID` and the nested `sr:sailImpl` block to
//! instantiate the backend.

use std::fmt;

use crate::error::SesameError;
use crate::format::StorageKind;

const PREFIXES: &str = "\
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#>.
@prefix rep: <http://www.openrdf.org/config/repository#>.
@prefix sr: <http://www.openrdf.org/config/repository/sail#>.
@prefix sail: <http://www.openrdf.org/config/sail#>.
@prefix ms: <http://www.openrdf.org/config/sail/memory#>.
@prefix ns: <http://www.openrdf.org/config/sail/native#>.
";

/// Triple indexes configured for native stores.
pub const NATIVE_TRIPLE_INDEXES: &str = "spoc,posc";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    pub id: String,
    pub title: String,
    pub storage: StorageKind,
}

impl RepositoryConfig {
    pub fn new(id: impl Into<String>, title: impl Into<String>, storage: StorageKind) -> Result<Self, SesameError> {
        let id = id.into();
        if id.is_empty() {
            return Err(SesameError::Configuration(
                "Please supply a repository name.".to_string(),
            ));
        }
        Ok(Self {
            id,
            title: title.into(),
            storage,
        })
    }

    pub fn to_turtle(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RepositoryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(PREFIXES)?;
        writeln!(f)?;
        writeln!(f, "[] a rep:Repository ;")?;
        writeln!(f, "   rep:repositoryID {} ;", Literal(&self.id))?;
        writeln!(f, "   rdfs:label {} ;", Literal(&self.title))?;
        writeln!(f, "   rep:repositoryImpl [")?;
        writeln!(f, "      rep:repositoryType \"openrdf:SailRepository\" ;")?;
        writeln!(f, "      sr:sailImpl [")?;
        match self.storage {
            StorageKind::Memory => {
                writeln!(f, "         sail:sailType \"openrdf:MemoryStore\" ;")?;
                writeln!(f, "         ms:persist \"true\"")?;
            }
            StorageKind::Native => {
                writeln!(f, "         sail:sailType \"openrdf:NativeStore\" ;")?;
                writeln!(f, "         ns:tripleIndexes \"{NATIVE_TRIPLE_INDEXES}\"")?;
            }
        }
        writeln!(f, "      ]")?;
        writeln!(f, "   ].")
    }
}

/// A quoted Turtle string literal.
struct Literal<'a>(&'a str);

impl fmt::Display for Literal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        for c in self.0.chars() {
            match c {
                '\\' => f.write_str("\\\\")?,
                '"' => f.write_str("\\\"")?,
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                '\t' => f.write_str("\\t")?,
                c => write!(f, "{c}")?,
            }
        }
        f.write_str("\"")
    }
}
