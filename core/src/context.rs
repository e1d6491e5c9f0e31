//! Named-graph identifiers for statement operations.
//!
//! A context is either the default graph (the literal token `null` on the
//! wire) or an RDF URI written in angle brackets. Bare URIs are wrapped on
//! construction and percent-encoded only when rendered into a query string.

use percent_encoding::utf8_percent_encode;

use crate::error::SesameError;
use crate::http::COMPONENT;
use crate::validate::require_context;

const NULL: &str = "null";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Context {
    #[default]
    Default,
    /// Always delimited by `<` and `>`.
    Named(String),
}

impl Context {
    /// Build a named context, wrapping `uri` in `<...>` unless it is
    /// already delimited.
    pub fn named(uri: &str) -> Self {
        if is_delimited(uri) {
            Context::Named(uri.to_string())
        } else {
            Context::Named(format!("<{uri}>"))
        }
    }

    /// `null` selects the default graph, anything else names a graph.
    pub fn parse(token: &str) -> Self {
        if token == NULL {
            Context::Default
        } else {
            Context::named(token)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Context::Default => NULL,
            Context::Named(uri) => uri,
        }
    }

    /// Value for the `context` query parameter.
    pub fn query_value(&self) -> String {
        match self {
            Context::Default => NULL.to_string(),
            Context::Named(uri) => utf8_percent_encode(uri, COMPONENT).to_string(),
        }
    }
}

fn is_delimited(uri: &str) -> bool {
    uri.len() >= 2 && uri.starts_with('<') && uri.ends_with('>')
}

/// String-level normalization for callers holding a raw context token.
///
/// Returns `null` unchanged, otherwise the wrapped and percent-encoded URI.
/// A token that is already in normalized form (`%3C...%3E`) is returned as
/// is; an absolute URI cannot begin with `%`, so that form is unambiguous.
pub fn normalize_context(context: &str) -> Result<String, SesameError> {
    if context == NULL {
        return Ok(NULL.to_string());
    }
    if context.len() >= 6 && context.starts_with("%3C") && context.ends_with("%3E") {
        if context.len() == 6 {
            return Err(SesameError::InvalidArgument("empty context".to_string()));
        }
        return Ok(context.to_string());
    }
    let context = Context::named(context);
    Ok(require_context(&context)?.query_value())
}
