//! Guards that run before a request is built.
//!
//! Each returns the validated value so builders can use it directly. A
//! failure here means no request was produced and nothing was sent.

use crate::context::Context;
use crate::error::SesameError;
use crate::format::{InputFormat, QueryLanguage, ResultFormat};

pub use crate::context::normalize_context;

/// The selected repository, or `Configuration` when none is set.
pub fn require_repository(repository: Option<&str>) -> Result<&str, SesameError> {
    match repository {
        Some(repo) if !repo.is_empty() => Ok(repo),
        _ => Err(SesameError::Configuration(
            "No repository has been selected.".to_string(),
        )),
    }
}

/// A named context must carry a URI between its brackets.
pub fn require_context(context: &Context) -> Result<&Context, SesameError> {
    match context {
        Context::Named(uri) => {
            let inner = uri.strip_prefix('<').and_then(|u| u.strip_suffix('>')).unwrap_or(uri);
            if inner.is_empty() {
                Err(SesameError::InvalidArgument("empty context".to_string()))
            } else {
                Ok(context)
            }
        }
        Context::Default => Ok(context),
    }
}

pub fn require_query_language(language: &str) -> Result<QueryLanguage, SesameError> {
    language.parse()
}

/// Accepts only formats that have response handling.
pub fn require_result_format(format: ResultFormat) -> Result<ResultFormat, SesameError> {
    if format.is_implemented() {
        Ok(format)
    } else {
        Err(SesameError::UnsupportedFormat(format!(
            "{} has no result handler",
            format.mime()
        )))
    }
}

pub fn require_input_format(mime: &str) -> Result<InputFormat, SesameError> {
    InputFormat::from_mime(mime)
}

/// A required string argument such as a prefix or a file path.
pub fn require_argument<'a>(name: &str, value: &'a str) -> Result<&'a str, SesameError> {
    if value.is_empty() {
        Err(SesameError::Configuration(format!("Please supply a {name}.")))
    } else {
        Ok(value)
    }
}
