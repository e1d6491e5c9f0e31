//! Error types for the Sesame client.
//!
//! # Design
//! Precondition failures (`Configuration`, `InvalidArgument`,
//! `UnsupportedFormat`) are raised by the builders before a request exists,
//! so they never have side effects. `Remote` carries the operation and the
//! status that did not match its expected success code; `Transport` wraps
//! whatever the transport reported. Nothing here is retried.

use std::io;

use thiserror::Error;

use crate::operation::Operation;

#[derive(Debug, Error)]
pub enum SesameError {
    /// Missing client state or required argument (no repository selected,
    /// empty prefix, empty file path).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Unsupported query language or input format, or a malformed context.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A result format that is recognized but has no response handling.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The server answered with a status other than the operation's
    /// success code.
    #[error("{operation} failed, HTTP response error: {status}")]
    Remote {
        operation: Operation,
        status: u16,
        body: String,
    },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// A success response whose body could not be interpreted.
    #[error("{operation} returned an unreadable body: {reason}")]
    InvalidResponse { operation: Operation, reason: String },

    /// A local data file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl SesameError {
    /// HTTP status carried by a `Remote` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            SesameError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type SesameResult<T> = Result<T, SesameError>;
