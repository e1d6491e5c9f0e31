//! Client core for the Sesame RDF store HTTP protocol.
//!
//! # Overview
//! Turns repository management, query, update and statement operations into
//! `HttpRequest` values and interprets the matching `HttpResponse` status
//! codes. The core does not parse result payloads; query and listing
//! operations hand back the raw body.
//!
//! # Design
//! - `SesameClient` builds and parses without touching the network
//!   (host-does-IO), so the FFI crate can expose the same surface to C.
//! - `Connection` pairs a client with a `Transport` for one-call-per-operation
//!   use; `UreqTransport` (feature `ureq`) is the bundled blocking transport.
//! - Validation runs inside every `build_*`, so invalid input never reaches
//!   the transport.
//! - The client is not synchronized. Share it behind a lock or keep one per
//!   session.

pub mod client;
pub mod config;
pub mod connection;
pub mod context;
pub mod error;
pub mod format;
pub mod http;
pub mod operation;
pub mod repository_config;
pub mod transport;
pub mod validate;

pub use client::{QueryOptions, SesameClient, SYSTEM_REPOSITORY};
pub use config::ClientConfig;
pub use connection::Connection;
pub use context::{normalize_context, Context};
pub use error::{SesameError, SesameResult};
pub use format::{InputFormat, QueryLanguage, ResultFormat, StorageKind};
pub use http::{Credentials, HttpMethod, HttpRequest, HttpResponse, RequestBody};
pub use operation::Operation;
pub use repository_config::RepositoryConfig;
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
