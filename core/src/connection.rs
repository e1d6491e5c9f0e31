//! One call per operation: build, send, parse.
//!
//! `Connection` pairs a `SesameClient` with a `Transport`. Validation
//! happens in the builder, so a rejected call returns before `send` is
//! reached. Multi-step operations (`erase_repository`, `*_file` on a URL)
//! are sequential and not atomic.

use std::fs;

use tracing::debug;

use crate::client::{QueryOptions, SesameClient};
use crate::context::Context;
use crate::error::SesameError;
use crate::format::{InputFormat, QueryLanguage, ResultFormat};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::operation::Operation;
use crate::repository_config::RepositoryConfig;
use crate::transport::Transport;
use crate::validate::{require_argument, require_context, require_repository};

#[derive(Debug, Clone)]
pub struct Connection<T> {
    client: SesameClient,
    transport: T,
}

impl<T: Transport> Connection<T> {
    pub fn new(client: SesameClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &SesameClient {
        &self.client
    }

    /// Mutable access to repository selection, charsets and credentials.
    pub fn client_mut(&mut self) -> &mut SesameClient {
        &mut self.client
    }

    pub fn into_parts(self) -> (SesameClient, T) {
        (self.client, self.transport)
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, SesameError> {
        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.send(&request)?;
        debug!(status = response.status, bytes = response.body.len(), "received response");
        Ok(response)
    }

    pub fn list_repositories(&self) -> Result<Vec<u8>, SesameError> {
        let req = self.client.build_list_repositories();
        self.client.parse_list_repositories(self.send(req)?)
    }

    pub fn query(&self, query: &str, options: &QueryOptions) -> Result<Vec<u8>, SesameError> {
        let req = self.client.build_query(query, options)?;
        self.client.parse_query(self.send(req)?)
    }

    pub fn describe(&self, query: &str, language: QueryLanguage) -> Result<Vec<u8>, SesameError> {
        let req = self.client.build_describe(query, language)?;
        self.client.parse_describe(self.send(req)?)
    }

    pub fn update(&self, update: &str) -> Result<(), SesameError> {
        let req = self.client.build_update(update)?;
        self.client.parse_update(self.send(req)?)
    }

    pub fn append(&self, data: impl Into<Vec<u8>>, context: &Context, format: InputFormat) -> Result<(), SesameError> {
        let req = self.client.build_append(data, context, format)?;
        self.client.parse_append(self.send(req)?)
    }

    /// Append the contents of a local file or an `http(s)://` URL.
    pub fn append_file(&self, path: &str, context: &Context, format: InputFormat) -> Result<(), SesameError> {
        self.require_statement_target(context)?;
        let data = self.load_source(path)?;
        self.append(data, context, format)
    }

    pub fn overwrite(&self, data: impl Into<Vec<u8>>, context: &Context, format: InputFormat) -> Result<(), SesameError> {
        let req = self.client.build_overwrite(data, context, format)?;
        self.client.parse_overwrite(self.send(req)?)
    }

    pub fn overwrite_file(&self, path: &str, context: &Context, format: InputFormat) -> Result<(), SesameError> {
        self.require_statement_target(context)?;
        let data = self.load_source(path)?;
        self.overwrite(data, context, format)
    }

    pub fn get_namespace(&self, prefix: &str) -> Result<String, SesameError> {
        let req = self.client.build_get_namespace(prefix)?;
        self.client.parse_get_namespace(self.send(req)?)
    }

    pub fn set_namespace(&self, prefix: &str, namespace: &str) -> Result<(), SesameError> {
        let req = self.client.build_set_namespace(prefix, namespace)?;
        self.client.parse_set_namespace(self.send(req)?)
    }

    pub fn delete_namespace(&self, prefix: &str) -> Result<(), SesameError> {
        let req = self.client.build_delete_namespace(prefix)?;
        self.client.parse_delete_namespace(self.send(req)?)
    }

    pub fn contexts(&self, result_format: ResultFormat) -> Result<Vec<u8>, SesameError> {
        let req = self.client.build_contexts(result_format)?;
        self.client.parse_contexts(self.send(req)?)
    }

    /// Statement count of `context`; pass `&Context::default()` for the
    /// default graph.
    pub fn size(&self, context: &Context) -> Result<u64, SesameError> {
        let req = self.client.build_size(context)?;
        self.client.parse_size(self.send(req)?)
    }

    /// Statement count across every context.
    pub fn size_all(&self) -> Result<u64, SesameError> {
        let req = self.client.build_size_all()?;
        self.client.parse_size(self.send(req)?)
    }

    pub fn clear(&self) -> Result<(), SesameError> {
        let req = self.client.build_clear()?;
        self.client.parse_clear(self.send(req)?)
    }

    pub fn clear_context(&self, context: &Context) -> Result<(), SesameError> {
        let req = self.client.build_clear_context(context)?;
        self.client.parse_clear_context(self.send(req)?)
    }

    pub fn create_repository(&self, config: &RepositoryConfig) -> Result<(), SesameError> {
        let req = self.client.build_create_repository(config);
        self.client.parse_create_repository(self.send(req)?)
    }

    pub fn delete_repository(&self) -> Result<(), SesameError> {
        let req = self.client.build_delete_repository()?;
        self.client.parse_delete_repository(self.send(req)?)
    }

    /// Clear the selected repository, then delete it. If the delete fails
    /// the repository stays behind, empty.
    pub fn erase_repository(&self) -> Result<(), SesameError> {
        self.clear()?;
        self.delete_repository()
    }

    /// Checked before a file source is read.
    fn require_statement_target(&self, context: &Context) -> Result<(), SesameError> {
        require_repository(self.client.repository())?;
        require_context(context)?;
        Ok(())
    }

    fn load_source(&self, path: &str) -> Result<Vec<u8>, SesameError> {
        let path = require_argument("filepath", path)?;
        if path.starts_with("http://") || path.starts_with("https://") {
            let response = self.send(HttpRequest::new(HttpMethod::Get, path))?;
            crate::client::parse_body(response, Operation::FetchSource)
        } else {
            fs::read(path).map_err(|source| SesameError::Io {
                path: path.to_string(),
                source,
            })
        }
    }
}
