//! HTTP request builder and response interpreter for the Sesame protocol.
//!
//! # Design
//! `SesameClient` holds the connection state (base URL, selected
//! repository, charsets, credentials) and never touches the network. Each
//! operation is split into a `build_*` method that validates its inputs and
//! produces an `HttpRequest`, and a `parse_*` method that checks the status
//! code of the matching `HttpResponse`. Every validation error is raised by
//! `build_*`, so a rejected call never reaches the transport.
//!
//! Repository-scoped requests are built through `repository_url`, which
//! takes the target repository explicitly; repository creation addresses
//! `SYSTEM` directly instead of swapping the selected repository.

use percent_encoding::utf8_percent_encode;
use tracing::warn;

use crate::config::ClientConfig;
use crate::context::Context;
use crate::error::SesameError;
use crate::format::{InputFormat, QueryLanguage, ResultFormat, FORM, TEXT_PLAIN, UTF8};
use crate::http::{Credentials, HttpMethod, HttpRequest, HttpResponse, RequestBody, COMPONENT};
use crate::operation::Operation;
use crate::repository_config::RepositoryConfig;
use crate::validate::{require_argument, require_context, require_repository, require_result_format};

/// Repository holding the store's own configuration.
pub const SYSTEM_REPOSITORY: &str = "SYSTEM";

/// Options for `build_query`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    pub result_format: ResultFormat,
    pub language: QueryLanguage,
    pub infer: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            result_format: ResultFormat::SparqlXml,
            language: QueryLanguage::Sparql,
            infer: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SesameClient {
    base_url: String,
    repository: Option<String>,
    accept_charset: String,
    content_charset: String,
    credentials: Option<Credentials>,
}

impl SesameClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            repository: None,
            accept_charset: UTF8.to_string(),
            content_charset: UTF8.to_string(),
            credentials: None,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        let mut client = Self::new(&config.base_url);
        client.set_repository(config.repository.as_deref());
        client.set_accept_charset(&config.accept_charset);
        client.set_content_charset(&config.content_charset);
        client.credentials = config.credentials();
        client
    }

    pub fn with_repository(mut self, repository: &str) -> Self {
        self.set_repository(Some(repository));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn repository(&self) -> Option<&str> {
        self.repository.as_deref()
    }

    /// Select the repository used by every repository-scoped operation.
    /// `None` or an empty name clears the selection.
    pub fn set_repository(&mut self, repository: Option<&str>) {
        self.repository = repository.filter(|r| !r.is_empty()).map(str::to_string);
    }

    pub fn accept_charset(&self) -> &str {
        &self.accept_charset
    }

    pub fn set_accept_charset(&mut self, charset: &str) {
        self.accept_charset = charset.to_string();
    }

    pub fn content_charset(&self) -> &str {
        &self.content_charset
    }

    pub fn set_content_charset(&mut self, charset: &str) {
        self.content_charset = charset.to_string();
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = Some(credentials);
    }

    pub fn clear_credentials(&mut self) {
        self.credentials = None;
    }

    // -----------------------------------------------------------------------
    // Build
    // -----------------------------------------------------------------------

    pub fn build_list_repositories(&self) -> HttpRequest {
        let req = HttpRequest::new(HttpMethod::Get, format!("{}/repositories", self.base_url))
            .with_header("Accept", self.accept(ResultFormat::SparqlXml.mime()));
        self.finish(req)
    }

    pub fn build_query(&self, query: &str, options: &QueryOptions) -> Result<HttpRequest, SesameError> {
        let url = self.selected_repository_url()?;
        let format = require_result_format(options.result_format)?;
        let req = HttpRequest::new(HttpMethod::Post, url)
            .with_header("Accept", self.accept(format.mime()))
            .with_header("Content-Type", self.content_type(FORM))
            .with_body(RequestBody::Form(vec![
                ("query".to_string(), query.to_string()),
                ("queryLn".to_string(), options.language.to_string()),
                ("infer".to_string(), options.infer.to_string()),
            ]));
        Ok(self.finish(req))
    }

    /// A describe query, answered as RDF/XML.
    pub fn build_describe(&self, query: &str, language: QueryLanguage) -> Result<HttpRequest, SesameError> {
        let url = self.selected_repository_url()?;
        let req = HttpRequest::new(HttpMethod::Post, url)
            .with_header("Accept", self.accept(InputFormat::RdfXml.mime()))
            .with_header("Content-Type", self.content_type(FORM))
            .with_body(RequestBody::Form(vec![
                ("query".to_string(), query.to_string()),
                ("queryLn".to_string(), language.to_string()),
            ]));
        Ok(self.finish(req))
    }

    pub fn build_update(&self, update: &str) -> Result<HttpRequest, SesameError> {
        let url = format!("{}/statements", self.selected_repository_url()?);
        let req = HttpRequest::new(HttpMethod::Post, url)
            .with_header("Content-Type", self.content_type(FORM))
            .with_body(RequestBody::Form(vec![("update".to_string(), update.to_string())]));
        Ok(self.finish(req))
    }

    /// Add statements to `context` of the selected repository.
    pub fn build_append(
        &self,
        data: impl Into<Vec<u8>>,
        context: &Context,
        format: InputFormat,
    ) -> Result<HttpRequest, SesameError> {
        let repo = require_repository(self.repository())?;
        let context = require_context(context)?;
        Ok(self.statements_request(HttpMethod::Post, repo, data.into(), context, format))
    }

    /// Replace the statements of `context` in the selected repository.
    pub fn build_overwrite(
        &self,
        data: impl Into<Vec<u8>>,
        context: &Context,
        format: InputFormat,
    ) -> Result<HttpRequest, SesameError> {
        let repo = require_repository(self.repository())?;
        let context = require_context(context)?;
        Ok(self.statements_request(HttpMethod::Put, repo, data.into(), context, format))
    }

    pub fn build_get_namespace(&self, prefix: &str) -> Result<HttpRequest, SesameError> {
        let url = self.namespace_url(prefix)?;
        let req = HttpRequest::new(HttpMethod::Get, url).with_header("Accept", self.accept(TEXT_PLAIN));
        Ok(self.finish(req))
    }

    pub fn build_set_namespace(&self, prefix: &str, namespace: &str) -> Result<HttpRequest, SesameError> {
        let url = self.namespace_url(prefix)?;
        let namespace = require_argument("namespace", namespace)?;
        let req = HttpRequest::new(HttpMethod::Put, url)
            .with_header("Content-Type", self.content_type(TEXT_PLAIN))
            .with_body(RequestBody::Raw(namespace.as_bytes().to_vec()));
        Ok(self.finish(req))
    }

    pub fn build_delete_namespace(&self, prefix: &str) -> Result<HttpRequest, SesameError> {
        let url = self.namespace_url(prefix)?;
        Ok(self.finish(HttpRequest::new(HttpMethod::Delete, url)))
    }

    pub fn build_contexts(&self, result_format: ResultFormat) -> Result<HttpRequest, SesameError> {
        let url = format!("{}/contexts", self.selected_repository_url()?);
        let format = require_result_format(result_format)?;
        let req = HttpRequest::new(HttpMethod::Post, url).with_header("Accept", self.accept(format.mime()));
        Ok(self.finish(req))
    }

    /// Statement count of one context. `Context::Default` counts only
    /// statements without a context.
    pub fn build_size(&self, context: &Context) -> Result<HttpRequest, SesameError> {
        let base = self.selected_repository_url()?;
        let context = require_context(context)?;
        let url = format!("{base}/size?context={}", context.query_value());
        Ok(self.size_request(url))
    }

    /// Statement count across every context. Parsed with `parse_size`.
    pub fn build_size_all(&self) -> Result<HttpRequest, SesameError> {
        let url = format!("{}/size", self.selected_repository_url()?);
        Ok(self.size_request(url))
    }

    /// Remove every statement from every context.
    pub fn build_clear(&self) -> Result<HttpRequest, SesameError> {
        let url = format!("{}/statements", self.selected_repository_url()?);
        Ok(self.finish(HttpRequest::new(HttpMethod::Delete, url)))
    }

    pub fn build_clear_context(&self, context: &Context) -> Result<HttpRequest, SesameError> {
        let base = self.selected_repository_url()?;
        let context = require_context(context)?;
        let url = format!("{base}/statements?context={}", context.query_value());
        Ok(self.finish(HttpRequest::new(HttpMethod::Delete, url)))
    }

    /// Append the configuration document for `config` to the `SYSTEM`
    /// repository. The selected repository is neither required nor changed.
    pub fn build_create_repository(&self, config: &RepositoryConfig) -> HttpRequest {
        self.statements_request(
            HttpMethod::Post,
            SYSTEM_REPOSITORY,
            config.to_turtle().into_bytes(),
            &Context::Default,
            InputFormat::Turtle,
        )
    }

    /// Delete the selected repository.
    pub fn build_delete_repository(&self) -> Result<HttpRequest, SesameError> {
        let url = self.selected_repository_url()?;
        Ok(self.finish(HttpRequest::new(HttpMethod::Delete, url)))
    }

    // -----------------------------------------------------------------------
    // Parse
    // -----------------------------------------------------------------------

    /// SPARQL-results XML listing the repositories.
    pub fn parse_list_repositories(&self, response: HttpResponse) -> Result<Vec<u8>, SesameError> {
        parse_body(response, Operation::ListRepositories)
    }

    pub fn parse_query(&self, response: HttpResponse) -> Result<Vec<u8>, SesameError> {
        parse_body(response, Operation::Query)
    }

    /// RDF/XML description.
    pub fn parse_describe(&self, response: HttpResponse) -> Result<Vec<u8>, SesameError> {
        parse_body(response, Operation::Describe)
    }

    pub fn parse_update(&self, response: HttpResponse) -> Result<(), SesameError> {
        check_status(&response, Operation::Update)
    }

    pub fn parse_append(&self, response: HttpResponse) -> Result<(), SesameError> {
        check_status(&response, Operation::Append)
    }

    pub fn parse_overwrite(&self, response: HttpResponse) -> Result<(), SesameError> {
        check_status(&response, Operation::Overwrite)
    }

    /// The namespace URI bound to the requested prefix.
    pub fn parse_get_namespace(&self, response: HttpResponse) -> Result<String, SesameError> {
        let body = parse_body(response, Operation::GetNamespace)?;
        String::from_utf8(body).map_err(|e| SesameError::InvalidResponse {
            operation: Operation::GetNamespace,
            reason: e.to_string(),
        })
    }

    pub fn parse_set_namespace(&self, response: HttpResponse) -> Result<(), SesameError> {
        check_status(&response, Operation::SetNamespace)
    }

    pub fn parse_delete_namespace(&self, response: HttpResponse) -> Result<(), SesameError> {
        check_status(&response, Operation::DeleteNamespace)
    }

    pub fn parse_contexts(&self, response: HttpResponse) -> Result<Vec<u8>, SesameError> {
        parse_body(response, Operation::Contexts)
    }

    /// The body must be a decimal count, optionally surrounded by
    /// whitespace; anything else is `InvalidResponse`.
    pub fn parse_size(&self, response: HttpResponse) -> Result<u64, SesameError> {
        let body = parse_body(response, Operation::Size)?;
        let text = String::from_utf8_lossy(&body);
        text.trim().parse().map_err(|_| SesameError::InvalidResponse {
            operation: Operation::Size,
            reason: format!("expected a statement count, got {:?}", text.trim()),
        })
    }

    pub fn parse_clear(&self, response: HttpResponse) -> Result<(), SesameError> {
        check_status(&response, Operation::Clear)
    }

    pub fn parse_clear_context(&self, response: HttpResponse) -> Result<(), SesameError> {
        check_status(&response, Operation::ClearContext)
    }

    pub fn parse_create_repository(&self, response: HttpResponse) -> Result<(), SesameError> {
        check_status(&response, Operation::CreateRepository)
    }

    pub fn parse_delete_repository(&self, response: HttpResponse) -> Result<(), SesameError> {
        check_status(&response, Operation::DeleteRepository)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn accept(&self, mime: &str) -> String {
        format!("{mime}; charset={}", self.accept_charset)
    }

    fn content_type(&self, mime: &str) -> String {
        format!("{mime}; charset={}", self.content_charset)
    }

    fn repository_url(&self, repository: &str) -> String {
        format!(
            "{}/repositories/{}",
            self.base_url,
            utf8_percent_encode(repository, COMPONENT)
        )
    }

    fn selected_repository_url(&self) -> Result<String, SesameError> {
        let repo = require_repository(self.repository())?;
        Ok(self.repository_url(repo))
    }

    fn namespace_url(&self, prefix: &str) -> Result<String, SesameError> {
        let base = self.selected_repository_url()?;
        let prefix = require_argument("prefix", prefix)?;
        Ok(format!("{base}/namespaces/{}", utf8_percent_encode(prefix, COMPONENT)))
    }

    fn size_request(&self, url: String) -> HttpRequest {
        let req = HttpRequest::new(HttpMethod::Post, url).with_header("Accept", self.accept(TEXT_PLAIN));
        self.finish(req)
    }

    fn statements_request(
        &self,
        method: HttpMethod,
        repository: &str,
        data: Vec<u8>,
        context: &Context,
        format: InputFormat,
    ) -> HttpRequest {
        let url = format!(
            "{}/statements?context={}",
            self.repository_url(repository),
            context.query_value()
        );
        let req = HttpRequest::new(method, url)
            .with_header("Content-Type", self.content_type(format.mime()))
            .with_body(RequestBody::Raw(data));
        self.finish(req)
    }

    /// Attach basic auth when credentials are configured.
    fn finish(&self, mut req: HttpRequest) -> HttpRequest {
        if let Some(credentials) = &self.credentials {
            req.apply_credentials(credentials);
        }
        req
    }
}

/// Compare the status against the operation's expected success code.
pub(crate) fn check_status(response: &HttpResponse, operation: Operation) -> Result<(), SesameError> {
    if response.status == operation.expected_status() {
        return Ok(());
    }
    warn!(%operation, status = response.status, "unexpected HTTP status");
    Err(SesameError::Remote {
        operation,
        status: response.status,
        body: response.body_text(),
    })
}

pub(crate) fn parse_body(response: HttpResponse, operation: Operation) -> Result<Vec<u8>, SesameError> {
    check_status(&response, operation)?;
    Ok(response.body)
}
