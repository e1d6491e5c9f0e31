//! In-memory stand-in for a Sesame server.
//!
//! Speaks the subset of the Sesame HTTP protocol the client uses. Payloads
//! are not parsed as RDF: every non-blank line that is not a comment or a
//! directive counts as one statement, queries answer with every stored
//! statement as a literal binding, and the only update understood is
//! `CLEAR ALL`. Appending a repository configuration document to `SYSTEM`
//! creates the repository named by its `rep:repositoryID`.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use axum::{
    extract::{FromRequest, Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

pub const SYSTEM: &str = "SYSTEM";

const SPARQL_XML: &str = "application/sparql-results+xml";
const RDF_XML: &str = "application/rdf+xml";
const TEXT_PLAIN: &str = "text/plain";
const FORM: &str = "application/x-www-form-urlencoded";
const INPUT_FORMATS: [&str; 6] = [
    "application/rdf+xml",
    "text/plain",
    "application/x-turtle",
    "text/rdf+n3",
    "application/trix",
    "application/x-trig",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// `None` is the default graph; named contexts keep their `<...>`.
    pub context: Option<String>,
    pub line: String,
}

#[derive(Debug, Clone, Default)]
pub struct Repository {
    pub title: String,
    pub namespaces: BTreeMap<String, String>,
    pub statements: Vec<Statement>,
}

#[derive(Debug)]
pub struct Store {
    pub repositories: BTreeMap<String, Repository>,
}

impl Default for Store {
    fn default() -> Self {
        let mut repositories = BTreeMap::new();
        repositories.insert(
            SYSTEM.to_string(),
            Repository {
                title: "System configuration repository".to_string(),
                ..Repository::default()
            },
        );
        Self { repositories }
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// When set, every request must carry matching basic-auth credentials.
    pub credentials: Option<(String, String)>,
}

#[derive(Clone)]
struct AppState {
    db: Db,
    credentials: Option<(String, String)>,
}

pub fn app() -> Router {
    app_with_config(AppConfig::default())
}

pub fn app_with_config(config: AppConfig) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Store::default())),
        credentials: config.credentials,
    };
    Router::new()
        .route("/repositories", get(list_repositories))
        .route("/repositories/{repo}", post(query).delete(delete_repository))
        .route(
            "/repositories/{repo}/statements",
            post(add_statements).put(replace_statements).delete(remove_statements),
        )
        .route(
            "/repositories/{repo}/namespaces/{prefix}",
            get(get_namespace).put(set_namespace).delete(delete_namespace),
        )
        .route("/repositories/{repo}/contexts", post(list_contexts))
        .route("/repositories/{repo}/size", post(size))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_config(listener: TcpListener, config: AppConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_config(config)).await
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

async fn require_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(expected) = &state.credentials else {
        return next.run(request).await;
    };
    let supplied = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Basic "))
        .and_then(decode_basic_auth);
    match supplied {
        Some(creds) if &creds == expected => next.run(request).await,
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}

fn decode_basic_auth(encoded: &str) -> Option<(String, String)> {
    let decoded = STANDARD.decode(encoded).ok()?;
    let credential = String::from_utf8(decoded).ok()?;
    let (user, password) = credential.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ContextParam {
    context: Option<String>,
}

impl ContextParam {
    /// `None`: every context. `Some(None)`: the default graph.
    fn filter(&self) -> Option<Option<String>> {
        self.context
            .as_ref()
            .map(|c| if c == "null" { None } else { Some(c.clone()) })
    }
}

#[derive(Deserialize)]
struct QueryForm {
    query: String,
    #[serde(rename = "queryLn", default = "default_language")]
    query_ln: String,
}

fn default_language() -> String {
    "sparql".to_string()
}

#[derive(Deserialize)]
struct UpdateForm {
    update: String,
}

async fn list_repositories(State(state): State<AppState>) -> Response {
    let store = state.db.read().await;
    let rows = store
        .repositories
        .iter()
        .map(|(id, repo)| {
            vec![
                ("id", Term::Literal(id.clone())),
                ("title", Term::Literal(repo.title.clone())),
            ]
        })
        .collect();
    xml_response(SPARQL_XML, sparql_results(&["id", "title"], rows))
}

async fn query(
    State(state): State<AppState>,
    Path(repo): Path<String>,
    headers: HeaderMap,
    Form(form): Form<QueryForm>,
) -> Response {
    if form.query_ln != "sparql" && form.query_ln != "serql" {
        return (StatusCode::BAD_REQUEST, "unsupported query language").into_response();
    }
    let store = state.db.read().await;
    let Some(repository) = store.repositories.get(&repo) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    debug!(%repo, query = %form.query, "query");
    if accepts(&headers, RDF_XML) {
        return xml_response(RDF_XML, rdf_description(repository));
    }
    let rows = repository
        .statements
        .iter()
        .map(|s| vec![("statement", Term::Literal(s.line.clone()))])
        .collect();
    xml_response(SPARQL_XML, sparql_results(&["statement"], rows))
}

async fn delete_repository(State(state): State<AppState>, Path(repo): Path<String>) -> StatusCode {
    if repo == SYSTEM {
        return StatusCode::FORBIDDEN;
    }
    let mut store = state.db.write().await;
    match store.repositories.remove(&repo) {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::NOT_FOUND,
    }
}

/// POST carries either a form-encoded update or statements to add.
async fn add_statements(
    State(state): State<AppState>,
    Path(repo): Path<String>,
    Query(param): Query<ContextParam>,
    request: Request,
) -> Response {
    let content_type = media_type(request.headers());
    if content_type == FORM {
        let Form(form) = match Form::<UpdateForm>::from_request(request, &()).await {
            Ok(form) => form,
            Err(rejection) => return rejection.into_response(),
        };
        return run_update(&state.db, &repo, &form.update).await.into_response();
    }
    if !INPUT_FORMATS.contains(&content_type.as_str()) {
        return StatusCode::UNSUPPORTED_MEDIA_TYPE.into_response();
    }
    let data = match String::from_request(request, &()).await {
        Ok(data) => data,
        Err(rejection) => return rejection.into_response(),
    };

    let mut store = state.db.write().await;
    if repo == SYSTEM {
        return match parse_repository_config(&data) {
            Some((id, title)) => {
                debug!(%id, "creating repository");
                store.repositories.entry(id).or_default().title = title;
                StatusCode::NO_CONTENT.into_response()
            }
            None => (StatusCode::BAD_REQUEST, "missing rep:repositoryID").into_response(),
        };
    }
    let Some(repository) = store.repositories.get_mut(&repo) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let context = param.filter().flatten();
    repository.statements.extend(statements(&data, context));
    StatusCode::NO_CONTENT.into_response()
}

async fn replace_statements(
    State(state): State<AppState>,
    Path(repo): Path<String>,
    Query(param): Query<ContextParam>,
    headers: HeaderMap,
    data: String,
) -> StatusCode {
    if !INPUT_FORMATS.contains(&media_type(&headers).as_str()) {
        return StatusCode::UNSUPPORTED_MEDIA_TYPE;
    }
    let mut store = state.db.write().await;
    let Some(repository) = store.repositories.get_mut(&repo) else {
        return StatusCode::NOT_FOUND;
    };
    let filter = param.filter();
    remove_matching(repository, &filter);
    repository.statements.extend(statements(&data, filter.flatten()));
    StatusCode::NO_CONTENT
}

async fn remove_statements(
    State(state): State<AppState>,
    Path(repo): Path<String>,
    Query(param): Query<ContextParam>,
) -> StatusCode {
    let mut store = state.db.write().await;
    let Some(repository) = store.repositories.get_mut(&repo) else {
        return StatusCode::NOT_FOUND;
    };
    remove_matching(repository, &param.filter());
    StatusCode::NO_CONTENT
}

async fn get_namespace(State(state): State<AppState>, Path((repo, prefix)): Path<(String, String)>) -> Response {
    let store = state.db.read().await;
    match store.repositories.get(&repo).and_then(|r| r.namespaces.get(&prefix)) {
        Some(ns) => ([(header::CONTENT_TYPE, TEXT_PLAIN)], ns.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn set_namespace(
    State(state): State<AppState>,
    Path((repo, prefix)): Path<(String, String)>,
    namespace: String,
) -> StatusCode {
    let mut store = state.db.write().await;
    let Some(repository) = store.repositories.get_mut(&repo) else {
        return StatusCode::NOT_FOUND;
    };
    let namespace = namespace.trim();
    if namespace.is_empty() {
        return StatusCode::BAD_REQUEST;
    }
    repository.namespaces.insert(prefix, namespace.to_string());
    StatusCode::NO_CONTENT
}

async fn delete_namespace(State(state): State<AppState>, Path((repo, prefix)): Path<(String, String)>) -> StatusCode {
    let mut store = state.db.write().await;
    let Some(repository) = store.repositories.get_mut(&repo) else {
        return StatusCode::NOT_FOUND;
    };
    repository.namespaces.remove(&prefix);
    StatusCode::NO_CONTENT
}

async fn list_contexts(State(state): State<AppState>, Path(repo): Path<String>) -> Response {
    let store = state.db.read().await;
    let Some(repository) = store.repositories.get(&repo) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let contexts: BTreeSet<&str> = repository
        .statements
        .iter()
        .filter_map(|s| s.context.as_deref())
        .collect();
    let rows = contexts
        .into_iter()
        .map(|c| vec![("contextID", Term::Uri(strip_brackets(c).to_string()))])
        .collect();
    xml_response(SPARQL_XML, sparql_results(&["contextID"], rows))
}

async fn size(
    State(state): State<AppState>,
    Path(repo): Path<String>,
    Query(param): Query<ContextParam>,
) -> Response {
    let store = state.db.read().await;
    let Some(repository) = store.repositories.get(&repo) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let filter = param.filter();
    let count = repository
        .statements
        .iter()
        .filter(|s| filter.as_ref().map_or(true, |c| &s.context == c))
        .count();
    ([(header::CONTENT_TYPE, TEXT_PLAIN)], count.to_string()).into_response()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn run_update(db: &Db, repo: &str, update: &str) -> StatusCode {
    let mut store = db.write().await;
    let Some(repository) = store.repositories.get_mut(repo) else {
        return StatusCode::NOT_FOUND;
    };
    if update.trim().eq_ignore_ascii_case("CLEAR ALL") {
        repository.statements.clear();
    }
    StatusCode::NO_CONTENT
}

fn remove_matching(repository: &mut Repository, filter: &Option<Option<String>>) {
    match filter {
        None => repository.statements.clear(),
        Some(context) => repository.statements.retain(|s| &s.context != context),
    }
}

fn statements(data: &str, context: Option<String>) -> Vec<Statement> {
    data.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with('@'))
        .map(|line| Statement {
            context: context.clone(),
            line: line.to_string(),
        })
        .collect()
}

/// Extract `rep:repositoryID` and `rdfs:label` from a configuration document.
pub fn parse_repository_config(turtle: &str) -> Option<(String, String)> {
    let id = literal_after(turtle, "rep:repositoryID")?;
    let title = literal_after(turtle, "rdfs:label").unwrap_or_default();
    Some((id, title))
}

fn literal_after(turtle: &str, predicate: &str) -> Option<String> {
    let rest = &turtle[turtle.find(predicate)? + predicate.len()..];
    let rest = rest.trim_start().strip_prefix('"')?;
    let mut value = String::new();
    let mut chars = rest.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => return Some(value),
            '\\' => match chars.next()? {
                'n' => value.push('\n'),
                'r' => value.push('\r'),
                't' => value.push('\t'),
                other => value.push(other),
            },
            c => value.push(c),
        }
    }
    None
}

fn media_type(headers: &HeaderMap) -> String {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .unwrap_or_default()
}

fn accepts(headers: &HeaderMap, mime: &str) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains(mime))
}

fn strip_brackets(uri: &str) -> &str {
    uri.strip_prefix('<')
        .and_then(|u| u.strip_suffix('>'))
        .unwrap_or(uri)
}

enum Term {
    Uri(String),
    Literal(String),
}

/// SPARQL-results XML limited to what the client tests inspect: a `head`
/// of variables and `uri`/`literal` bindings. No blank nodes, datatypes or
/// language tags.
fn sparql_results(variables: &[&str], rows: Vec<Vec<(&str, Term)>>) -> String {
    let mut xml = String::from("<?xml version='1.0' encoding='UTF-8'?>\n");
    xml.push_str("<sparql xmlns='http://www.w3.org/2005/sparql-results#'>\n\t<head>\n");
    for var in variables {
        xml.push_str(&format!("\t\t<variable name='{var}'/>\n"));
    }
    xml.push_str("\t</head>\n\t<results>\n");
    for row in rows {
        xml.push_str("\t\t<result>\n");
        for (name, term) in row {
            let value = match term {
                Term::Uri(u) => format!("<uri>{}</uri>", escape_xml(&u)),
                Term::Literal(l) => format!("<literal>{}</literal>", escape_xml(&l)),
            };
            xml.push_str(&format!("\t\t\t<binding name='{name}'>{value}</binding>\n"));
        }
        xml.push_str("\t\t</result>\n");
    }
    xml.push_str("\t</results>\n</sparql>\n");
    xml
}

fn rdf_description(repository: &Repository) -> String {
    format!(
        "<?xml version='1.0' encoding='UTF-8'?>\n\
         <rdf:RDF xmlns:rdf='http://www.w3.org/1999/02/22-rdf-syntax-ns#' \
         xmlns:rdfs='http://www.w3.org/2000/01/rdf-schema#'>\n\
         \t<rdf:Description rdf:about='urn:repository'>\n\
         \t\t<rdfs:label>{}</rdfs:label>\n\
         \t</rdf:Description>\n\
         </rdf:RDF>\n",
        escape_xml(&repository.title)
    )
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\'', "&apos;")
        .replace('"', "&quot;")
}

fn xml_response(content_type: &'static str, body: String) -> Response {
    ([(header::CONTENT_TYPE, content_type)], body).into_response()
}
