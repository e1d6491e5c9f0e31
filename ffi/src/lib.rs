//! C-ABI wrapper around `sesame-core`.
//!
//! # Overview
//! Exposes the Sesame repository protocol through `extern "C"` functions so
//! any language with a C FFI can build requests and interpret responses
//! without linking an HTTP stack. The caller performs the I/O.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - One `sesame_build_*` per operation. Builders return null on a null
//!   argument or when validation rejects the call (no repository selected,
//!   unknown format, empty prefix).
//! - A single `sesame_parse` takes an `FfiOperation` tag and returns an
//!   `FfiSesameResult` envelope whose `FfiDataTag` says what `data` holds.
//! - The C caller owns all returned pointers and must call the matching
//!   `sesame_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use sesame_core::{
    normalize_context, Context, Credentials, HttpRequest, HttpResponse, InputFormat, QueryOptions, RepositoryConfig,
    ResultFormat, SesameClient, SesameError,
};

use types::*;

/// Borrow a C string argument as UTF-8.
fn arg<'a>(ptr: *const c_char, name: &str) -> Result<&'a str, SesameError> {
    if ptr.is_null() {
        return Err(SesameError::InvalidArgument(format!("null argument: {name}")));
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| SesameError::InvalidArgument(format!("{name} is not valid UTF-8")))
}

/// Like `arg`, but null means absent.
fn optional_arg<'a>(ptr: *const c_char, name: &str) -> Result<Option<&'a str>, SesameError> {
    if ptr.is_null() {
        Ok(None)
    } else {
        arg(ptr, name).map(Some)
    }
}

fn bytes_arg(ptr: *const u8, len: usize) -> Vec<u8> {
    if ptr.is_null() || len == 0 {
        Vec::new()
    } else {
        unsafe { std::slice::from_raw_parts(ptr, len) }.to_vec()
    }
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `SesameClient` bound to `base_url` (the server root, e.g.
/// `http://localhost:8080/openrdf-sesame`). No repository is selected.
///
/// Returns null if `base_url` is null, not UTF-8, or if a panic occurs.
/// The caller must free the returned pointer with `sesame_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn sesame_client_new(base_url: *const c_char) -> *mut FfiSesameClient {
    catch_unwind(|| match arg(base_url, "base_url") {
        Ok(url) => Box::into_raw(Box::new(FfiSesameClient {
            inner: SesameClient::new(url),
        })),
        Err(_) => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `sesame_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn sesame_client_free(client: *mut FfiSesameClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

/// Select the repository later operations address. A null or empty
/// `repository` clears the selection.
///
/// Returns false if `client` is null or `repository` is not UTF-8.
#[unsafe(no_mangle)]
pub extern "C" fn sesame_client_set_repository(client: *mut FfiSesameClient, repository: *const c_char) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(client) = (unsafe { client.as_mut() }) else {
            return false;
        };
        match optional_arg(repository, "repository") {
            Ok(repository) => {
                client.inner.set_repository(repository);
                true
            }
            Err(_) => false,
        }
    }))
    .unwrap_or(false)
}

/// Attach HTTP basic credentials to every request built afterwards. A null
/// `username` removes them; a null `password` is sent as empty.
#[unsafe(no_mangle)]
pub extern "C" fn sesame_client_set_credentials(
    client: *mut FfiSesameClient,
    username: *const c_char,
    password: *const c_char,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(client) = (unsafe { client.as_mut() }) else {
            return false;
        };
        let (Ok(username), Ok(password)) = (
            optional_arg(username, "username"),
            optional_arg(password, "password"),
        ) else {
            return false;
        };
        match username {
            Some(user) => client
                .inner
                .set_credentials(Credentials::new(user, password.unwrap_or(""))),
            None => client.inner.clear_credentials(),
        }
        true
    }))
    .unwrap_or(false)
}

/// Override the charsets sent in `Accept` and `Content-Type` headers. Null
/// leaves the corresponding charset unchanged.
#[unsafe(no_mangle)]
pub extern "C" fn sesame_client_set_charsets(
    client: *mut FfiSesameClient,
    accept_charset: *const c_char,
    content_charset: *const c_char,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(client) = (unsafe { client.as_mut() }) else {
            return false;
        };
        let (Ok(accept), Ok(content)) = (
            optional_arg(accept_charset, "accept_charset"),
            optional_arg(content_charset, "content_charset"),
        ) else {
            return false;
        };
        if let Some(cs) = accept {
            client.inner.set_accept_charset(cs);
        }
        if let Some(cs) = content {
            client.inner.set_content_charset(cs);
        }
        true
    }))
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Run `build` against the client, converting the outcome to a C request.
fn build_request(
    client: *const FfiSesameClient,
    build: impl FnOnce(&SesameClient) -> Result<HttpRequest, SesameError>,
) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(client) = (unsafe { client.as_ref() }) else {
            return std::ptr::null_mut();
        };
        match build(&client.inner) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Build a request listing the server's repositories.
///
/// Returns null if `client` is null.
/// The caller must free the returned pointer with `sesame_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn sesame_build_list_repositories(client: *const FfiSesameClient) -> *mut FfiHttpRequest {
    build_request(client, |c| Ok(c.build_list_repositories()))
}

/// Build a query against the selected repository.
///
/// `language` is `"sparql"` or `"serql"`; `result_format` is a MIME type and
/// must be `application/sparql-results+xml`.
#[unsafe(no_mangle)]
pub extern "C" fn sesame_build_query(
    client: *const FfiSesameClient,
    query: *const c_char,
    language: *const c_char,
    result_format: *const c_char,
    infer: bool,
) -> *mut FfiHttpRequest {
    build_request(client, |c| {
        let options = QueryOptions {
            result_format: ResultFormat::from_mime(arg(result_format, "result_format")?)?,
            language: arg(language, "language")?.parse()?,
            infer,
        };
        c.build_query(arg(query, "query")?, &options)
    })
}

/// Build a describe query; the answer is RDF/XML.
#[unsafe(no_mangle)]
pub extern "C" fn sesame_build_describe(
    client: *const FfiSesameClient,
    query: *const c_char,
    language: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, |c| {
        c.build_describe(arg(query, "query")?, arg(language, "language")?.parse()?)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn sesame_build_update(client: *const FfiSesameClient, update: *const c_char) -> *mut FfiHttpRequest {
    build_request(client, |c| c.build_update(arg(update, "update")?))
}

/// Build a request adding `data` to `context` (`"null"` for the default
/// context) in the selected repository. `input_format` is a MIME type.
#[unsafe(no_mangle)]
pub extern "C" fn sesame_build_append(
    client: *const FfiSesameClient,
    data: *const u8,
    data_len: usize,
    context: *const c_char,
    input_format: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, |c| {
        let context = Context::parse(arg(context, "context")?);
        let format = InputFormat::from_mime(arg(input_format, "input_format")?)?;
        c.build_append(bytes_arg(data, data_len), &context, format)
    })
}

/// As `sesame_build_append`, but replaces the statements of `context`.
#[unsafe(no_mangle)]
pub extern "C" fn sesame_build_overwrite(
    client: *const FfiSesameClient,
    data: *const u8,
    data_len: usize,
    context: *const c_char,
    input_format: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, |c| {
        let context = Context::parse(arg(context, "context")?);
        let format = InputFormat::from_mime(arg(input_format, "input_format")?)?;
        c.build_overwrite(bytes_arg(data, data_len), &context, format)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn sesame_build_get_namespace(
    client: *const FfiSesameClient,
    prefix: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, |c| c.build_get_namespace(arg(prefix, "prefix")?))
}

#[unsafe(no_mangle)]
pub extern "C" fn sesame_build_set_namespace(
    client: *const FfiSesameClient,
    prefix: *const c_char,
    namespace: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, |c| {
        c.build_set_namespace(arg(prefix, "prefix")?, arg(namespace, "namespace")?)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn sesame_build_delete_namespace(
    client: *const FfiSesameClient,
    prefix: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, |c| c.build_delete_namespace(arg(prefix, "prefix")?))
}

#[unsafe(no_mangle)]
pub extern "C" fn sesame_build_contexts(
    client: *const FfiSesameClient,
    result_format: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, |c| {
        c.build_contexts(ResultFormat::from_mime(arg(result_format, "result_format")?)?)
    })
}

/// Build a statement count request for one context. A null `context`
/// means the default context, as does `"null"`.
#[unsafe(no_mangle)]
pub extern "C" fn sesame_build_size(client: *const FfiSesameClient, context: *const c_char) -> *mut FfiHttpRequest {
    build_request(client, |c| {
        let context = optional_arg(context, "context")?.map(Context::parse).unwrap_or_default();
        c.build_size(&context)
    })
}

/// Build a statement count request across every context. Parse the
/// response as `FfiOperation::Size`.
#[unsafe(no_mangle)]
pub extern "C" fn sesame_build_size_all(client: *const FfiSesameClient) -> *mut FfiHttpRequest {
    build_request(client, |c| c.build_size_all())
}

#[unsafe(no_mangle)]
pub extern "C" fn sesame_build_clear(client: *const FfiSesameClient) -> *mut FfiHttpRequest {
    build_request(client, |c| c.build_clear())
}

#[unsafe(no_mangle)]
pub extern "C" fn sesame_build_clear_context(
    client: *const FfiSesameClient,
    context: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, |c| c.build_clear_context(&Context::parse(arg(context, "context")?)))
}

/// Build a request registering repository `id` with the server. `storage`
/// is `"memory"` or `"native"`. No repository needs to be selected.
#[unsafe(no_mangle)]
pub extern "C" fn sesame_build_create_repository(
    client: *const FfiSesameClient,
    id: *const c_char,
    title: *const c_char,
    storage: *const c_char,
) -> *mut FfiHttpRequest {
    build_request(client, |c| {
        let config = RepositoryConfig::new(
            arg(id, "id")?,
            optional_arg(title, "title")?.unwrap_or(""),
            arg(storage, "storage")?.parse()?,
        )?;
        Ok(c.build_create_repository(&config))
    })
}

/// Build a request deleting the selected repository.
#[unsafe(no_mangle)]
pub extern "C" fn sesame_build_delete_repository(client: *const FfiSesameClient) -> *mut FfiHttpRequest {
    build_request(client, |c| c.build_delete_repository())
}

/// Normalize a raw context token into its query-string form: `null` stays
/// as is, anything else is wrapped in `<...>` and percent-encoded. Already
/// normalized tokens come back unchanged.
///
/// Returns null for a null, empty or non-UTF-8 argument. The caller must
/// free the returned string with `sesame_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn sesame_normalize_context(context: *const c_char) -> *mut c_char {
    catch_unwind(|| match arg(context, "context").and_then(normalize_context) {
        Ok(normalized) => into_c_string(normalized),
        Err(_) => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response function
// ---------------------------------------------------------------------------

enum Payload {
    None,
    Body(Vec<u8>),
    Size(u64),
}

fn parse_response(client: &SesameClient, operation: FfiOperation, resp: HttpResponse) -> Result<Payload, SesameError> {
    use FfiOperation as Op;
    Ok(match operation {
        Op::ListRepositories => Payload::Body(client.parse_list_repositories(resp)?),
        Op::Query => Payload::Body(client.parse_query(resp)?),
        Op::Describe => Payload::Body(client.parse_describe(resp)?),
        Op::Contexts => Payload::Body(client.parse_contexts(resp)?),
        Op::GetNamespace => Payload::Body(client.parse_get_namespace(resp)?.into_bytes()),
        Op::Size => Payload::Size(client.parse_size(resp)?),
        Op::Update => client.parse_update(resp).map(|_| Payload::None)?,
        Op::Append => client.parse_append(resp).map(|_| Payload::None)?,
        Op::Overwrite => client.parse_overwrite(resp).map(|_| Payload::None)?,
        Op::SetNamespace => client.parse_set_namespace(resp).map(|_| Payload::None)?,
        Op::DeleteNamespace => client.parse_delete_namespace(resp).map(|_| Payload::None)?,
        Op::Clear => client.parse_clear(resp).map(|_| Payload::None)?,
        Op::ClearContext => client.parse_clear_context(resp).map(|_| Payload::None)?,
        Op::CreateRepository => client.parse_create_repository(resp).map(|_| Payload::None)?,
        Op::DeleteRepository => client.parse_delete_repository(resp).map(|_| Payload::None)?,
    })
}

/// Interpret the response to a request built for `operation`.
///
/// On success `data_tag` is `Body` for listings, query results and namespace
/// lookups, `Size` for statement counts, and `None` for writes. A status
/// other than the operation's expected one yields `FfiErrorCode::Remote`
/// with `http_status` set.
#[unsafe(no_mangle)]
pub extern "C" fn sesame_parse(
    client: *const FfiSesameClient,
    operation: FfiOperation,
    response: *const FfiHttpResponse,
) -> *mut FfiSesameResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiSesameResult::null_arg("client");
        }
        if response.is_null() {
            return FfiSesameResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        let core_resp = HttpResponse::new(resp.status, bytes_arg(resp.body, resp.body_len));
        match parse_response(&client.inner, operation, core_resp) {
            Ok(Payload::None) => FfiSesameResult::ok_empty(),
            Ok(Payload::Body(bytes)) => FfiSesameResult::ok_body(bytes),
            Ok(Payload::Size(size)) => FfiSesameResult::ok_size(size),
            Err(e) => FfiSesameResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiSesameResult::panic("panic in sesame_parse"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `sesame_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn sesame_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        if !req.url.is_null() {
            drop(unsafe { CString::from_raw(req.url) });
        }
        unsafe { free_bytes(req.body, req.body_len) };
        if !req.headers.is_null() {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                if !h.key.is_null() {
                    drop(unsafe { CString::from_raw(h.key) });
                }
                if !h.value.is_null() {
                    drop(unsafe { CString::from_raw(h.value) });
                }
            }
        }
    });
}

/// Free an `FfiSesameResult` returned by `sesame_parse`.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn sesame_free_result(result: *mut FfiSesameResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.data.is_null() {
            match result.data_tag {
                FfiDataTag::Body => {
                    let body = unsafe { Box::from_raw(result.data as *mut FfiBody) };
                    unsafe { free_bytes(body.data, body.len) };
                }
                FfiDataTag::Size => drop(unsafe { Box::from_raw(result.data as *mut u64) }),
                FfiDataTag::None => {}
            }
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn sesame_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://localhost:8080/openrdf-sesame";

    fn new_client(repository: Option<&str>) -> *mut FfiSesameClient {
        let url = CString::new(BASE).unwrap();
        let client = sesame_client_new(url.as_ptr());
        assert!(!client.is_null());
        if let Some(repo) = repository {
            let repo = CString::new(repo).unwrap();
            assert!(sesame_client_set_repository(client, repo.as_ptr()));
        }
        client
    }

    fn url_of(req: &FfiHttpRequest) -> &str {
        unsafe { CStr::from_ptr(req.url) }.to_str().unwrap()
    }

    fn body_of(req: &FfiHttpRequest) -> &[u8] {
        unsafe { std::slice::from_raw_parts(req.body, req.body_len) }
    }

    fn headers_of(req: &FfiHttpRequest) -> Vec<(String, String)> {
        if req.headers.is_null() {
            return Vec::new();
        }
        unsafe { std::slice::from_raw_parts(req.headers, req.headers_len as usize) }
            .iter()
            .map(|h| unsafe {
                (
                    CStr::from_ptr(h.key).to_str().unwrap().to_string(),
                    CStr::from_ptr(h.value).to_str().unwrap().to_string(),
                )
            })
            .collect()
    }

    fn response(status: u16, body: &[u8]) -> FfiHttpResponse {
        FfiHttpResponse {
            status,
            body: body.as_ptr(),
            body_len: body.len(),
        }
    }

    #[test]
    fn client_new_and_free() {
        let client = new_client(None);
        sesame_client_free(client);
    }

    #[test]
    fn client_new_null_returns_null() {
        assert!(sesame_client_new(std::ptr::null()).is_null());
    }

    #[test]
    fn client_free_null_is_safe() {
        sesame_client_free(std::ptr::null_mut());
    }

    #[test]
    fn setters_reject_null_client() {
        assert!(!sesame_client_set_repository(std::ptr::null_mut(), std::ptr::null()));
        assert!(!sesame_client_set_credentials(std::ptr::null_mut(), std::ptr::null(), std::ptr::null()));
        assert!(!sesame_client_set_charsets(std::ptr::null_mut(), std::ptr::null(), std::ptr::null()));
    }

    #[test]
    fn build_list_repositories_returns_correct_request() {
        let client = new_client(None);
        let req = sesame_build_list_repositories(client);
        assert!(!req.is_null());

        let r = unsafe { &*req };
        assert_eq!(r.method, FfiHttpMethod::Get);
        assert_eq!(url_of(r), format!("{BASE}/repositories"));
        assert!(r.body.is_null());
        assert_eq!(
            headers_of(r),
            vec![(
                "Accept".to_string(),
                "application/sparql-results+xml; charset=UTF-8".to_string()
            )]
        );

        sesame_free_request(req);
        sesame_client_free(client);
    }

    #[test]
    fn build_list_repositories_null_client_returns_null() {
        assert!(sesame_build_list_repositories(std::ptr::null()).is_null());
    }

    #[test]
    fn build_query_encodes_form() {
        let client = new_client(Some("test"));
        let query = CString::new("ASK {}").unwrap();
        let language = CString::new("sparql").unwrap();
        let format = CString::new("application/sparql-results+xml").unwrap();
        let req = sesame_build_query(client, query.as_ptr(), language.as_ptr(), format.as_ptr(), false);
        assert!(!req.is_null());

        let r = unsafe { &*req };
        assert_eq!(r.method, FfiHttpMethod::Post);
        assert_eq!(url_of(r), format!("{BASE}/repositories/test"));
        assert_eq!(body_of(r), b"query=ASK+%7B%7D&queryLn=sparql&infer=false");

        sesame_free_request(req);
        sesame_client_free(client);
    }

    #[test]
    fn build_query_rejects_unimplemented_format() {
        let client = new_client(Some("test"));
        let query = CString::new("ASK {}").unwrap();
        let language = CString::new("sparql").unwrap();
        let format = CString::new("application/sparql-results+json").unwrap();
        let req = sesame_build_query(client, query.as_ptr(), language.as_ptr(), format.as_ptr(), true);
        assert!(req.is_null());
        sesame_client_free(client);
    }

    #[test]
    fn build_without_repository_returns_null() {
        let client = new_client(None);
        assert!(sesame_build_clear(client).is_null());
        assert!(sesame_build_delete_repository(client).is_null());
        sesame_client_free(client);
    }

    #[test]
    fn build_append_carries_raw_body_and_context() {
        let client = new_client(Some("test"));
        let data = b"<urn:a> <urn:b> <urn:c> .";
        let context = CString::new("urn:graph:1").unwrap();
        let format = CString::new("text/plain").unwrap();
        let req = sesame_build_append(client, data.as_ptr(), data.len(), context.as_ptr(), format.as_ptr());
        assert!(!req.is_null());

        let r = unsafe { &*req };
        assert_eq!(r.method, FfiHttpMethod::Post);
        assert_eq!(
            url_of(r),
            format!("{BASE}/repositories/test/statements?context=%3Curn%3Agraph%3A1%3E")
        );
        assert_eq!(body_of(r), data);

        sesame_free_request(req);
        sesame_client_free(client);
    }

    #[test]
    fn build_size_defaults_to_default_context() {
        let client = new_client(Some("test"));
        let default = CString::new("null").unwrap();
        for context in [std::ptr::null(), default.as_ptr()] {
            let req = sesame_build_size(client, context);
            assert_eq!(url_of(unsafe { &*req }), format!("{BASE}/repositories/test/size?context=null"));
            sesame_free_request(req);
        }

        let req = sesame_build_size_all(client);
        assert_eq!(url_of(unsafe { &*req }), format!("{BASE}/repositories/test/size"));
        sesame_free_request(req);
        sesame_client_free(client);
    }

    #[test]
    fn empty_context_builds_nothing() {
        let client = new_client(Some("test"));
        let data = b"<urn:a> <urn:b> <urn:c> .";
        let empty = CString::new("").unwrap();
        let format = CString::new("text/plain").unwrap();
        assert!(sesame_build_append(client, data.as_ptr(), data.len(), empty.as_ptr(), format.as_ptr()).is_null());
        assert!(sesame_build_overwrite(client, data.as_ptr(), data.len(), empty.as_ptr(), format.as_ptr()).is_null());
        assert!(sesame_build_size(client, empty.as_ptr()).is_null());
        assert!(sesame_build_clear_context(client, empty.as_ptr()).is_null());
        sesame_client_free(client);
    }

    #[test]
    fn build_create_repository_targets_system() {
        let client = new_client(Some("current"));
        let id = CString::new("test").unwrap();
        let title = CString::new("Test repo").unwrap();
        let storage = CString::new("native").unwrap();
        let req = sesame_build_create_repository(client, id.as_ptr(), title.as_ptr(), storage.as_ptr());
        assert!(!req.is_null());

        let r = unsafe { &*req };
        assert_eq!(url_of(r), format!("{BASE}/repositories/SYSTEM/statements?context=null"));
        let body = std::str::from_utf8(body_of(r)).unwrap();
        assert!(body.contains("rep:repositoryID \"test\""));
        assert!(body.contains("ns:tripleIndexes \"spoc,posc\""));

        sesame_free_request(req);
        sesame_client_free(client);
    }

    #[test]
    fn build_create_repository_rejects_unknown_storage() {
        let client = new_client(None);
        let id = CString::new("test").unwrap();
        let storage = CString::new("remote").unwrap();
        let req = sesame_build_create_repository(client, id.as_ptr(), std::ptr::null(), storage.as_ptr());
        assert!(req.is_null());
        sesame_client_free(client);
    }

    #[test]
    fn credentials_and_charsets_reach_headers() {
        let client = new_client(Some("test"));
        let user = CString::new("test").unwrap();
        let pass = CString::new("password").unwrap();
        let latin = CString::new("ISO-8859-1").unwrap();
        assert!(sesame_client_set_credentials(client, user.as_ptr(), pass.as_ptr()));
        assert!(sesame_client_set_charsets(client, latin.as_ptr(), std::ptr::null()));

        let prefix = CString::new("foaf").unwrap();
        let req = sesame_build_get_namespace(client, prefix.as_ptr());
        let headers = headers_of(unsafe { &*req });
        assert!(headers.contains(&("Accept".to_string(), "text/plain; charset=ISO-8859-1".to_string())));
        assert!(headers.contains(&(
            "Authorization".to_string(),
            "Basic dGVzdDpwYXNzd29yZA==".to_string()
        )));
        sesame_free_request(req);

        assert!(sesame_client_set_credentials(client, std::ptr::null(), std::ptr::null()));
        let req = sesame_build_get_namespace(client, prefix.as_ptr());
        assert!(!headers_of(unsafe { &*req }).iter().any(|(k, _)| k == "Authorization"));
        sesame_free_request(req);
        sesame_client_free(client);
    }

    #[test]
    fn normalize_context_is_idempotent() {
        let raw = CString::new("http://example.org/g1").unwrap();
        let once = sesame_normalize_context(raw.as_ptr());
        assert_eq!(
            unsafe { CStr::from_ptr(once) }.to_str().unwrap(),
            "%3Chttp%3A%2F%2Fexample.org%2Fg1%3E"
        );
        let twice = sesame_normalize_context(once);
        assert_eq!(unsafe { CStr::from_ptr(twice) }, unsafe { CStr::from_ptr(once) });
        sesame_free_string(once);
        sesame_free_string(twice);

        let empty = CString::new("").unwrap();
        assert!(sesame_normalize_context(empty.as_ptr()).is_null());
        assert!(sesame_normalize_context(std::ptr::null()).is_null());
    }

    #[test]
    fn parse_body_result() {
        let client = new_client(Some("test"));
        let resp = response(200, b"<sparql/>");
        let result = sesame_parse(client, FfiOperation::Query, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert!(r.error_message.is_null());
        assert_eq!(r.data_tag, FfiDataTag::Body);

        let body = unsafe { &*(r.data as *const FfiBody) };
        assert_eq!(unsafe { std::slice::from_raw_parts(body.data, body.len) }, b"<sparql/>");

        sesame_free_result(result);
        sesame_client_free(client);
    }

    #[test]
    fn parse_size_result() {
        let client = new_client(Some("test"));
        let resp = response(200, b"42\n");
        let result = sesame_parse(client, FfiOperation::Size, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert_eq!(r.data_tag, FfiDataTag::Size);
        assert_eq!(unsafe { *(r.data as *const u64) }, 42);

        sesame_free_result(result);
        sesame_client_free(client);
    }

    #[test]
    fn parse_write_success_has_no_data() {
        let client = new_client(Some("test"));
        let resp = response(204, b"");
        let result = sesame_parse(client, FfiOperation::Append, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert_eq!(r.data_tag, FfiDataTag::None);
        assert!(r.data.is_null());

        sesame_free_result(result);
        sesame_client_free(client);
    }

    #[test]
    fn parse_unexpected_status_is_remote_error() {
        let client = new_client(Some("test"));
        let resp = response(500, b"boom");
        let result = sesame_parse(client, FfiOperation::Append, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Remote);
        assert_eq!(r.http_status, 500);
        let msg = unsafe { CStr::from_ptr(r.error_message) }.to_str().unwrap();
        assert_eq!(msg, "append data to the repository failed, HTTP response error: 500");

        sesame_free_result(result);
        sesame_client_free(client);
    }

    #[test]
    fn parse_null_body_with_zero_length() {
        let client = new_client(Some("test"));
        let resp = FfiHttpResponse {
            status: 204,
            body: std::ptr::null(),
            body_len: 0,
        };
        let result = sesame_parse(client, FfiOperation::Clear, &resp);
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::Ok);
        sesame_free_result(result);
        sesame_client_free(client);
    }

    #[test]
    fn parse_null_client_returns_null_arg() {
        let resp = response(200, b"");
        let result = sesame_parse(std::ptr::null(), FfiOperation::ListRepositories, &resp);
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::NullArg);
        sesame_free_result(result);
    }

    #[test]
    fn parse_null_response_returns_null_arg() {
        let client = new_client(None);
        let result = sesame_parse(client, FfiOperation::ListRepositories, std::ptr::null());
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::NullArg);
        sesame_free_result(result);
        sesame_client_free(client);
    }

    #[test]
    fn free_request_null_is_safe() {
        sesame_free_request(std::ptr::null_mut());
    }

    #[test]
    fn free_result_null_is_safe() {
        sesame_free_result(std::ptr::null_mut());
    }

    #[test]
    fn free_string_null_is_safe() {
        sesame_free_string(std::ptr::null_mut());
    }
}
