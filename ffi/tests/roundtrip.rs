//! Drive the C surface against the live mock server.
//!
//! # Design
//! Plays the part of a C host: requests come out of `sesame_build_*`, are
//! executed with ureq exactly as described (method, url, headers, body
//! bytes), and the raw status and body go back through `sesame_parse`.

use std::ffi::{CStr, CString};
use std::net::SocketAddr;

use sesame_ffi::types::*;
use sesame_ffi::*;

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });
    addr
}

/// Execute an `FfiHttpRequest` with ureq, returning status and body.
fn execute(req: *mut FfiHttpRequest) -> (u16, Vec<u8>) {
    assert!(!req.is_null(), "request was not built");
    let r = unsafe { &*req };
    let url = unsafe { CStr::from_ptr(r.url) }.to_str().unwrap().to_string();
    let headers: Vec<(String, String)> = if r.headers.is_null() {
        Vec::new()
    } else {
        unsafe { std::slice::from_raw_parts(r.headers, r.headers_len as usize) }
            .iter()
            .map(|h| unsafe {
                (
                    CStr::from_ptr(h.key).to_str().unwrap().to_string(),
                    CStr::from_ptr(h.value).to_str().unwrap().to_string(),
                )
            })
            .collect()
    };
    let body = if r.body.is_null() {
        None
    } else {
        Some(unsafe { std::slice::from_raw_parts(r.body, r.body_len) }.to_vec())
    };
    let method = r.method;
    sesame_free_request(req);

    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match method {
        FfiHttpMethod::Get | FfiHttpMethod::Delete => {
            let mut builder = if method == FfiHttpMethod::Get {
                agent.get(&url)
            } else {
                agent.delete(&url)
            };
            for (k, v) in &headers {
                builder = builder.header(k.as_str(), v.as_str());
            }
            builder.call()
        }
        FfiHttpMethod::Post | FfiHttpMethod::Put => {
            let mut builder = if method == FfiHttpMethod::Post {
                agent.post(&url)
            } else {
                agent.put(&url)
            };
            for (k, v) in &headers {
                builder = builder.header(k.as_str(), v.as_str());
            }
            match &body {
                Some(bytes) => builder.send(&bytes[..]),
                None => builder.send_empty(),
            }
        }
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_vec().unwrap_or_default();
    (status, body)
}

/// Outcome of `sesame_parse`, copied out before the result is freed.
#[derive(Debug, PartialEq)]
enum Outcome {
    Empty,
    Body(String),
    Size(u64),
    Error(FfiErrorCode, u16),
}

fn roundtrip(client: *const FfiSesameClient, operation: FfiOperation, req: *mut FfiHttpRequest) -> Outcome {
    let (status, body) = execute(req);
    let response = FfiHttpResponse {
        status,
        body: body.as_ptr(),
        body_len: body.len(),
    };
    let result = sesame_parse(client, operation, &response);
    let r = unsafe { &*result };
    let outcome = match (r.error_code, r.data_tag) {
        (FfiErrorCode::Ok, FfiDataTag::None) => Outcome::Empty,
        (FfiErrorCode::Ok, FfiDataTag::Body) => {
            let b = unsafe { &*(r.data as *const FfiBody) };
            let bytes = unsafe { std::slice::from_raw_parts(b.data, b.len) };
            Outcome::Body(String::from_utf8(bytes.to_vec()).unwrap())
        }
        (FfiErrorCode::Ok, FfiDataTag::Size) => Outcome::Size(unsafe { *(r.data as *const u64) }),
        (code, _) => Outcome::Error(code, r.http_status),
    };
    sesame_free_result(result);
    outcome
}

#[test]
fn repository_lifecycle_through_c_surface() {
    let addr = start_server();
    let base = CString::new(format!("http://{addr}")).unwrap();
    let client = sesame_client_new(base.as_ptr());
    assert!(!client.is_null());

    let [friends, title, memory, default, plain, graph, delimited, query, sparql, xml, foaf, foaf_ns, clear_all] = [
        "friends",
        "Friends",
        "memory",
        "null",
        "text/plain",
        "urn:graph:1",
        "<urn:graph:1>",
        "SELECT * WHERE { ?s ?p ?o }",
        "sparql",
        "application/sparql-results+xml",
        "foaf",
        "http://xmlns.com/foaf/0.1/",
        "CLEAR ALL",
    ]
    .map(|s| CString::new(s).unwrap());

    // Step 1: create a repository while none is selected.
    let req = sesame_build_create_repository(client, friends.as_ptr(), title.as_ptr(), memory.as_ptr());
    assert_eq!(roundtrip(client, FfiOperation::CreateRepository, req), Outcome::Empty);

    let req = sesame_build_list_repositories(client);
    let Outcome::Body(listing) = roundtrip(client, FfiOperation::ListRepositories, req) else {
        panic!("expected a listing");
    };
    assert!(listing.contains("<literal>friends</literal>"));

    // Step 2: select it and load statements.
    assert!(sesame_client_set_repository(client, friends.as_ptr()));
    let data = b"<urn:a> <urn:knows> <urn:b> .\n<urn:b> <urn:knows> <urn:c> .\n";
    let req = sesame_build_append(client, data.as_ptr(), data.len(), default.as_ptr(), plain.as_ptr());
    assert_eq!(roundtrip(client, FfiOperation::Append, req), Outcome::Empty);

    let named = b"<urn:x> <urn:y> <urn:z> .";
    let req = sesame_build_append(client, named.as_ptr(), named.len(), graph.as_ptr(), plain.as_ptr());
    assert_eq!(roundtrip(client, FfiOperation::Append, req), Outcome::Empty);

    let req = sesame_build_size_all(client);
    assert_eq!(roundtrip(client, FfiOperation::Size, req), Outcome::Size(3));
    let req = sesame_build_size(client, std::ptr::null());
    assert_eq!(roundtrip(client, FfiOperation::Size, req), Outcome::Size(2));
    let req = sesame_build_size(client, delimited.as_ptr());
    assert_eq!(roundtrip(client, FfiOperation::Size, req), Outcome::Size(1));

    // Step 3: query and contexts.
    let req = sesame_build_query(client, query.as_ptr(), sparql.as_ptr(), xml.as_ptr(), true);
    let Outcome::Body(results) = roundtrip(client, FfiOperation::Query, req) else {
        panic!("expected query results");
    };
    assert!(results.contains("&lt;urn:a&gt;"));

    let req = sesame_build_contexts(client, xml.as_ptr());
    let Outcome::Body(contexts) = roundtrip(client, FfiOperation::Contexts, req) else {
        panic!("expected contexts");
    };
    assert!(contexts.contains("<uri>urn:graph:1</uri>"));

    // Step 4: namespaces.
    let req = sesame_build_set_namespace(client, foaf.as_ptr(), foaf_ns.as_ptr());
    assert_eq!(roundtrip(client, FfiOperation::SetNamespace, req), Outcome::Empty);
    let req = sesame_build_get_namespace(client, foaf.as_ptr());
    assert_eq!(
        roundtrip(client, FfiOperation::GetNamespace, req),
        Outcome::Body("http://xmlns.com/foaf/0.1/".to_string())
    );

    // Step 5: clearing, then deletion.
    let req = sesame_build_clear_context(client, graph.as_ptr());
    assert_eq!(roundtrip(client, FfiOperation::ClearContext, req), Outcome::Empty);
    let req = sesame_build_update(client, clear_all.as_ptr());
    assert_eq!(roundtrip(client, FfiOperation::Update, req), Outcome::Empty);
    let req = sesame_build_size_all(client);
    assert_eq!(roundtrip(client, FfiOperation::Size, req), Outcome::Size(0));

    let req = sesame_build_delete_repository(client);
    assert_eq!(roundtrip(client, FfiOperation::DeleteRepository, req), Outcome::Empty);
    let req = sesame_build_clear(client);
    assert_eq!(
        roundtrip(client, FfiOperation::Clear, req),
        Outcome::Error(FfiErrorCode::Remote, 404)
    );

    sesame_client_free(client);
}
