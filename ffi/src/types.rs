//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` for URLs and header text, pointer/length pairs for bodies
//! (RDF payloads are bytes, not C strings), and tagged enums with explicit
//! discriminants. Conversion functions live here to keep `lib.rs` focused
//! on the `extern "C"` surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use sesame_core::{HttpMethod, HttpRequest, Operation, SesameClient, SesameError};

/// Opaque handle to a `SesameClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiSesameClient {
    pub(crate) inner: SesameClient,
}

/// Convert to an owned C string. Interior NULs yield an empty string.
pub(crate) fn into_c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

/// Leak a byte buffer as a pointer/length pair; reclaimed by `free_bytes`.
pub(crate) fn into_raw_bytes(bytes: Vec<u8>) -> (*mut u8, usize) {
    let boxed = bytes.into_boxed_slice();
    let len = boxed.len();
    (Box::into_raw(boxed) as *mut u8, len)
}

/// # Safety
/// `ptr`/`len` must come from `into_raw_bytes` and not have been freed.
pub(crate) unsafe fn free_bytes(ptr: *mut u8, len: usize) {
    if !ptr.is_null() {
        drop(unsafe { Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr, len)) });
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `sesame_build_*` functions. `url` is absolute. Form bodies are
/// already encoded; `body` is null when the request carries none. The C
/// caller executes the request and passes the response to `sesame_parse`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut u8,
    pub body_len: usize,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let url = into_c_string(req.url);
        let (body, body_len) = match req.body {
            Some(b) => into_raw_bytes(b.to_bytes()),
            None => (std::ptr::null_mut(), 0),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: into_c_string(k),
                    value: into_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body,
            body_len,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing a request. The
/// FFI layer copies but does not free `body`, which may be null when
/// `body_len` is zero.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const u8,
    pub body_len: usize,
}

/// Which operation a response answers; selects the status and result shape.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiOperation {
    ListRepositories = 0,
    Query = 1,
    Describe = 2,
    Update = 3,
    Append = 4,
    Overwrite = 5,
    GetNamespace = 6,
    SetNamespace = 7,
    DeleteNamespace = 8,
    Contexts = 9,
    Size = 10,
    Clear = 11,
    ClearContext = 12,
    CreateRepository = 13,
    DeleteRepository = 14,
}

impl From<FfiOperation> for Operation {
    fn from(op: FfiOperation) -> Self {
        match op {
            FfiOperation::ListRepositories => Operation::ListRepositories,
            FfiOperation::Query => Operation::Query,
            FfiOperation::Describe => Operation::Describe,
            FfiOperation::Update => Operation::Update,
            FfiOperation::Append => Operation::Append,
            FfiOperation::Overwrite => Operation::Overwrite,
            FfiOperation::GetNamespace => Operation::GetNamespace,
            FfiOperation::SetNamespace => Operation::SetNamespace,
            FfiOperation::DeleteNamespace => Operation::DeleteNamespace,
            FfiOperation::Contexts => Operation::Contexts,
            FfiOperation::Size => Operation::Size,
            FfiOperation::Clear => Operation::Clear,
            FfiOperation::ClearContext => Operation::ClearContext,
            FfiOperation::CreateRepository => Operation::CreateRepository,
            FfiOperation::DeleteRepository => Operation::DeleteRepository,
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiSesameResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Configuration = 1,
    InvalidArgument = 2,
    UnsupportedFormat = 3,
    Remote = 4,
    Transport = 5,
    InvalidResponse = 6,
    Io = 7,
    Panic = 8,
    NullArg = 9,
}

impl From<&SesameError> for FfiErrorCode {
    fn from(err: &SesameError) -> Self {
        match err {
            SesameError::Configuration(_) => FfiErrorCode::Configuration,
            SesameError::InvalidArgument(_) => FfiErrorCode::InvalidArgument,
            SesameError::UnsupportedFormat(_) => FfiErrorCode::UnsupportedFormat,
            SesameError::Remote { .. } => FfiErrorCode::Remote,
            SesameError::Transport(_) => FfiErrorCode::Transport,
            SesameError::InvalidResponse { .. } => FfiErrorCode::InvalidResponse,
            SesameError::Io { .. } => FfiErrorCode::Io,
        }
    }
}

/// Tag that tells `sesame_free_result` what `FfiSesameResult::data` points to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    Body = 1,
    Size = 2,
}

/// A response body handed back to C.
#[repr(C)]
pub struct FfiBody {
    pub data: *mut u8,
    pub len: usize,
}

/// Result envelope for `sesame_parse`.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to an `FfiBody` or a `u64` (tagged by `data_tag`), or is null for
/// write operations. On failure `error_code` describes the category,
/// `error_message` is a human-readable C string, `http_status` carries the
/// server's status for `Remote` errors, and `data` is null.
#[repr(C)]
pub struct FfiSesameResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiSesameResult {
    fn new(error_code: FfiErrorCode, error_message: *mut c_char, http_status: u16) -> Self {
        FfiSesameResult {
            error_code,
            error_message,
            http_status,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }
    }

    /// Success carrying a response body.
    pub(crate) fn ok_body(bytes: Vec<u8>) -> *mut Self {
        let (data, len) = into_raw_bytes(bytes);
        let mut result = Self::new(FfiErrorCode::Ok, std::ptr::null_mut(), 0);
        result.data_tag = FfiDataTag::Body;
        result.data = Box::into_raw(Box::new(FfiBody { data, len })) as *mut c_void;
        Box::into_raw(Box::new(result))
    }

    /// Success carrying a statement count.
    pub(crate) fn ok_size(size: u64) -> *mut Self {
        let mut result = Self::new(FfiErrorCode::Ok, std::ptr::null_mut(), 0);
        result.data_tag = FfiDataTag::Size;
        result.data = Box::into_raw(Box::new(size)) as *mut c_void;
        Box::into_raw(Box::new(result))
    }

    /// Success with no payload (write operations).
    pub(crate) fn ok_empty() -> *mut Self {
        Box::into_raw(Box::new(Self::new(FfiErrorCode::Ok, std::ptr::null_mut(), 0)))
    }

    pub(crate) fn from_error(err: SesameError) -> *mut Self {
        let code = FfiErrorCode::from(&err);
        let status = err.status().unwrap_or(0);
        Box::into_raw(Box::new(Self::new(code, into_c_string(err.to_string()), status)))
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        let msg = format!("null argument: {name}");
        Box::into_raw(Box::new(Self::new(FfiErrorCode::NullArg, into_c_string(msg), 0)))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Box::into_raw(Box::new(Self::new(FfiErrorCode::Panic, into_c_string(msg), 0)))
    }
}
