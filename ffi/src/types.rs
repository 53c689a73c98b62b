//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! tagged enums with explicit discriminants. Conversion functions live here
//! to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;
use std::ptr;

use bookshelf_core::{ApiError, Book, BookClient, HttpMethod, HttpRequest, UserProfile};

/// Opaque handle to a `BookClient` plus the session token it attaches.
/// C callers receive a pointer to this and pass it back into every FFI
/// function.
pub struct FfiBookClient {
    pub(crate) inner: BookClient,
    pub(crate) token: Option<String>,
}

impl FfiBookClient {
    pub(crate) fn new(base_url: &str) -> Self {
        Self {
            inner: BookClient::new(base_url),
            token: None,
        }
    }

    /// Attach the current token, if any, as a bearer header.
    pub(crate) fn authorize(&self, req: HttpRequest) -> HttpRequest {
        req.authorize(self.token.as_deref())
    }
}

/// Heap-allocate `s` as a C string. Interior NUL bytes are dropped rather
/// than failing the whole call.
pub(crate) fn c_string(s: impl Into<String>) -> *mut c_char {
    let s: String = s.into();
    CString::new(s.replace('\0', ""))
        .unwrap_or_default()
        .into_raw()
}

fn c_string_opt(s: Option<String>) -> *mut c_char {
    s.map_or(ptr::null_mut(), |s| c_string(s))
}

/// Release a string produced by `c_string`. Null is ignored.
pub(crate) fn drop_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Hand ownership of `items` to C as a pointer plus length.
fn into_raw_parts<T>(items: Vec<T>) -> (*mut T, u32) {
    if items.is_empty() {
        return (ptr::null_mut(), 0);
    }
    let len = items.len() as u32;
    let mut boxed = items.into_boxed_slice();
    let ptr = boxed.as_mut_ptr();
    std::mem::forget(boxed);
    (ptr, len)
}

/// Reclaim a slice handed out by `into_raw_parts`.
pub(crate) fn from_raw_parts<T>(ptr: *mut T, len: u32) -> Vec<T> {
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    let slice = ptr::slice_from_raw_parts_mut(ptr, len as usize);
    unsafe { Box::from_raw(slice) }.into_vec()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
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
/// Built by `bookshelf_build_*` functions. The C caller executes the request
/// and passes the response back through `bookshelf_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let headers: Vec<FfiHeader> = req
            .headers
            .into_iter()
            .map(|(k, v)| FfiHeader {
                key: c_string(k),
                value: c_string(v),
            })
            .collect();
        let (headers, headers_len) = into_raw_parts(headers);

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path: c_string(req.path),
            headers,
            headers_len,
            body: c_string_opt(req.body),
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing an HTTP request,
/// then passes a pointer to a `bookshelf_parse_*` function. The FFI layer
/// reads but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiBookResult`.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Network = 1,
    Server = 2,
    InvalidResponse = 3,
    InvalidId = 4,
    Validation = 5,
    Deserialization = 6,
    Serialization = 7,
    Storage = 8,
    Panic = 9,
    NullArg = 10,
}

/// Tag that tells `bookshelf_free_result` what `FfiBookResult::data` points to.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    Book = 1,
    BookList = 2,
    Profile = 3,
    /// `data` is a `char*` holding the session token.
    Token = 4,
    /// `data` is a `char*` holding the response payload as JSON text.
    Json = 5,
}

/// A single book exposed to C. `cover_image` may be null;
/// `published_year` is meaningful only when `has_published_year` is set.
#[repr(C)]
pub struct FfiBook {
    pub id: *mut c_char,
    pub title: *mut c_char,
    pub author: *mut c_char,
    pub description: *mut c_char,
    pub genre: *mut c_char,
    pub cover_image: *mut c_char,
    pub published_year: i32,
    pub has_published_year: bool,
}

impl FfiBook {
    fn from_core(book: Book) -> Self {
        FfiBook {
            id: c_string(book.id.to_string()),
            title: c_string(book.title),
            author: c_string(book.author),
            description: c_string(book.description),
            genre: c_string(book.genre),
            cover_image: c_string_opt(book.cover_image),
            published_year: book.published_year.unwrap_or(0),
            has_published_year: book.published_year.is_some(),
        }
    }

    /// Free the C-string fields (but not the struct itself).
    pub(crate) fn free_fields(&self) {
        for s in [
            self.id,
            self.title,
            self.author,
            self.description,
            self.genre,
            self.cover_image,
        ] {
            drop_c_string(s);
        }
    }
}

/// A list of books exposed to C.
#[repr(C)]
pub struct FfiBookList {
    pub items: *mut FfiBook,
    pub len: u32,
}

/// The signed-in user's profile exposed to C.
#[repr(C)]
pub struct FfiProfile {
    pub username: *mut c_char,
    pub email: *mut c_char,
    pub name: *mut c_char,
}

impl FfiProfile {
    pub(crate) fn free_fields(&self) {
        for s in [self.username, self.email, self.name] {
            drop_c_string(s);
        }
    }
}

/// Result envelope for all parse operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the parsed payload (tagged by `data_tag`). Create and update
/// also set `message` to the confirmation text to show the user.
/// On failure `error_code` describes the category, `error_message` is the
/// text to show the user, `http_status` is set for `Server`, and `data` is
/// null. A `Server` failure also keeps the parts of the error body:
/// `server_message` is its top-level `message` and `error_fields` is a JSON
/// object of per-field messages. Either is null when the body has none.
#[repr(C)]
pub struct FfiBookResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
    pub message: *mut c_char,
    pub server_message: *mut c_char,
    pub error_fields: *mut c_char,
}

impl FfiBookResult {
    fn ok(data_tag: FfiDataTag, data: *mut c_void, message: Option<String>) -> *mut Self {
        Box::into_raw(Box::new(FfiBookResult {
            error_code: FfiErrorCode::Ok,
            error_message: ptr::null_mut(),
            http_status: 0,
            data_tag,
            data,
            message: c_string_opt(message),
            server_message: ptr::null_mut(),
            error_fields: ptr::null_mut(),
        }))
    }

    fn failure(error_code: FfiErrorCode, http_status: u16, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiBookResult {
            error_code,
            error_message: c_string(msg),
            http_status,
            data_tag: FfiDataTag::None,
            data: ptr::null_mut(),
            message: ptr::null_mut(),
            server_message: ptr::null_mut(),
            error_fields: ptr::null_mut(),
        }))
    }

    /// Build a success result carrying a single `FfiBook`.
    pub(crate) fn ok_book(book: Book, message: Option<String>) -> *mut Self {
        let ffi_book = Box::new(FfiBook::from_core(book));
        Self::ok(FfiDataTag::Book, Box::into_raw(ffi_book) as *mut c_void, message)
    }

    /// Build a success result carrying an `FfiBookList`.
    pub(crate) fn ok_book_list(books: Vec<Book>) -> *mut Self {
        let items: Vec<FfiBook> = books.into_iter().map(FfiBook::from_core).collect();
        let (items, len) = into_raw_parts(items);
        let list = Box::new(FfiBookList { items, len });
        Self::ok(FfiDataTag::BookList, Box::into_raw(list) as *mut c_void, None)
    }

    pub(crate) fn ok_profile(profile: UserProfile) -> *mut Self {
        let ffi_profile = Box::new(FfiProfile {
            username: c_string(profile.username),
            email: c_string(profile.email),
            name: c_string(profile.name),
        });
        Self::ok(FfiDataTag::Profile, Box::into_raw(ffi_profile) as *mut c_void, None)
    }

    pub(crate) fn ok_token(token: String) -> *mut Self {
        Self::ok(FfiDataTag::Token, c_string(token) as *mut c_void, None)
    }

    /// Success with the raw payload as JSON text; a `null` payload carries no
    /// data at all.
    pub(crate) fn ok_json(value: serde_json::Value) -> *mut Self {
        if value.is_null() {
            return Self::ok(FfiDataTag::None, ptr::null_mut(), None);
        }
        Self::ok(FfiDataTag::Json, c_string(value.to_string()) as *mut c_void, None)
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let code = match &err {
            ApiError::Network => FfiErrorCode::Network,
            ApiError::Server(_) => FfiErrorCode::Server,
            ApiError::InvalidResponse => FfiErrorCode::InvalidResponse,
            ApiError::InvalidBookId(_) => FfiErrorCode::InvalidId,
            ApiError::Validation(_) => FfiErrorCode::Validation,
            ApiError::Deserialization(_) => FfiErrorCode::Deserialization,
            ApiError::Serialization(_) => FfiErrorCode::Serialization,
            ApiError::Storage(_) => FfiErrorCode::Storage,
        };
        let mut result = FfiBookResult {
            error_code: code,
            error_message: c_string(err.to_string()),
            http_status: err.status().unwrap_or(0),
            data_tag: FfiDataTag::None,
            data: ptr::null_mut(),
            message: ptr::null_mut(),
            server_message: ptr::null_mut(),
            error_fields: ptr::null_mut(),
        };
        if let ApiError::Server(server) = err {
            result.server_message = c_string_opt(server.message);
            if !server.field_errors.is_empty() {
                let fields = serde_json::to_string(&server.field_errors).unwrap_or_default();
                result.error_fields = c_string(fields);
            }
        }
        Box::into_raw(Box::new(result))
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, 0, format!("null argument: {name}"))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, 0, msg.to_string())
    }
}
