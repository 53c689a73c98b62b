//! C-ABI wrapper around `bookshelf-core`.
//!
//! # Overview
//! Exposes the book-tracking API through `extern "C"` functions so a native
//! mobile host can build and parse HTTP requests/responses with its own
//! networking stack, without linking to Rust's async runtime.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Per-operation `build_*` / `parse_*` mirrors the core API 1:1.
//! - The client handle holds the session token; every built request carries
//!   `authorization: Bearer <token>` while one is set. Persisting the token
//!   across launches is the host's job.
//! - A single `FfiBookResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `bookshelf_free_*` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;

use bookshelf_core::validation::{validate_login, validate_registration};
use bookshelf_core::{ApiError, BookClient, BookDraft, BookId, HttpRequest, HttpResponse};

use types::*;

/// Borrow a C string argument. Null reads as `None`; invalid UTF-8 reads as
/// an empty string.
fn read_str<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(s) }.to_str().unwrap_or(""))
}

fn read_id(id: *const c_char) -> Option<BookId> {
    read_str(id)?.parse().ok()
}

fn draft_from(
    title: *const c_char,
    author: *const c_char,
    description: *const c_char,
    genre: *const c_char,
) -> BookDraft {
    let field = |s| read_str(s).unwrap_or_default().to_string();
    BookDraft {
        title: field(title),
        author: field(author),
        description: field(description),
        genre: field(genre),
    }
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new client bound to `base_url`, with no session token.
///
/// Returns null if `base_url` is null or if an internal panic occurs.
/// The caller must free the returned pointer with `bookshelf_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn bookshelf_client_new(base_url: *const c_char) -> *mut FfiBookClient {
    catch_unwind(|| match read_str(base_url) {
        Some(url) => Box::into_raw(Box::new(FfiBookClient::new(url))),
        None => ptr::null_mut(),
    })
    .unwrap_or(ptr::null_mut())
}

/// Free a client created by `bookshelf_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn bookshelf_client_free(client: *mut FfiBookClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

/// Store the session token attached to every subsequently built request.
///
/// A null or empty `token` clears it. Returns `true` when a token is now set.
#[unsafe(no_mangle)]
pub extern "C" fn bookshelf_client_set_token(
    client: *mut FfiBookClient,
    token: *const c_char,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return false;
        }
        let client = unsafe { &mut *client };
        client.token = read_str(token)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        client.token.is_some()
    }))
    .unwrap_or(false)
}

/// Forget the session token. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn bookshelf_client_clear_token(client: *mut FfiBookClient) {
    if client.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        unsafe { &mut *client }.token = None;
    }));
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Run `f` against the client and hand the authorized request to C.
fn build(
    client: *const FfiBookClient,
    f: impl FnOnce(&BookClient) -> Option<HttpRequest>,
) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return ptr::null_mut();
        }
        let client = unsafe { &*client };
        match f(&client.inner) {
            Some(req) => FfiHttpRequest::from_core(client.authorize(req)),
            None => ptr::null_mut(),
        }
    }))
    .unwrap_or(ptr::null_mut())
}

/// Build a login request. The username is trimmed.
///
/// Returns null if any argument is null or the username or password is empty.
/// The caller must free the returned pointer with `bookshelf_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn bookshelf_build_login(
    client: *const FfiBookClient,
    username: *const c_char,
    password: *const c_char,
) -> *mut FfiHttpRequest {
    build(client, |c| {
        let input = validate_login(read_str(username)?, read_str(password)?).ok()?;
        c.build_login(&input).ok()
    })
}

/// Build a registration request. `name` may be null; the username is used
/// in its place.
///
/// Returns null if a required argument is null or empty.
#[unsafe(no_mangle)]
pub extern "C" fn bookshelf_build_register(
    client: *const FfiBookClient,
    username: *const c_char,
    password: *const c_char,
    email: *const c_char,
    name: *const c_char,
) -> *mut FfiHttpRequest {
    build(client, |c| {
        let input = validate_registration(
            read_str(username)?,
            read_str(password)?,
            read_str(email)?,
            read_str(name),
        )
        .ok()?;
        c.build_register(&input).ok()
    })
}

/// Build a request for the signed-in user's profile.
#[unsafe(no_mangle)]
pub extern "C" fn bookshelf_build_fetch_user_profile(
    client: *const FfiBookClient,
) -> *mut FfiHttpRequest {
    build(client, |c| Some(c.build_fetch_user_profile()))
}

/// Build a request for the full book list.
#[unsafe(no_mangle)]
pub extern "C" fn bookshelf_build_get_all_books(
    client: *const FfiBookClient,
) -> *mut FfiHttpRequest {
    build(client, |c| Some(c.build_get_all_books()))
}

/// Build a request for one book.
///
/// Returns null if `id` is null or not usable as a path segment.
#[unsafe(no_mangle)]
pub extern "C" fn bookshelf_build_get_book(
    client: *const FfiBookClient,
    id: *const c_char,
) -> *mut FfiHttpRequest {
    build(client, |c| Some(c.build_get_book(&read_id(id)?)))
}

/// Build a create request from the raw form fields. Fields are trimmed.
///
/// Returns null if the fields fail validation; `bookshelf_validate_book`
/// gives the reason.
#[unsafe(no_mangle)]
pub extern "C" fn bookshelf_build_create_book(
    client: *const FfiBookClient,
    title: *const c_char,
    author: *const c_char,
    description: *const c_char,
    genre: *const c_char,
) -> *mut FfiHttpRequest {
    build(client, |c| {
        let input = draft_from(title, author, description, genre).validate().ok()?;
        c.build_create_book(&input).ok()
    })
}

/// Build a full-replacement update request for book `id`.
///
/// Returns null if `id` is invalid or the fields fail validation.
#[unsafe(no_mangle)]
pub extern "C" fn bookshelf_build_update_book(
    client: *const FfiBookClient,
    id: *const c_char,
    title: *const c_char,
    author: *const c_char,
    description: *const c_char,
    genre: *const c_char,
) -> *mut FfiHttpRequest {
    build(client, |c| {
        let id = read_id(id)?;
        let input = draft_from(title, author, description, genre).validate().ok()?;
        c.build_update_book(&id, &input).ok()
    })
}

/// Build a delete request for book `id`.
#[unsafe(no_mangle)]
pub extern "C" fn bookshelf_build_delete_book(
    client: *const FfiBookClient,
    id: *const c_char,
) -> *mut FfiHttpRequest {
    build(client, |c| Some(c.build_delete_book(&read_id(id)?)))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check book form fields the same way `bookshelf_build_create_book` does.
///
/// Returns null when the fields are valid, otherwise the message to show.
/// The caller must free a non-null result with `bookshelf_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn bookshelf_validate_book(
    title: *const c_char,
    author: *const c_char,
    description: *const c_char,
    genre: *const c_char,
) -> *mut c_char {
    catch_unwind(|| match draft_from(title, author, description, genre).validate() {
        Ok(_) => ptr::null_mut(),
        Err(err) => c_string(err.to_string()),
    })
    .unwrap_or(ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body reads
/// as empty.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    HttpResponse {
        status: resp.status,
        headers: Vec::new(),
        body: read_str(resp.body).unwrap_or_default().to_string(),
    }
}

/// Shared null checks, panic guard and error mapping for every parser.
fn parse<T>(
    client: *const FfiBookClient,
    response: *const FfiHttpResponse,
    op: &str,
    parse_fn: impl FnOnce(&BookClient, HttpResponse) -> Result<T, ApiError>,
    ok: impl FnOnce(T) -> *mut FfiBookResult,
) -> *mut FfiBookResult {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiBookResult::null_arg("client");
        }
        if response.is_null() {
            return FfiBookResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = ffi_response_to_core(unsafe { &*response });
        match parse_fn(&client.inner, resp) {
            Ok(value) => ok(value),
            Err(e) => FfiBookResult::from_error(e),
        }
    }))
    .unwrap_or_else(|_| FfiBookResult::panic(&format!("panic in bookshelf_parse_{op}")))
}

/// Parse a login response. `data_tag = Token` on success; pass the token to
/// `bookshelf_client_set_token`.
#[unsafe(no_mangle)]
pub extern "C" fn bookshelf_parse_login(
    client: *const FfiBookClient,
    response: *const FfiHttpResponse,
) -> *mut FfiBookResult {
    parse(client, response, "login", BookClient::parse_login, |token| {
        FfiBookResult::ok_token(token.into_inner())
    })
}

/// Parse a registration response. `data_tag = Json` (or `None` for an empty
/// body) on success.
#[unsafe(no_mangle)]
pub extern "C" fn bookshelf_parse_register(
    client: *const FfiBookClient,
    response: *const FfiHttpResponse,
) -> *mut FfiBookResult {
    parse(
        client,
        response,
        "register",
        BookClient::parse_register,
        FfiBookResult::ok_json,
    )
}

/// Parse a profile response. `data_tag = Profile` on success.
#[unsafe(no_mangle)]
pub extern "C" fn bookshelf_parse_user_profile(
    client: *const FfiBookClient,
    response: *const FfiHttpResponse,
) -> *mut FfiBookResult {
    parse(
        client,
        response,
        "user_profile",
        BookClient::parse_user_profile,
        FfiBookResult::ok_profile,
    )
}

/// Parse a book list response. `data_tag = BookList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn bookshelf_parse_get_all_books(
    client: *const FfiBookClient,
    response: *const FfiHttpResponse,
) -> *mut FfiBookResult {
    parse(
        client,
        response,
        "get_all_books",
        BookClient::parse_get_all_books,
        FfiBookResult::ok_book_list,
    )
}

/// Parse a single-book response. `data_tag = Book` on success.
#[unsafe(no_mangle)]
pub extern "C" fn bookshelf_parse_get_book(
    client: *const FfiBookClient,
    response: *const FfiHttpResponse,
) -> *mut FfiBookResult {
    parse(client, response, "get_book", BookClient::parse_get_book, |book| {
        FfiBookResult::ok_book(book, None)
    })
}

/// Parse a create response. `data_tag = Book` and `message` set on success.
#[unsafe(no_mangle)]
pub extern "C" fn bookshelf_parse_create_book(
    client: *const FfiBookClient,
    response: *const FfiHttpResponse,
) -> *mut FfiBookResult {
    parse(
        client,
        response,
        "create_book",
        BookClient::parse_create_book,
        |m| FfiBookResult::ok_book(m.data, Some(m.message)),
    )
}

/// Parse an update response. `data_tag = Book` and `message` set on success.
#[unsafe(no_mangle)]
pub extern "C" fn bookshelf_parse_update_book(
    client: *const FfiBookClient,
    response: *const FfiHttpResponse,
) -> *mut FfiBookResult {
    parse(
        client,
        response,
        "update_book",
        BookClient::parse_update_book,
        |m| FfiBookResult::ok_book(m.data, Some(m.message)),
    )
}

/// Parse a delete response. `data_tag = Json`, or `None` for an empty body.
#[unsafe(no_mangle)]
pub extern "C" fn bookshelf_parse_delete_book(
    client: *const FfiBookClient,
    response: *const FfiHttpResponse,
) -> *mut FfiBookResult {
    parse(
        client,
        response,
        "delete_book",
        BookClient::parse_delete_book,
        FfiBookResult::ok_json,
    )
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `bookshelf_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn bookshelf_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        drop_c_string(req.path);
        drop_c_string(req.body);
        for h in from_raw_parts(req.headers, req.headers_len) {
            drop_c_string(h.key);
            drop_c_string(h.value);
        }
    });
}

/// Free an `FfiBookResult` returned by any `bookshelf_parse_*` function.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn bookshelf_free_result(result: *mut FfiBookResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        drop_c_string(result.error_message);
        drop_c_string(result.message);
        drop_c_string(result.server_message);
        drop_c_string(result.error_fields);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::Book => {
                let book = unsafe { Box::from_raw(result.data as *mut FfiBook) };
                book.free_fields();
            }
            FfiDataTag::BookList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiBookList) };
                for item in from_raw_parts(list.items, list.len) {
                    item.free_fields();
                }
            }
            FfiDataTag::Profile => {
                let profile = unsafe { Box::from_raw(result.data as *mut FfiProfile) };
                profile.free_fields();
            }
            FfiDataTag::Token | FfiDataTag::Json => drop_c_string(result.data as *mut c_char),
            FfiDataTag::None => {}
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn bookshelf_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| drop_c_string(s));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
