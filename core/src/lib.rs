//! Client core for the book-tracking service.
//!
//! # Overview
//! Two layers talk to the REST API. `BookClient` builds `HttpRequest` values
//! and parses `HttpResponse` values without touching the network
//! (host-does-IO pattern), which is what the FFI crate exposes to native
//! hosts. `ApiClient` wraps it with a `Transport` and a `CredentialProvider`
//! for Rust callers, attaching the stored session token to every request.
//! Screen controllers in `screens` sit on top and hold per-screen view state.
//!
//! # Design
//! - `BookClient` is stateless; it holds only `base_url`.
//! - The token is read from the injected `CredentialProvider` (normally a
//!   `TokenStore`) at send time, never threaded through call sites.
//! - Errors keep the server's structure (`ServerError`); flattening to one
//!   display string is left to presentation code.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod screens;
pub mod token;
pub mod transport;
pub mod types;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use api::ApiClient;
pub use client::BookClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, ServerError, StorageError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use token::{CredentialProvider, FileStorage, KeyValueStorage, MemoryStorage, TokenStore};
pub use transport::{ReqwestTransport, Transport};
pub use types::{
    AuthToken, Book, BookId, BookInput, BookMutation, LoginRequest, RegisterRequest, UserProfile,
};
pub use validation::{BookDraft, ValidationError};
