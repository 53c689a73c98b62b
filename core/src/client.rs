//! Stateless HTTP request builder and response parser for the book API.
//!
//! # Design
//! `BookClient` holds only a `base_url` and carries no mutable state between
//! calls. Each remote operation is split into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip and attaches credentials
//! (`HttpRequest::authorize`), keeping this layer deterministic and free of
//! I/O dependencies.
//!
//! The backend wraps payloads as `{"success": .., "data": <payload>}`. Parsers
//! unwrap `data` when present and otherwise read the body as the payload.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, ServerError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, APPLICATION_JSON, CONTENT_TYPE};
use crate::types::{
    AuthToken, Book, BookId, BookInput, BookMutation, LoginRequest, RegisterRequest, UserProfile,
};

pub const BOOK_CREATED: &str = "Book created successfully";
pub const BOOK_UPDATED: &str = "Book updated successfully";

/// Synchronous, stateless client for the book API.
#[derive(Debug, Clone)]
pub struct BookClient {
    base_url: String,
}

impl BookClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_login(&self, input: &LoginRequest) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/api/auth/login", input)
    }

    pub fn build_register(&self, input: &RegisterRequest) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/api/auth/register", input)
    }

    pub fn build_fetch_user_profile(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/api/profile", None)
    }

    pub fn build_get_all_books(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/api/books", None)
    }

    pub fn build_get_book(&self, id: &BookId) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/api/books/{id}"), None)
    }

    pub fn build_create_book(&self, input: &BookInput) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/api/books", input)
    }

    pub fn build_update_book(&self, id: &BookId, input: &BookInput) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, &format!("/api/books/{id}"), input)
    }

    pub fn build_delete_book(&self, id: &BookId) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/api/books/{id}"), None)
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<AuthToken, ApiError> {
        #[derive(Deserialize)]
        struct TokenPayload {
            token: AuthToken,
        }
        let payload: TokenPayload = decode(required(payload(response)?)?)?;
        Ok(payload.token)
    }

    /// Registration returns whatever the server sent back, `null` if nothing.
    pub fn parse_register(&self, response: HttpResponse) -> Result<Value, ApiError> {
        raw_payload(response)
    }

    pub fn parse_user_profile(&self, response: HttpResponse) -> Result<UserProfile, ApiError> {
        decode(required(payload(response)?)?)
    }

    /// A missing list payload is read as an empty library.
    pub fn parse_get_all_books(&self, response: HttpResponse) -> Result<Vec<Book>, ApiError> {
        match payload(response)? {
            Value::Null => Ok(Vec::new()),
            value => decode(value),
        }
    }

    pub fn parse_get_book(&self, response: HttpResponse) -> Result<Book, ApiError> {
        decode(required(payload(response)?)?)
    }

    pub fn parse_create_book(&self, response: HttpResponse) -> Result<BookMutation, ApiError> {
        mutation(response, BOOK_CREATED)
    }

    pub fn parse_update_book(&self, response: HttpResponse) -> Result<BookMutation, ApiError> {
        mutation(response, BOOK_UPDATED)
    }

    pub fn parse_delete_book(&self, response: HttpResponse) -> Result<Value, ApiError> {
        raw_payload(response)
    }

    fn request(&self, method: HttpMethod, path: &str, body: Option<String>) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers: vec![(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())],
            body,
        }
    }

    fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        input: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.request(method, path, Some(body)))
    }
}

/// Map non-success status codes to `ApiError::Server`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Server(ServerError::from_response(
        response.status,
        &response.body,
    )))
}

/// The whole body as JSON; an empty body reads as `null`.
fn raw_payload(response: HttpResponse) -> Result<Value, ApiError> {
    check_status(&response)?;
    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// The `data` member of an envelope, or the whole body when there is none.
fn payload(response: HttpResponse) -> Result<Value, ApiError> {
    match raw_payload(response)? {
        Value::Object(mut map) if map.contains_key("data") => {
            Ok(map.remove("data").unwrap_or(Value::Null))
        }
        other => Ok(other),
    }
}

fn required(value: Value) -> Result<Value, ApiError> {
    if value.is_null() {
        return Err(ApiError::InvalidResponse);
    }
    Ok(value)
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn mutation(response: HttpResponse, message: &str) -> Result<BookMutation, ApiError> {
    let data = decode(required(payload(response)?)?)?;
    Ok(BookMutation {
        success: true,
        data,
        message: message.to_string(),
    })
}
