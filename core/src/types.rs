//! Domain DTOs for the book-tracking API.
//!
//! # Design
//! These types mirror the backend's JSON schema but are defined independently
//! from the mock-server crate; integration tests catch schema drift. Book ids
//! are server-assigned strings (`_id` on the wire) and are wrapped in `BookId`
//! so a malformed id is rejected before it can be spliced into a URL path.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Server-assigned identifier of a book.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BookId(String);

impl BookId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for BookId {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = !matches!(s, "" | "." | "..")
            && !s
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '%'));
        if valid {
            Ok(BookId(s.to_string()))
        } else {
            Err(ApiError::InvalidBookId(s.to_string()))
        }
    }
}

impl TryFrom<String> for BookId {
    type Error = ApiError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<BookId> for String {
    fn from(id: BookId) -> Self {
        id.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single book returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(rename = "_id", alias = "id")]
    pub id: BookId,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
}

/// Request payload for creating or replacing a book.
///
/// Produced by `BookDraft::validate`, which trims every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub description: String,
    pub genre: String,
}

/// Outcome of a successful create or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookMutation {
    pub success: bool,
    pub data: Book,
    pub message: String,
}

/// The authenticated user's identity. Read-only from the client's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
}

/// Opaque bearer credential issued at login.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        AuthToken(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Login request body. The username is trimmed; the password is sent as typed.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.trim().to_string(),
            password: password.to_string(),
        }
    }
}

/// Registration request body.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    pub name: String,
}

impl RegisterRequest {
    /// Normalize the form values: username and name trimmed, email trimmed and
    /// lowercased. An empty `name` falls back to the username.
    pub fn new(username: &str, password: &str, email: &str, name: Option<&str>) -> Self {
        let username = username.trim().to_string();
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| username.clone());
        Self {
            username,
            password: password.to_string(),
            email: email.trim().to_lowercase(),
            name,
        }
    }
}
