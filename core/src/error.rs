//! Error types for the book API client.
//!
//! # Design
//! Failures keep their structure. A server-side rejection becomes a
//! `ServerError` holding the status, the top-level message, any list-shaped
//! details and any per-field messages, instead of being collapsed into one
//! string at the point of failure. Presentation code decides how to flatten
//! it (`ServerError::summary`, `ApiError::user_message`).
//!
//! Transport failures never carry the underlying cause to the caller: they
//! are logged where they happen and surface as `ApiError::Network`, whose
//! message is the fixed string `Network error`.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use crate::validation::ValidationError;

pub const NETWORK_ERROR: &str = "Network error";
pub const INVALID_RESPONSE: &str = "Invalid response format";

/// Errors returned by the API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response reached the client.
    #[error("Network error")]
    Network,

    /// The server answered with a non-2xx status.
    #[error("{}", .0.display_message())]
    Server(ServerError),

    /// A write succeeded at the HTTP level but carried no payload.
    #[error("Invalid response format")]
    InvalidResponse,

    /// A book id that cannot be used as a path segment.
    #[error("invalid book id: {0:?}")]
    InvalidBookId(String),

    /// Input rejected locally; no request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The token store could not be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// Flatten into a single line for an alert. A rejection with an empty
    /// body reads as `Network error`; `fallback` covers a body that says
    /// nothing usable.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Server(err) if err.body.is_none() => NETWORK_ERROR.to_string(),
            other => other.summary_or(fallback),
        }
    }

    /// Like `user_message`, but any rejection without a readable summary,
    /// empty body included, reads as `fallback`.
    pub fn summary_or(&self, fallback: &str) -> String {
        match self {
            ApiError::Network => NETWORK_ERROR.to_string(),
            ApiError::Server(err) => err.summary().unwrap_or_else(|| fallback.to_string()),
            ApiError::InvalidResponse => INVALID_RESPONSE.to_string(),
            ApiError::Validation(err) => err.to_string(),
            _ => fallback.to_string(),
        }
    }

    /// The server-side message for a single form field, if any.
    pub fn field_error(&self, field: &str) -> Option<&str> {
        match self {
            ApiError::Server(err) => err.field_errors.get(field).map(String::as_str),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server(err) => Some(err.status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// A rejection reported by the server, with its error body kept intact.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerError {
    pub status: u16,
    /// Top-level `message` of the error body.
    pub message: Option<String>,
    /// List-shaped errors (`"error": [..]`, `"errors": [..]`, or a bare string).
    pub details: Vec<String>,
    /// Object-shaped `errors`, keyed by form field name.
    pub field_errors: BTreeMap<String, String>,
    /// The parsed body, verbatim. `None` when the body was empty.
    pub body: Option<Value>,
}

impl ServerError {
    /// Interpret an error response body. Never fails: an unreadable body
    /// just yields an error with no message.
    pub fn from_response(status: u16, body: &str) -> Self {
        let mut err = ServerError {
            status,
            ..Default::default()
        };
        let text = body.trim();
        if text.is_empty() {
            return err;
        }
        let value = match serde_json::from_str::<Value>(text) {
            Ok(value) => value,
            Err(_) => {
                err.message = Some(text.to_string());
                err.body = Some(Value::String(text.to_string()));
                return err;
            }
        };

        match &value {
            Value::Object(map) => {
                err.message = map.get("message").and_then(Value::as_str).map(str::to_string);
                for key in ["error", "errors"] {
                    match map.get(key) {
                        Some(Value::Object(fields)) => {
                            for (field, msg) in fields {
                                err.field_errors.insert(field.clone(), flatten(msg));
                            }
                        }
                        Some(Value::Array(items)) => err.details.extend(items.iter().map(flatten)),
                        Some(Value::String(s)) => err.details.push(s.clone()),
                        _ => {}
                    }
                }
            }
            Value::String(s) => err.message = Some(s.clone()),
            _ => {}
        }
        err.body = Some(value);
        err
    }

    /// One display string: field messages joined with ", ", else details
    /// joined with ", ", else the top-level message.
    pub fn summary(&self) -> Option<String> {
        if !self.field_errors.is_empty() {
            let joined: Vec<&str> = self.field_errors.values().map(String::as_str).collect();
            return Some(joined.join(", "));
        }
        if !self.details.is_empty() {
            return Some(self.details.join(", "));
        }
        self.message.clone()
    }

    pub fn display_message(&self) -> String {
        self.summary().unwrap_or_else(|| NETWORK_ERROR.to_string())
    }
}

fn flatten(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(flatten).collect::<Vec<_>>().join(", "),
        Value::Object(map) => match map.get("message").or_else(|| map.get("msg")) {
            Some(inner) => flatten(inner),
            None => value.to_string(),
        },
        other => other.to_string(),
    }
}

/// Failures of the persistent key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage file is corrupt: {0}")]
    Corrupt(String),

    #[error("no storage location available")]
    NoLocation,
}

/// Failures of a `Transport` before any response arrived.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request could not be sent: {0}")]
    Send(String),

    #[error("response body could not be read: {0}")]
    Body(String),
}
