//! Error types for the user API client.
//!
//! # Design
//! Every failure the controller can surface funnels into `ApiError`. The
//! host never interprets status codes itself: it reports either a response
//! (any status) or a `TransportError` when the request never completed.
//! Field validation is local and lives in `validate`, not here.

use thiserror::Error;

/// Errors returned by `UserClient` build and parse methods.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status} {reason}")]
    HttpStatus { status: u16, reason: String },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// A list response matched neither the envelope nor the bare array shape.
    #[error("Unexpected response format from server")]
    MalformedResponse,

    /// A 2xx body could not be deserialized into the expected type.
    #[error("invalid response body: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Reported by the host when a request fails below HTTP: DNS, connect,
/// TLS, timeout, truncated body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        ApiError::Network(err.message)
    }
}
