//! Error types for the BambooHR client.
//!
//! # Design
//! Every failure is surfaced to the caller as one `ApiError`; nothing is
//! retried. Configuration and validation errors are raised before any
//! request is built, so a caller can tell "we never talked to the server"
//! apart from `Http`/`Transport` failures that happened on the wire.
//! `NotFound` keeps its own variant because callers frequently branch on it.

use thiserror::Error;

/// Errors returned by the builder, the parser, the transport and the facade.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing subdomain or API key, or an otherwise unusable configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Input rejected before any network call (unknown field, bad format).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body did not have the expected XML shape or dates.
    #[error("unexpected response format: {0}")]
    Format(String),

    /// The response body could not be deserialized from JSON.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Reading an upload or writing a report to disk failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// True for errors raised before a request was sent.
    pub fn is_local(&self) -> bool {
        matches!(self, ApiError::Config(_) | ApiError::Validation(_) | ApiError::Serialization(_))
    }
}
