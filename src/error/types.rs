//! Core error types

use reqwest::header::HeaderMap;
use thiserror::Error;

/// Coarse classification of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Discovery document or directory listing unavailable.
    Discovery,
    /// Caller-supplied input was rejected before dispatch.
    Validation,
    /// The requested operation path does not exist.
    Resolution,
    /// The server answered with a 4xx status.
    Client,
    /// The server answered with a 5xx status.
    Server,
    /// No response was received (connectivity or timeout).
    Network,
    /// The request could not be built.
    Construction,
    /// The call was cancelled by the caller.
    Cancelled,
    /// Configuration or internal failures.
    Internal,
}

/// Failure of a single outbound API request.
#[derive(Error, Debug, Clone)]
pub enum RequestError {
    /// The server responded with a non-2xx status.
    #[error("server responded with status {status}: {body}")]
    Response {
        status: u16,
        /// Decoded error body (JSON when possible, otherwise a string).
        body: serde_json::Value,
        headers: HeaderMap,
    },

    /// The request was sent but no response arrived.
    #[error("no response for {request}: {cause}")]
    NoResponse {
        /// `METHOD url` of the request that went unanswered.
        request: String,
        cause: String,
        timed_out: bool,
    },

    /// The request could not be constructed or sent.
    #[error("request could not be constructed: {cause}")]
    Construction { cause: String },
}

impl RequestError {
    /// Short kind label: `response-error`, `no-response` or `request-error`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Response { .. } => "response-error",
            Self::NoResponse { .. } => "no-response",
            Self::Construction { .. } => "request-error",
        }
    }

    /// HTTP status when the server responded.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Response { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Response { status, .. } => {
                matches!(*status, 408 | 429) || (500..600).contains(status)
            }
            Self::NoResponse { .. } => true,
            Self::Construction { .. } => false,
        }
    }
}

/// Errors produced by the dynamic client.
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    /// Discovery document or directory listing could not be retrieved or parsed.
    #[error("failed to fetch discovery document for '{api}': {cause}")]
    DiscoveryFetch { api: String, cause: String },

    /// Caller parameters failed required/type/bound checks. The request was not sent.
    #[error("invalid parameters for {method_id}: {}", .violations.join("; "))]
    Validation {
        method_id: String,
        violations: Vec<String>,
    },

    /// No compiled operation exists at the requested path.
    #[error("operation '{path}' is not available")]
    UnknownOperation { path: String },

    /// The outbound HTTP request failed.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The response body does not match the declared response schema.
    #[error("response of {method_id} does not match its schema: {}", .violations.join("; "))]
    InvalidResponse {
        method_id: String,
        violations: Vec<String>,
    },

    /// The call was cancelled before a response arrived.
    #[error("call to '{operation}' was cancelled")]
    Cancelled { operation: String },

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal invariant violated (e.g. a poisoned lock).
    #[error("internal error: {0}")]
    Internal(String),
}
