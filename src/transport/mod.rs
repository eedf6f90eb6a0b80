//! Transport Layer
//!
//! The client never talks to reqwest directly. Discovery fetches and API calls
//! go through an [`HttpTransport`], so tests and hosts can inject their own.

pub mod http_client;

pub use http_client::ReqwestTransport;

use reqwest::Method;
use reqwest::header::HeaderMap;
use std::time::Duration;
use thiserror::Error;

use crate::error::RequestError;

/// A fully resolved outbound request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL without query string.
    pub url: String,
    /// Query pairs, already serialized to strings.
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
    /// Per-request timeout overriding the transport default.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// A GET request with no query, headers or body.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        }
    }

    /// Append a query pair.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Value of the first query pair named `key`.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// `METHOD url`, used in error and log messages.
    pub fn describe(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}

/// Raw response as received from the wire.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body: JSON when it parses, a string otherwise, `null` when empty.
    pub fn decoded_body(&self) -> serde_json::Value {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return serde_json::Value::Null;
        }
        serde_json::from_slice(&self.body).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&self.body).into_owned())
        })
    }
}

/// Transport-level failure (no HTTP status available).
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    /// The request could not be built or handed to the network.
    #[error("{0}")]
    Construction(String),
    /// The request went out but no (complete) response came back.
    #[error("{cause}")]
    NoResponse { cause: String, timed_out: bool },
}

impl TransportError {
    /// Attach the request description (`METHOD url`) and lift into the public error shape.
    pub fn into_request_error(self, request: String) -> RequestError {
        match self {
            Self::Construction(cause) => RequestError::Construction { cause },
            Self::NoResponse { cause, timed_out } => RequestError::NoResponse {
                request,
                cause,
                timed_out,
            },
        }
    }
}

/// HTTP client capability used by the discovery cache and the request executor.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}
