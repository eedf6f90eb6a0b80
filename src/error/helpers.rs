//! Classification helpers for [`ApiError`].

use super::types::{ApiError, ErrorCategory, RequestError};

impl ApiError {
    /// Build a discovery failure for `api` from any displayable cause.
    pub fn discovery(api: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::DiscoveryFetch {
            api: api.into(),
            cause: cause.to_string(),
        }
    }

    /// HTTP status of a server error response, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Request(err) => err.status(),
            _ => None,
        }
    }

    /// Coarse category used for presentation and retry decisions.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DiscoveryFetch { .. } => ErrorCategory::Discovery,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::UnknownOperation { .. } => ErrorCategory::Resolution,
            Self::Request(RequestError::Response { status, .. }) if *status >= 500 => {
                ErrorCategory::Server
            }
            Self::Request(RequestError::Response { .. }) => ErrorCategory::Client,
            Self::Request(RequestError::NoResponse { .. }) => ErrorCategory::Network,
            Self::Request(RequestError::Construction { .. }) => ErrorCategory::Construction,
            Self::InvalidResponse { .. } => ErrorCategory::Validation,
            Self::Cancelled { .. } => ErrorCategory::Cancelled,
            Self::Configuration(_) | Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Whether the caller may reasonably retry the same call.
    ///
    /// Discovery failures are retryable because failed fetches are never cached.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(err) => err.is_retryable(),
            Self::DiscoveryFetch { .. } => true,
            _ => false,
        }
    }

    /// Constraint violations carried by validation failures.
    pub fn violations(&self) -> &[String] {
        match self {
            Self::Validation { violations, .. } | Self::InvalidResponse { violations, .. } => {
                violations
            }
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderMap;
    use serde_json::json;

    fn response_error(status: u16) -> ApiError {
        ApiError::Request(RequestError::Response {
            status,
            body: json!({"error": "boom"}),
            headers: HeaderMap::new(),
        })
    }

    #[test]
    fn server_errors_are_retryable() {
        let err = response_error(503);
        assert_eq!(err.category(), ErrorCategory::Server);
        assert_eq!(err.status_code(), Some(503));
        assert!(err.is_retryable());
    }

    #[test]
    fn client_errors_are_not_retryable_except_rate_limits() {
        assert!(!response_error(404).is_retryable());
        assert_eq!(response_error(404).category(), ErrorCategory::Client);
        assert!(response_error(429).is_retryable());
    }

    #[test]
    fn request_error_kinds() {
        let no_response = RequestError::NoResponse {
            request: "GET http://localhost/x".into(),
            cause: "timed out".into(),
            timed_out: true,
        };
        assert_eq!(no_response.kind(), "no-response");
        assert!(no_response.is_retryable());

        let construction = RequestError::Construction {
            cause: "bad url".into(),
        };
        assert_eq!(construction.kind(), "request-error");
        assert!(!construction.is_retryable());
    }

    #[test]
    fn validation_error_lists_violations() {
        let err = ApiError::Validation {
            method_id: "youtube.videos.list".into(),
            violations: vec!["\"id\" is a required property".into()],
        };
        assert_eq!(err.violations().len(), 1);
        assert!(err.to_string().contains("youtube.videos.list"));
        assert!(!err.is_retryable());
    }
}
