//! Request Executor
//!
//! Turns a compiled method template plus validated parameters into one HTTP
//! exchange: path placeholders are expanded, the remaining parameters become
//! the query string, the API key is attached, and the response is normalized
//! into either the decoded body or a [`RequestError`].
//!
//! Nothing is retried here. Callers decide with [`ApiError::is_retryable`].

pub mod query;
pub mod template;

pub use query::serialize_params;
pub use template::{expand, placeholders};

use reqwest::Method;
use reqwest::header::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ApiError, RequestError, Result};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};
use crate::utils::{CancelHandle, HttpInterceptor, HttpRequestContext};

/// Query parameter carrying the API key.
pub const API_KEY_PARAM: &str = "key";

/// Precomputed request shape of one discovery method.
#[derive(Debug, Clone)]
pub struct RequestTemplate {
    /// Method id, e.g. `youtube.playlistItems.list`.
    pub method_id: String,
    pub http_method: Method,
    /// Absolute URL with `{name}` / `{+name}` placeholders.
    pub url_template: String,
}

impl RequestTemplate {
    pub fn new(
        method_id: impl Into<String>,
        http_method: &str,
        url_template: impl Into<String>,
    ) -> Result<Self> {
        let method_id = method_id.into();
        let http_method = Method::from_bytes(http_method.to_ascii_uppercase().as_bytes())
            .map_err(|e| {
                ApiError::Configuration(format!(
                    "Invalid HTTP method '{http_method}' for {method_id}: {e}"
                ))
            })?;
        Ok(Self {
            method_id,
            http_method,
            url_template: url_template.into(),
        })
    }
}

/// Per-call knobs.
///
/// Both apply to the HTTP exchange only. A call still waiting for the
/// discovery fetch or tree build is not bounded by `timeout` and does not
/// observe `cancel`; the discovery transport's own timeout covers that phase.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Overrides the client's default timeout for this call.
    pub timeout: Option<Duration>,
    pub cancel: Option<CancelHandle>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Sends requests for compiled operations over an [`HttpTransport`].
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn HttpTransport>,
    api_key: Option<SecretString>,
    interceptors: Vec<Arc<dyn HttpInterceptor>>,
    default_timeout: Option<Duration>,
}

impl RequestExecutor {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            api_key: None,
            interceptors: Vec::new(),
            default_timeout: None,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<SecretString>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_interceptors(mut self, interceptors: Vec<Arc<dyn HttpInterceptor>>) -> Self {
        self.interceptors = interceptors;
        self
    }

    pub fn with_default_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Build the outbound request without sending it.
    pub fn prepare(
        &self,
        template: &RequestTemplate,
        mut params: Map<String, Value>,
        body: Option<Value>,
        timeout: Option<Duration>,
    ) -> Result<HttpRequest> {
        let url = expand(&template.url_template, &mut params).map_err(|name| {
            RequestError::Construction {
                cause: format!(
                    "missing value for path parameter '{name}' of {}",
                    template.method_id
                ),
            }
        })?;

        if let Some(key) = &self.api_key
            && params.get(API_KEY_PARAM).is_none_or(Value::is_null)
        {
            params.insert(
                API_KEY_PARAM.to_string(),
                Value::String(key.expose_secret().to_string()),
            );
        }

        Ok(HttpRequest {
            method: template.http_method.clone(),
            url,
            query: serialize_params(&params),
            headers: HeaderMap::new(),
            body,
            timeout,
        })
    }

    /// Perform the call and return the decoded response body.
    pub async fn execute(
        &self,
        template: &RequestTemplate,
        params: Map<String, Value>,
        body: Option<Value>,
        options: &CallOptions,
    ) -> Result<Value> {
        let timeout = options.timeout.or(self.default_timeout);
        let mut request = self.prepare(template, params, body, timeout)?;
        let ctx = HttpRequestContext {
            operation: template.method_id.clone(),
            url: request.url.clone(),
        };
        for interceptor in &self.interceptors {
            request = interceptor.on_before_send(&ctx, request)?;
        }

        let description = request.describe();
        tracing::debug!(target: "dynapi::http", operation=%ctx.operation, request=%description, "sending");

        let exchange = self.exchange(request, timeout, description);
        let outcome = match &options.cancel {
            Some(cancel) => tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(ApiError::Cancelled {
                    operation: ctx.operation.clone(),
                }),
                outcome = exchange => outcome,
            },
            None => exchange.await,
        };

        let result = outcome.and_then(|response| {
            for interceptor in &self.interceptors {
                interceptor.on_response(&ctx, &response);
            }
            normalize(response)
        });

        if let Err(err) = &result {
            tracing::debug!(target: "dynapi::http", operation=%ctx.operation, kind=?err.category(), "call failed");
            for interceptor in &self.interceptors {
                interceptor.on_error(&ctx, err);
            }
        }
        result
    }

    async fn exchange(
        &self,
        request: HttpRequest,
        timeout: Option<Duration>,
        description: String,
    ) -> Result<HttpResponse> {
        let send = self.transport.send(request);
        let result = match timeout {
            Some(limit) => match tokio::time::timeout(limit, send).await {
                Ok(result) => result,
                Err(_) => Err(TransportError::NoResponse {
                    cause: format!("timed out after {limit:?}"),
                    timed_out: true,
                }),
            },
            None => send.await,
        };
        result.map_err(|e| ApiError::Request(e.into_request_error(description)))
    }
}

fn normalize(response: HttpResponse) -> Result<Value> {
    let body = response.decoded_body();
    if response.is_success() {
        return Ok(body);
    }
    Err(ApiError::Request(RequestError::Response {
        status: response.status,
        body,
        headers: response.headers,
    }))
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("has_api_key", &self.api_key.is_some())
            .field("interceptors", &self.interceptors.len())
            .field("default_timeout", &self.default_timeout)
            .finish_non_exhaustive()
    }
}
