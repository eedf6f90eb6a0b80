//! HTTP Interceptor interfaces
//!
//! Interceptors can observe and tweak outbound requests before send, observe
//! responses, and be notified of errors. The hooks are best-effort and should
//! avoid expensive work.

use crate::error::ApiError;
use crate::transport::{HttpRequest, HttpResponse};

/// Context passed to interceptors describing the call.
#[derive(Clone, Debug)]
pub struct HttpRequestContext {
    /// Method id of the operation, e.g. `youtube.videos.list`.
    pub operation: String,
    pub url: String,
}

/// HTTP interceptor trait
pub trait HttpInterceptor: Send + Sync {
    /// Called before sending a request. Return the (possibly modified) request
    /// or an error to short-circuit the call.
    fn on_before_send(
        &self,
        _ctx: &HttpRequestContext,
        request: HttpRequest,
    ) -> Result<HttpRequest, ApiError> {
        Ok(request)
    }

    /// Called after a response is received (any status).
    fn on_response(&self, _ctx: &HttpRequestContext, _response: &HttpResponse) {}

    /// Called when the call fails after it was handed to the transport.
    fn on_error(&self, _ctx: &HttpRequestContext, _error: &ApiError) {}
}

/// A simple logging interceptor backed by `tracing` (no query values, no secrets).
#[derive(Clone, Default)]
pub struct LoggingInterceptor;

impl HttpInterceptor for LoggingInterceptor {
    fn on_before_send(
        &self,
        ctx: &HttpRequestContext,
        request: HttpRequest,
    ) -> Result<HttpRequest, ApiError> {
        tracing::debug!(target: "dynapi::http", operation=%ctx.operation, method=%request.method, url=%ctx.url, "sending request");
        Ok(request)
    }

    fn on_response(&self, ctx: &HttpRequestContext, response: &HttpResponse) {
        tracing::debug!(target: "dynapi::http", operation=%ctx.operation, url=%ctx.url, status=%response.status, "response received");
    }

    fn on_error(&self, ctx: &HttpRequestContext, error: &ApiError) {
        tracing::debug!(target: "dynapi::http", operation=%ctx.operation, url=%ctx.url, err=%error, "request error");
    }
}
