//! reqwest-backed transport
//!
//! Builds a `reqwest::Client` from [`HttpConfig`] and adapts it to [`HttpTransport`].

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use super::{HttpRequest, HttpResponse, HttpTransport, TransportError};
use crate::error::ApiError;
use crate::types::HttpConfig;

/// Default [`HttpTransport`] on top of a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Transport whose client carries the timeouts, proxy, user agent and
    /// default headers of `config`.
    pub fn new(config: &HttpConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder().default_headers(default_headers(config)?);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent);
        }
        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| ApiError::Configuration(format!("Invalid proxy '{proxy}': {e}")))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| ApiError::Configuration(format!("HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn default_headers(config: &HttpConfig) -> Result<HeaderMap, ApiError> {
    config
        .headers
        .iter()
        .map(|(name, value)| {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::Configuration(format!("Header name '{name}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ApiError::Configuration(format!("Header '{name}': {e}")))?;
            Ok((name, value))
        })
        .collect()
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_builder() {
        TransportError::Construction(err.to_string())
    } else {
        TransportError::NoResponse {
            timed_out: err.is_timeout(),
            cause: err.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut rb = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone());
        if !request.query.is_empty() {
            rb = rb.query(&request.query);
        }
        if let Some(body) = &request.body {
            rb = rb.json(body);
        }
        if let Some(timeout) = request.timeout {
            rb = rb.timeout(timeout);
        }

        let resp = rb.send().await.map_err(classify)?;
        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let body = resp.bytes().await.map_err(classify)?;

        Ok(HttpResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}
