//! Client builder

use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;

use super::{ApiClient, ClientOptions};
use crate::discovery::DiscoveryCache;
use crate::error::Result;
use crate::executor::RequestExecutor;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::tree::TreeBuilder;
use crate::types::HttpConfig;
use crate::utils::HttpInterceptor;

/// Builder for [`ApiClient`].
///
/// ```rust,no_run
/// # async fn demo() -> dynapi::Result<()> {
/// use serde_json::json;
///
/// let youtube = dynapi::ApiClient::builder("youtube")
///     .api_key("AIza...")
///     .version("v3")
///     .build()?;
/// let items = youtube
///     .resource("playlistItems")
///     .method("list")
///     .call(json!({"part": "snippet", "playlistId": "PL123"}))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    api: String,
    options: ClientOptions,
    interceptors: Vec<Arc<dyn HttpInterceptor>>,
    transport: Option<Arc<dyn HttpTransport>>,
    discovery_cache: Option<Arc<DiscoveryCache>>,
}

impl ClientBuilder {
    pub fn new(api: impl Into<String>) -> Self {
        Self::with_options(api, ClientOptions::default())
    }

    /// Start from existing options (e.g. [`ClientOptions::from_env`]).
    pub fn with_options(api: impl Into<String>, options: ClientOptions) -> Self {
        Self {
            api: api.into(),
            options,
            interceptors: Vec::new(),
            transport: None,
            discovery_cache: None,
        }
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.options.api_key = Some(SecretString::from(key.into()));
        self
    }

    /// Pin the API version instead of using the directory's preferred one.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.options.version = Some(version.into());
        self
    }

    pub fn discovery_url(mut self, url: impl Into<String>) -> Self {
        self.options.discovery_url = url.into();
        self
    }

    /// Default timeout for every call made through this client.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    pub fn schema_checks(mut self, enabled: bool) -> Self {
        self.options.schema_checks = enabled;
        self
    }

    pub fn http_config(mut self, config: HttpConfig) -> Self {
        self.options.http = config;
        self
    }

    /// Register an interceptor observing every API call.
    pub fn interceptor(mut self, interceptor: Arc<dyn HttpInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Use a preconfigured reqwest client. `http_config` is ignored when set.
    pub fn http_client(self, client: reqwest::Client) -> Self {
        self.transport(Arc::new(ReqwestTransport::from_client(client)))
    }

    /// Replace the reqwest transport. `http_config` is ignored when set.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Share a discovery cache between clients (see [`DiscoveryCache::global`]).
    pub fn discovery_cache(mut self, cache: Arc<DiscoveryCache>) -> Self {
        self.discovery_cache = Some(cache);
        self
    }

    pub fn build(self) -> Result<ApiClient> {
        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&self.options.http)?),
        };
        let discovery = self.discovery_cache.unwrap_or_else(|| {
            Arc::new(DiscoveryCache::new(
                Arc::clone(&transport),
                self.options.discovery_url.clone(),
            ))
        });
        let executor = RequestExecutor::new(transport)
            .with_api_key(self.options.api_key)
            .with_interceptors(self.interceptors)
            .with_default_timeout(self.options.timeout);
        let builder =
            TreeBuilder::new(Arc::new(executor)).with_schema_checks(self.options.schema_checks);

        tracing::debug!(target: "dynapi::dispatch", api=%self.api, version=?self.options.version, discovery=%discovery.discovery_url(), "client built");

        Ok(ApiClient::from_parts(
            self.api,
            self.options.version,
            discovery,
            builder,
        ))
    }
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("api", &self.api)
            .field("options", &self.options)
            .field("interceptors", &self.interceptors.len())
            .field("custom_transport", &self.transport.is_some())
            .finish_non_exhaustive()
    }
}
