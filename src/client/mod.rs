//! API Client
//!
//! An [`ApiClient`] is bound to one API name. Its operation tree is built on
//! first use from the discovery document and then reused. Concurrent first
//! calls share one build and see the same outcome, failures included.

mod builder;
mod options;

pub use builder::ClientBuilder;
pub use options::{API_KEY_ENV, API_VERSION_ENV, ClientOptions};

use serde_json::Value;
use std::sync::{Arc, Mutex};

use crate::discovery::DiscoveryCache;
use crate::dispatch::PendingPath;
use crate::error::{ApiError, Result};
use crate::tree::{CompiledOperation, OperationTree, TreeBuilder};
use crate::utils::single_flight::{Flights, coalesce};

/// Dynamic client for one discovery-described API.
#[derive(Clone)]
pub struct ApiClient {
    api: String,
    version: Option<String>,
    discovery: Arc<DiscoveryCache>,
    builder: TreeBuilder,
    trees: Arc<Mutex<Flights<Arc<OperationTree>>>>,
}

impl ApiClient {
    /// Client for `api` with explicit options and the default transport.
    pub fn new(api: impl Into<String>, options: ClientOptions) -> Result<Self> {
        ClientBuilder::with_options(api, options).build()
    }

    pub fn builder(api: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(api)
    }

    pub(crate) fn from_parts(
        api: String,
        version: Option<String>,
        discovery: Arc<DiscoveryCache>,
        builder: TreeBuilder,
    ) -> Self {
        Self {
            api,
            version,
            discovery,
            builder,
            trees: Arc::new(Mutex::new(Flights::default())),
        }
    }

    pub fn api(&self) -> &str {
        &self.api
    }

    /// Pinned version, if any.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// The discovery cache this client reads from.
    pub fn discovery(&self) -> &Arc<DiscoveryCache> {
        &self.discovery
    }

    /// Start an empty call chain.
    pub fn root(&self) -> PendingPath<'_> {
        PendingPath::new(self)
    }

    /// Start a call chain at resource `name`.
    pub fn resource(&self, name: impl Into<String>) -> PendingPath<'_> {
        self.root().get(name)
    }

    /// The compiled operation tree, fetched and built on first use.
    pub async fn tree(&self) -> Result<Arc<OperationTree>> {
        let api = self.api.clone();
        let version = self.version.clone();
        let discovery = Arc::clone(&self.discovery);
        let builder = self.builder.clone();
        coalesce(&self.trees, self.tree_key(), move || async move {
            tracing::debug!(target: "dynapi::tree", %api, ?version, "building operation tree");
            let doc = discovery.fetch_version(&api, version.as_deref()).await?;
            Ok(Arc::new(builder.build(&doc)?))
        })
        .await
    }

    /// Operation at a dotted path such as `playlistItems.list`.
    pub async fn operation(&self, path: &str) -> Result<Arc<CompiledOperation>> {
        let tree = self.tree().await?;
        tree.get(path)
            .cloned()
            .ok_or_else(|| ApiError::UnknownOperation {
                path: path.to_string(),
            })
    }

    /// Call the operation at a dotted path.
    pub async fn call(&self, path: &str, params: Value) -> Result<Value> {
        self.operation(path).await?.call(params).await
    }

    /// Drop the compiled tree and the cached discovery data of this API.
    /// The next call fetches and builds again.
    pub fn invalidate(&self) -> Result<()> {
        self.trees
            .lock()
            .map_err(|e| ApiError::Internal(format!("Tree cache lock poisoned: {e}")))?
            .ready
            .clear();
        self.discovery.invalidate(&self.api)
    }

    fn tree_key(&self) -> String {
        format!(
            "{}:{}",
            self.api,
            self.version.as_deref().unwrap_or("preferred")
        )
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api", &self.api)
            .field("version", &self.version)
            .field("discovery", &self.discovery)
            .finish_non_exhaustive()
    }
}
