//! Memoizing discovery cache
//!
//! Directory listings and REST descriptors are cached per key. Concurrent misses
//! for the same key share one in-flight fetch; failures are handed to every
//! waiter and then forgotten so the next call starts over.

use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex, OnceLock};

use super::{ApiRef, DEFAULT_DISCOVERY_URL};
use crate::error::{ApiError, Result};
use crate::transport::{HttpRequest, HttpTransport, ReqwestTransport};
use crate::types::{DirectoryItem, DirectoryList, DiscoveryDocument, HttpConfig};
use crate::utils::single_flight::{Flights, coalesce};

/// Key under which the complete directory listing is cached.
const FULL_DIRECTORY: &str = "*";

fn poisoned<E: std::fmt::Display>(e: E) -> ApiError {
    ApiError::Internal(format!("Discovery cache lock poisoned: {e}"))
}

async fn get_json<T: DeserializeOwned>(
    transport: &dyn HttpTransport,
    api: &str,
    request: HttpRequest,
) -> Result<T> {
    tracing::debug!(target: "dynapi::discovery", %api, url=%request.url, "fetching");
    let response = transport
        .send(request)
        .await
        .map_err(|e| ApiError::discovery(api, e))?;
    if !response.is_success() {
        return Err(ApiError::discovery(
            api,
            format!("status {}: {}", response.status, response.decoded_body()),
        ));
    }
    serde_json::from_slice(&response.body)
        .map_err(|e| ApiError::discovery(api, format!("invalid discovery JSON: {e}")))
}

/// Pick the directory entry for `name`: the pinned version, else the preferred one,
/// else the first listed.
pub fn select_item(
    items: &[DirectoryItem],
    name: &str,
    version: Option<&str>,
) -> Result<DirectoryItem> {
    let mut candidates = items.iter().filter(|item| item.name == name);
    let found = match version {
        Some(v) => candidates.find(|item| item.version == v),
        None => {
            let all: Vec<&DirectoryItem> = candidates.collect();
            all.iter()
                .find(|item| item.preferred)
                .or_else(|| all.first())
                .copied()
        }
    };
    found.cloned().ok_or_else(|| match version {
        Some(v) => ApiError::discovery(name, format!("version '{v}' is not listed in the directory")),
        None => ApiError::discovery(name, "api is not listed in the directory"),
    })
}

/// Fetches and memoizes discovery documents by API name.
pub struct DiscoveryCache {
    transport: Arc<dyn HttpTransport>,
    discovery_url: String,
    listings: Arc<Mutex<Flights<Arc<Vec<DirectoryItem>>>>>,
    documents: Arc<Mutex<Flights<Arc<DiscoveryDocument>>>>,
}

static GLOBAL: OnceLock<Arc<DiscoveryCache>> = OnceLock::new();

impl DiscoveryCache {
    /// Create a cache that fetches from `discovery_url` (e.g. `https://www.googleapis.com/discovery/v1`).
    pub fn new(transport: Arc<dyn HttpTransport>, discovery_url: impl Into<String>) -> Self {
        Self {
            transport,
            discovery_url: discovery_url.into().trim_end_matches('/').to_string(),
            listings: Arc::new(Mutex::new(Flights::default())),
            documents: Arc::new(Mutex::new(Flights::default())),
        }
    }

    /// Process-wide cache against the public discovery endpoint.
    ///
    /// Clients only use it when handed it explicitly via
    /// `ClientBuilder::discovery_cache`.
    pub fn global() -> Result<Arc<DiscoveryCache>> {
        if let Some(cache) = GLOBAL.get() {
            return Ok(Arc::clone(cache));
        }
        let transport = ReqwestTransport::new(&HttpConfig::default())?;
        let cache = Arc::new(DiscoveryCache::new(
            Arc::new(transport),
            DEFAULT_DISCOVERY_URL,
        ));
        Ok(Arc::clone(GLOBAL.get_or_init(|| cache)))
    }

    pub fn discovery_url(&self) -> &str {
        &self.discovery_url
    }

    /// Discovery document of the preferred version of `api`.
    pub async fn fetch(&self, api: &str) -> Result<Arc<DiscoveryDocument>> {
        self.fetch_version(api, None).await
    }

    /// Discovery document of `api`, pinned to `version` when given.
    pub async fn fetch_version(
        &self,
        api: &str,
        version: Option<&str>,
    ) -> Result<Arc<DiscoveryDocument>> {
        let item = self.resolve_item(api, version).await?;
        self.fetch_item(item, None).await
    }

    /// REST descriptor for an API name or directory entry, optionally restricted
    /// by a partial-response field selector such as `"schemas,baseUrl"`.
    pub async fn fetch_rest<'a>(
        &self,
        api: impl Into<ApiRef<'a>>,
        fields: Option<&str>,
    ) -> Result<Arc<DiscoveryDocument>> {
        let item = match api.into() {
            ApiRef::Name(name) => self.resolve_item(name, None).await?,
            ApiRef::Item(item) => item.clone(),
        };
        self.fetch_item(item, fields.map(str::to_string)).await
    }

    /// Schema definitions of an API (fetched with the `schemas` field selector).
    pub async fn schemas<'a>(
        &self,
        api: impl Into<ApiRef<'a>>,
    ) -> Result<serde_json::Map<String, serde_json::Value>> {
        let doc = self.fetch_rest(api, Some("schemas")).await?;
        Ok(doc.schemas.clone())
    }

    /// Every listed version of `api`.
    pub async fn list(&self, api: &str) -> Result<Arc<Vec<DirectoryItem>>> {
        let request = HttpRequest::get(self.apis_url()).with_query("name", api);
        self.listing(api, request).await
    }

    /// The complete directory of APIs.
    pub async fn directory(&self) -> Result<Arc<Vec<DirectoryItem>>> {
        let request = HttpRequest::get(self.apis_url());
        self.listing(FULL_DIRECTORY, request).await
    }

    /// Drop everything cached for `api`. In-flight fetches are left to finish.
    pub fn invalidate(&self, api: &str) -> Result<()> {
        let prefix = format!("{api}:");
        self.listings.lock().map_err(poisoned)?.ready.remove(api);
        self.documents
            .lock()
            .map_err(poisoned)?
            .ready
            .retain(|key, _| !key.starts_with(&prefix));
        tracing::debug!(target: "dynapi::discovery", %api, "invalidated");
        Ok(())
    }

    /// Drop every cached listing and document.
    pub fn clear(&self) -> Result<()> {
        self.listings.lock().map_err(poisoned)?.ready.clear();
        self.documents.lock().map_err(poisoned)?.ready.clear();
        Ok(())
    }

    fn apis_url(&self) -> String {
        format!("{}/apis", self.discovery_url)
    }

    async fn resolve_item(&self, api: &str, version: Option<&str>) -> Result<DirectoryItem> {
        let items = self.list(api).await?;
        select_item(&items, api, version)
    }

    async fn listing(&self, key: &str, request: HttpRequest) -> Result<Arc<Vec<DirectoryItem>>> {
        let transport = Arc::clone(&self.transport);
        let api = key.to_string();
        coalesce(&self.listings, key.to_string(), move || async move {
            let list: DirectoryList = get_json(transport.as_ref(), &api, request).await?;
            Ok::<_, ApiError>(Arc::new(list.items))
        })
        .await
    }

    async fn fetch_item(
        &self,
        item: DirectoryItem,
        fields: Option<String>,
    ) -> Result<Arc<DiscoveryDocument>> {
        let key = match &fields {
            Some(f) => format!("{}:{}?fields={f}", item.name, item.version),
            None => format!("{}:{}", item.name, item.version),
        };
        let transport = Arc::clone(&self.transport);
        coalesce(&self.documents, key, move || async move {
            let mut request = HttpRequest::get(item.discovery_rest_url.clone());
            if let Some(fields) = fields {
                request = request.with_query("fields", fields);
            }
            let mut doc: DiscoveryDocument =
                get_json(transport.as_ref(), &item.name, request).await?;
            if doc.name.is_empty() {
                doc.name = item.name.clone();
            }
            if doc.version.is_empty() {
                doc.version = item.version.clone();
            }
            Ok::<_, ApiError>(Arc::new(doc))
        })
        .await
    }
}

impl std::fmt::Debug for DiscoveryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryCache")
            .field("discovery_url", &self.discovery_url)
            .finish_non_exhaustive()
    }
}
