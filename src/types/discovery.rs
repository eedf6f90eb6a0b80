//! Discovery document type definitions
//!
//! Mirrors the Discovery Service wire format (JSON Schema Draft 3 with
//! Google-style extensions). Everything except the method essentials is
//! optional so partial documents fetched with a field selector still decode.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Directory listing returned by `GET {discovery}/apis`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryList {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub discovery_version: Option<String>,
    #[serde(default)]
    pub items: Vec<DirectoryItem>,
}

/// One API version listed by the directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryItem {
    /// e.g. `youtube:v3`
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Where the full REST descriptor lives.
    pub discovery_rest_url: String,
    #[serde(default)]
    pub documentation_link: Option<String>,
    #[serde(default)]
    pub preferred: bool,
}

/// Discovery document root
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryDocument {
    #[serde(default)]
    pub discovery_version: Option<String>,

    /// API name (e.g. "youtube")
    #[serde(default)]
    pub name: String,

    /// API version (e.g. "v3")
    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Absolute base URL of every method path, e.g. `https://www.googleapis.com/youtube/v3/`
    #[serde(default)]
    pub base_url: Option<String>,

    /// Root URL, e.g. `https://www.googleapis.com/`
    #[serde(default)]
    pub root_url: Option<String>,

    /// Service path relative to the root URL, e.g. `youtube/v3/`
    #[serde(default)]
    pub service_path: Option<String>,

    /// Deprecated absolute path; used only when nothing better is declared.
    #[serde(default)]
    pub base_path: Option<String>,

    /// Parameters accepted by every method (key, fields, prettyPrint, ...).
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterSpec>,

    /// Schema id -> JSON-Schema-like definition.
    #[serde(default)]
    pub schemas: serde_json::Map<String, serde_json::Value>,

    #[serde(default)]
    pub resources: BTreeMap<String, Resource>,

    /// Methods at the root level (rare).
    #[serde(default)]
    pub methods: BTreeMap<String, Method>,
}

impl DiscoveryDocument {
    /// Absolute URL that method paths are resolved against.
    ///
    /// Prefers `baseUrl`, then `rootUrl + servicePath`, then `basePath`.
    pub fn resolved_base_url(&self) -> Option<String> {
        if let Some(base) = self.base_url.as_deref().filter(|b| !b.is_empty()) {
            return Some(base.to_string());
        }
        if let Some(root) = self.root_url.as_deref().filter(|r| !r.is_empty()) {
            let service = self.service_path.as_deref().unwrap_or_default();
            return Some(join_url(root, service));
        }
        self.base_path.clone().filter(|p| !p.is_empty())
    }
}

/// Resource (collection of methods and nested resources)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub methods: BTreeMap<String, Method>,

    #[serde(default)]
    pub resources: BTreeMap<String, Resource>,
}

/// Method (API operation)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Method {
    /// e.g. `youtube.playlistItems.list`
    pub id: String,

    /// Path template relative to the base URL, e.g. `channels/{channelId}/sections`
    pub path: String,

    /// GET, POST, PUT, PATCH, DELETE
    pub http_method: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterSpec>,

    #[serde(default)]
    pub parameter_order: Vec<String>,

    #[serde(default)]
    pub request: Option<SchemaRef>,

    #[serde(default)]
    pub response: Option<SchemaRef>,

    #[serde(default)]
    pub scopes: Vec<String>,
}

/// Reference to an entry of the document's `schemas` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaRef {
    #[serde(rename = "$ref")]
    pub reference: String,
}

/// Parameter declaration.
///
/// Bounds and defaults are transmitted as strings by the discovery service;
/// they are kept as raw JSON and coerced when the validator is compiled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// string, integer, number, boolean, any
    #[serde(rename = "type", default)]
    pub param_type: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub default: Option<serde_json::Value>,

    #[serde(default)]
    pub minimum: Option<serde_json::Value>,

    #[serde(default)]
    pub maximum: Option<serde_json::Value>,

    /// `path` or `query`
    #[serde(default)]
    pub location: Option<String>,

    /// The parameter may be given several times (an array of values).
    #[serde(default)]
    pub repeated: bool,

    #[serde(rename = "enum", default)]
    pub enum_values: Vec<String>,

    #[serde(default)]
    pub pattern: Option<String>,

    #[serde(default)]
    pub format: Option<String>,
}

impl ParameterSpec {
    /// Declared in the URL path rather than the query string.
    pub fn is_path(&self) -> bool {
        self.location.as_deref() == Some("path")
    }
}

/// Join two URL fragments with exactly one slash between them.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) if !base.is_empty() && !path.is_empty() => format!("{base}/{path}"),
        _ => format!("{base}{path}"),
    }
}
