//! Client configuration

use secrecy::SecretString;
use std::time::Duration;

use crate::discovery::DEFAULT_DISCOVERY_URL;
use crate::types::HttpConfig;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "DYNAPI_API_KEY";
/// Environment variable pinning the API version.
pub const API_VERSION_ENV: &str = "DYNAPI_API_VERSION";

/// Options for one [`ApiClient`](super::ApiClient).
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Sent as the `key` query parameter on every call.
    pub api_key: Option<SecretString>,
    /// Pinned API version; the directory's preferred version otherwise.
    pub version: Option<String>,
    /// Root of the discovery service.
    pub discovery_url: String,
    /// Default per-call timeout (per-call options override it).
    pub timeout: Option<Duration>,
    /// Check request and response bodies against the document's schemas.
    pub schema_checks: bool,
    /// Settings for the default reqwest transport.
    pub http: HttpConfig,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            version: None,
            discovery_url: DEFAULT_DISCOVERY_URL.to_string(),
            timeout: None,
            schema_checks: false,
            http: HttpConfig::default(),
        }
    }
}

impl ClientOptions {
    /// Defaults, with the API key and version taken from the environment when set.
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Ok(key) = std::env::var(API_KEY_ENV)
            && !key.is_empty()
        {
            options.api_key = Some(SecretString::from(key));
        }
        if let Ok(version) = std::env::var(API_VERSION_ENV)
            && !version.is_empty()
        {
            options.version = Some(version);
        }
        options
    }
}
