//! # dynapi - A Discovery-Driven Dynamic REST Client
//!
//! dynapi builds a callable client for any API published through a discovery
//! service (such as Google's APIs Discovery Service) at runtime. Nothing is
//! generated ahead of time: the API's machine-readable description is fetched
//! on first use, compiled into a tree of operations, and every call is
//! validated against the declared parameters before it goes out.
//!
#![deny(unsafe_code)]

//! ## Features
//!
//! - **Runtime Discovery**: Directory listing and REST descriptors are fetched once and cached per API and version.
//! - **Single-Flight**: Concurrent first calls share one discovery fetch and one tree build.
//! - **Validation First**: Parameters are coerced, defaulted and checked with JSON Schema; invalid calls never reach the network.
//! - **Structured Errors**: Server, no-response and construction failures stay distinguishable.
//! - **Pluggable Transport**: reqwest by default, any [`HttpTransport`](transport::HttpTransport) can be injected.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dynapi::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let youtube = ApiClient::builder("youtube")
//!         .api_key("your-api-key")
//!         .build()?;
//!
//!     // Chain form
//!     let items = youtube
//!         .resource("playlistItems")
//!         .method("list")
//!         .call(json!({"part": "snippet", "playlistId": "PL123", "maxResults": 10}))
//!         .await?;
//!
//!     // Macro form
//!     let videos = api_path!(youtube => videos.list)
//!         .call(json!({"part": "snippet", "id": ["a1", "b2"]}))
//!         .await?;
//!
//!     // Dotted form
//!     let channels = youtube.call("channels.list", json!({"part": "id", "forUsername": "x"})).await?;
//!
//!     println!("{items}\n{videos}\n{channels}");
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod discovery;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod transport;
pub mod tree;
pub mod types;
pub mod utils;
pub mod validation;

pub use client::{ApiClient, ClientBuilder, ClientOptions};
pub use discovery::DiscoveryCache;
pub use error::{ApiError, ErrorCategory, RequestError, Result};
pub use executor::CallOptions;

/// Commonly used items.
pub mod prelude {
    pub use crate::api_path;
    pub use crate::client::{ApiClient, ClientBuilder, ClientOptions};
    pub use crate::discovery::{ApiRef, DiscoveryCache};
    pub use crate::dispatch::{PathState, PendingPath};
    pub use crate::error::{ApiError, ErrorCategory, RequestError};
    pub use crate::executor::CallOptions;
    pub use crate::tree::{CompiledOperation, OperationTree};
    pub use crate::types::HttpConfig;
    pub use crate::utils::{CancelHandle, HttpInterceptor, LoggingInterceptor, new_cancel_handle};
}
