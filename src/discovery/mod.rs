//! Discovery Cache
//!
//! Fetches the directory listing and REST descriptors from a discovery
//! endpoint and memoizes them per API name and version.
//!
//! - **List one API**: `GET {discovery}/apis?name={api}`
//! - **Whole directory**: `GET {discovery}/apis`
//! - **REST descriptor**: `GET {discoveryRestUrl}[?fields=...]`

mod cache;

pub use cache::{DiscoveryCache, select_item};

use crate::types::DirectoryItem;

/// Public Google discovery endpoint.
pub const DEFAULT_DISCOVERY_URL: &str = "https://www.googleapis.com/discovery/v1";

/// An API addressed either by name (resolved through the directory) or by an
/// already known directory entry.
#[derive(Debug, Clone, Copy)]
pub enum ApiRef<'a> {
    Name(&'a str),
    Item(&'a DirectoryItem),
}

impl<'a> From<&'a str> for ApiRef<'a> {
    fn from(name: &'a str) -> Self {
        ApiRef::Name(name)
    }
}

impl<'a> From<&'a String> for ApiRef<'a> {
    fn from(name: &'a String) -> Self {
        ApiRef::Name(name)
    }
}

impl<'a> From<&'a DirectoryItem> for ApiRef<'a> {
    fn from(item: &'a DirectoryItem) -> Self {
        ApiRef::Item(item)
    }
}
