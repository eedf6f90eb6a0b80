//! Operation Tree
//!
//! The compiled form of one discovery document: every method reachable from
//! the document root, keyed by its dotted path (`playlistItems.list`,
//! `users.messages.get`). Root-level methods sit at their bare name.

mod builder;
mod operation;

pub use builder::TreeBuilder;
pub use operation::CompiledOperation;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{ApiError, Result};

/// Immutable index of compiled operations for one API version.
#[derive(Debug, Clone)]
pub struct OperationTree {
    api: String,
    version: String,
    base_url: String,
    operations: BTreeMap<String, Arc<CompiledOperation>>,
}

impl OperationTree {
    pub fn api(&self) -> &str {
        &self.api
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Operation at a dotted path.
    pub fn get(&self, path: &str) -> Option<&Arc<CompiledOperation>> {
        self.operations.get(path)
    }

    /// Operation at the path formed by `segments`.
    pub fn resolve<S: AsRef<str>>(&self, segments: &[S]) -> Result<Arc<CompiledOperation>> {
        let path = segments
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(".");
        self.operations
            .get(&path)
            .cloned()
            .ok_or(ApiError::UnknownOperation { path })
    }

    /// Every operation path, sorted.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    pub fn operations(&self) -> impl Iterator<Item = &Arc<CompiledOperation>> {
        self.operations.values()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
