//! Dynamic dispatch
//!
//! Call chains are formed before the operation tree exists: any sequence of
//! segments is accepted, and only invoking the chain resolves it against the
//! tree. A chain moves through these phases:
//!
//! - `Idle`: fresh from [`ApiClient::root`](crate::ApiClient::root)
//! - `Accumulating`: at least one segment appended
//! - `Resolving`: invoked, waiting for the tree build
//! - `Dispatched` or `Rejected`: operation found and executed, or not found
//!   or failed validation
//!
//! The last three are reported as `tracing` events on `dynapi::dispatch`.

mod macros;

use serde_json::Value;

use crate::client::ApiClient;
use crate::error::{ApiError, Result};
use crate::executor::CallOptions;

/// Observable state of a [`PendingPath`] before invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathState {
    Idle,
    Accumulating,
}

/// A call chain such as `playlistItems.list`, not yet resolved.
///
/// Cloning yields an independent chain.
#[derive(Debug, Clone)]
pub struct PendingPath<'c> {
    client: &'c ApiClient,
    segments: Vec<String>,
}

impl<'c> PendingPath<'c> {
    pub(crate) fn new(client: &'c ApiClient) -> Self {
        Self {
            client,
            segments: Vec::new(),
        }
    }

    /// Append a segment (resource or method name).
    pub fn get(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Alias of [`get`](Self::get) that reads better on resources.
    pub fn resource(self, name: impl Into<String>) -> Self {
        self.get(name)
    }

    /// Alias of [`get`](Self::get) that reads better on the final segment.
    pub fn method(self, name: impl Into<String>) -> Self {
        self.get(name)
    }

    pub fn state(&self) -> PathState {
        if self.segments.is_empty() {
            PathState::Idle
        } else {
            PathState::Accumulating
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Dotted form of the chain.
    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }

    /// Resolve and call with `params`.
    pub async fn call(self, params: Value) -> Result<Value> {
        self.call_with(params, None, &CallOptions::default()).await
    }

    /// Resolve and call with `params` and a JSON body.
    pub async fn call_with_body(self, params: Value, body: Value) -> Result<Value> {
        self.call_with(params, Some(body), &CallOptions::default())
            .await
    }

    /// Resolve and call with every knob available.
    pub async fn call_with(
        self,
        params: Value,
        body: Option<Value>,
        options: &CallOptions,
    ) -> Result<Value> {
        let path = self.dotted();
        tracing::debug!(target: "dynapi::dispatch", api=%self.client.api(), %path, "resolving");

        let tree = match self.client.tree().await {
            Ok(tree) => tree,
            Err(err) => return Err(rejected(&path, err)),
        };
        let operation = match tree.resolve(&self.segments) {
            Ok(operation) => operation,
            Err(err) => return Err(rejected(&path, err)),
        };

        tracing::debug!(target: "dynapi::dispatch", %path, method_id=%operation.method_id(), "dispatched");
        operation
            .call_with(params, body, options)
            .await
            .map_err(|err| match err {
                ApiError::Validation { .. } => rejected(&path, err),
                other => other,
            })
    }
}

fn rejected(path: &str, err: ApiError) -> ApiError {
    tracing::debug!(target: "dynapi::dispatch", %path, category=?err.category(), err=%err, "rejected");
    err
}
