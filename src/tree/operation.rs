//! Compiled operation
//!
//! One discovery method bound to its validator, request template and the
//! executor that sends it.

use serde_json::Value;
use std::sync::Arc;

use crate::error::{ApiError, Result};
use crate::executor::{CallOptions, RequestExecutor, RequestTemplate};
use crate::validation::{ParameterValidator, SchemaCheck};

/// A callable method of the API, addressed by its dotted path.
pub struct CompiledOperation {
    pub(crate) path: String,
    pub(crate) description: Option<String>,
    pub(crate) parameter_order: Vec<String>,
    pub(crate) scopes: Vec<String>,
    pub(crate) path_params: Vec<String>,
    pub(crate) validator: ParameterValidator,
    pub(crate) template: RequestTemplate,
    pub(crate) executor: Arc<RequestExecutor>,
    pub(crate) response_check: Option<SchemaCheck>,
}

impl CompiledOperation {
    /// Validate `params` and perform the call.
    pub async fn call(&self, params: Value) -> Result<Value> {
        self.call_with(params, None, &CallOptions::default()).await
    }

    /// Like [`call`](Self::call) with a JSON request body.
    pub async fn call_with_body(&self, params: Value, body: Value) -> Result<Value> {
        self.call_with(params, Some(body), &CallOptions::default())
            .await
    }

    /// Full form: optional body plus per-call timeout and cancellation.
    ///
    /// Validation failures return before anything is sent.
    pub async fn call_with(
        &self,
        params: Value,
        body: Option<Value>,
        options: &CallOptions,
    ) -> Result<Value> {
        let params = self.validator.validate(&params, body.as_ref())?;
        let response = self
            .executor
            .execute(&self.template, params, body, options)
            .await?;

        if let Some(check) = &self.response_check {
            let violations = check.violations(&response);
            if !violations.is_empty() {
                return Err(ApiError::InvalidResponse {
                    method_id: self.template.method_id.clone(),
                    violations,
                });
            }
        }
        Ok(response)
    }

    /// Dotted path inside the tree, e.g. `playlistItems.list`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method_id(&self) -> &str {
        &self.template.method_id
    }

    pub fn http_method(&self) -> &reqwest::Method {
        &self.template.http_method
    }

    /// Absolute URL template with `{name}` placeholders.
    pub fn url_template(&self) -> &str {
        &self.template.url_template
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn parameter_order(&self) -> &[String] {
        &self.parameter_order
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Parameters substituted into the URL rather than sent as query pairs.
    pub fn path_params(&self) -> &[String] {
        &self.path_params
    }

    /// JSON Schema the parameters are validated against.
    pub fn parameter_schema(&self) -> &Value {
        self.validator.schema()
    }

    /// Schema id responses are checked against, when response checks are on.
    pub fn response_schema(&self) -> Option<&str> {
        self.response_check.as_ref().map(SchemaCheck::reference)
    }
}

impl std::fmt::Debug for CompiledOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledOperation")
            .field("path", &self.path)
            .field("method_id", &self.template.method_id)
            .field("http_method", &self.template.http_method)
            .field("url_template", &self.template.url_template)
            .finish_non_exhaustive()
    }
}
