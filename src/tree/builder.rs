//! Resource tree builder
//!
//! Walks a discovery document depth-first and compiles every method into a
//! [`CompiledOperation`]. The walk performs no I/O: the same document always
//! yields the same paths and request templates.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{CompiledOperation, OperationTree};
use crate::error::{ApiError, Result};
use crate::executor::{RequestExecutor, RequestTemplate, placeholders};
use crate::types::{DiscoveryDocument, Method, Resource, join_url};
use crate::validation::{ParameterValidator, SchemaRegistry};

/// Compiles discovery documents into operation trees.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    executor: Arc<RequestExecutor>,
    schema_checks: bool,
}

struct Walk<'d> {
    api: &'d str,
    base_url: String,
    registry: Option<SchemaRegistry>,
    operations: BTreeMap<String, Arc<CompiledOperation>>,
}

impl TreeBuilder {
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self {
            executor,
            schema_checks: false,
        }
    }

    /// Check request and response bodies against the document's schemas.
    pub fn with_schema_checks(mut self, enabled: bool) -> Self {
        self.schema_checks = enabled;
        self
    }

    pub fn build(&self, doc: &DiscoveryDocument) -> Result<OperationTree> {
        let base_url = doc.resolved_base_url().ok_or_else(|| {
            ApiError::Configuration(format!(
                "Discovery document for '{}' declares no base URL",
                doc.name
            ))
        })?;

        let mut walk = Walk {
            api: &doc.name,
            base_url,
            registry: self
                .schema_checks
                .then(|| SchemaRegistry::new(&doc.schemas)),
            operations: BTreeMap::new(),
        };
        self.visit(&mut walk, &[], &doc.methods, &doc.resources)?;

        tracing::debug!(target: "dynapi::tree", api=%doc.name, version=%doc.version, operations=walk.operations.len(), "tree built");

        Ok(OperationTree {
            api: doc.name.clone(),
            version: doc.version.clone(),
            base_url: walk.base_url,
            operations: walk.operations,
        })
    }

    fn visit(
        &self,
        walk: &mut Walk<'_>,
        prefix: &[&str],
        methods: &BTreeMap<String, Method>,
        resources: &BTreeMap<String, Resource>,
    ) -> Result<()> {
        for (name, method) in methods {
            let path = dotted(prefix, name);
            let operation = self.compile(walk, path.clone(), method)?;
            walk.operations.insert(path, Arc::new(operation));
        }
        for (name, resource) in resources {
            let mut nested = prefix.to_vec();
            nested.push(name);
            self.visit(walk, &nested, &resource.methods, &resource.resources)?;
        }
        Ok(())
    }

    fn compile(&self, walk: &Walk<'_>, path: String, method: &Method) -> Result<CompiledOperation> {
        let method_id = if method.id.is_empty() {
            format!("{}.{path}", walk.api)
        } else {
            method.id.clone()
        };
        tracing::trace!(target: "dynapi::tree", %method_id, %path, "compiling");

        let mut validator = ParameterValidator::compile(
            &method_id,
            method.description.as_deref(),
            &method.parameters,
        )?;
        let mut response_check = None;

        if let Some(registry) = &walk.registry {
            if let Some(request) = method.request.as_ref().map(|r| r.reference.as_str())
                && registry.contains(request)
            {
                validator = validator.with_body_check(registry.compile(request)?);
            }
            if let Some(response) = method.response.as_ref().map(|r| r.reference.as_str())
                && registry.contains(response)
            {
                response_check = Some(registry.compile(response)?);
            }
        }

        let path_params = placeholders(&method.path);
        for name in &path_params {
            if !method.parameters.get(name).is_some_and(|p| p.is_path()) {
                tracing::debug!(target: "dynapi::tree", %method_id, param=%name, "placeholder is not declared as a path parameter");
            }
        }

        let template = RequestTemplate::new(
            method_id,
            &method.http_method,
            join_url(&walk.base_url, &method.path),
        )?;

        Ok(CompiledOperation {
            path,
            description: method.description.clone(),
            parameter_order: method.parameter_order.clone(),
            scopes: method.scopes.clone(),
            path_params,
            validator,
            template,
            executor: Arc::clone(&self.executor),
            response_check,
        })
    }
}

fn dotted(prefix: &[&str], name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{name}", prefix.join("."))
    }
}
