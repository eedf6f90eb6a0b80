//! Per-method parameter validator
//!
//! Compiles a method's parameter declarations into a JSON Schema once and
//! reuses it for every call: optional defaults are filled in, declared scalar
//! types are coerced, and the result is checked before anything is sent.

use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

use super::coerce::{ParamKind, coerce, coerce_bound};
use super::schema::{SchemaCheck, describe};
use crate::error::{ApiError, Result};
use crate::types::ParameterSpec;

/// Reusable validation/coercion unit for one method.
pub struct ParameterValidator {
    method_id: String,
    schema: Value,
    compiled: jsonschema::Validator,
    defaults: Map<String, Value>,
    kinds: BTreeMap<String, ParamKind>,
    body: Option<SchemaCheck>,
}

impl ParameterValidator {
    /// Compile the validator for `method_id` from its parameter declarations.
    ///
    /// A parameter that is both required and carries a default keeps its
    /// requirement: the default is never applied, the caller must supply it.
    pub fn compile(
        method_id: &str,
        description: Option<&str>,
        parameters: &BTreeMap<String, ParameterSpec>,
    ) -> Result<Self> {
        let mut properties = Map::new();
        let mut required = Vec::new();
        let mut defaults = Map::new();
        let mut kinds = BTreeMap::new();

        for (name, spec) in parameters {
            let kind = ParamKind::from_type(spec.param_type.as_deref());
            properties.insert(name.clone(), property_schema(method_id, name, kind, spec));
            kinds.insert(name.clone(), kind);

            if spec.required {
                required.push(Value::String(name.clone()));
                if spec.default.is_some() {
                    tracing::trace!(target: "dynapi::tree", method=%method_id, param=%name, "ignoring default of required parameter");
                }
            } else if let Some(default) = &spec.default {
                defaults.insert(name.clone(), coerce(kind, default.clone()));
            }
        }

        let mut schema = json!({
            "title": method_id,
            "type": "object",
            "properties": properties,
            "required": required,
        });
        if let Some(description) = description {
            schema["description"] = Value::String(description.to_string());
        }

        let compiled = jsonschema::validator_for(&schema).map_err(|e| {
            ApiError::Configuration(format!("Invalid parameter schema for {method_id}: {e}"))
        })?;

        Ok(Self {
            method_id: method_id.to_string(),
            schema,
            compiled,
            defaults,
            kinds,
            body: None,
        })
    }

    /// Also check request bodies against a document schema.
    pub fn with_body_check(mut self, check: SchemaCheck) -> Self {
        self.body = Some(check);
        self
    }

    pub fn method_id(&self) -> &str {
        &self.method_id
    }

    /// The compiled JSON Schema (useful for introspection and docs).
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Defaults applied to omitted optional parameters.
    pub fn defaults(&self) -> &Map<String, Value> {
        &self.defaults
    }

    /// Validate caller parameters (and body, when a body check is attached).
    ///
    /// Returns the normalized parameters: nulls removed, defaults applied,
    /// declared types coerced, undeclared parameters passed through.
    pub fn validate(&self, params: &Value, body: Option<&Value>) -> Result<Map<String, Value>> {
        let mut normalized = match params {
            Value::Null => Map::new(),
            Value::Object(map) => map
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            other => {
                return Err(self.rejected(vec![format!(
                    "parameters must be a JSON object, got {other}"
                )]));
            }
        };

        for (name, default) in &self.defaults {
            if !normalized.contains_key(name) {
                normalized.insert(name.clone(), default.clone());
            }
        }

        for (name, value) in normalized.iter_mut() {
            if let Some(kind) = self.kinds.get(name) {
                *value = coerce(*kind, value.take());
            }
        }

        let instance = Value::Object(normalized);
        let mut violations: Vec<String> = self
            .compiled
            .iter_errors(&instance)
            .map(|err| describe(&err.to_string(), &err.instance_path.to_string()))
            .collect();

        if let (Some(check), Some(body)) = (&self.body, body) {
            violations.extend(
                check
                    .violations(body)
                    .into_iter()
                    .map(|v| format!("request body: {v}")),
            );
        }

        if !violations.is_empty() {
            return Err(self.rejected(violations));
        }

        match instance {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }

    fn rejected(&self, violations: Vec<String>) -> ApiError {
        ApiError::Validation {
            method_id: self.method_id.clone(),
            violations,
        }
    }
}

impl std::fmt::Debug for ParameterValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterValidator")
            .field("method_id", &self.method_id)
            .field("schema", &self.schema)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

fn property_schema(method_id: &str, name: &str, kind: ParamKind, spec: &ParameterSpec) -> Value {
    let mut item = Map::new();
    if let Some(t) = kind.json_type() {
        item.insert("type".into(), Value::String(t.into()));
    }
    if let Some(min) = spec.minimum.as_ref().and_then(coerce_bound) {
        item.insert("minimum".into(), min);
    }
    if let Some(max) = spec.maximum.as_ref().and_then(coerce_bound) {
        item.insert("maximum".into(), max);
    }
    if kind == ParamKind::String {
        if !spec.enum_values.is_empty() {
            item.insert("enum".into(), json!(spec.enum_values));
        }
        if let Some(pattern) = &spec.pattern {
            // Patterns the regex engine rejects are skipped rather than failing the whole API.
            if regex::Regex::new(pattern).is_ok() {
                item.insert("pattern".into(), Value::String(pattern.clone()));
            } else {
                tracing::trace!(target: "dynapi::tree", method=%method_id, param=%name, %pattern, "skipping unsupported pattern");
            }
        }
    }
    if let Some(description) = &spec.description {
        item.insert("description".into(), Value::String(description.clone()));
    }

    let item = Value::Object(item);
    if spec.repeated {
        json!({ "anyOf": [item.clone(), { "type": "array", "items": item }] })
    } else {
        item
    }
}
