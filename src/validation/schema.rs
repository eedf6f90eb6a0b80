//! Body and response checks against the document's `schemas` map
//!
//! Discovery schemas are Draft-3 flavored: `$ref` holds a bare schema id,
//! `required` may be a boolean on a property and `type` may be `any`. They are
//! rewritten into one JSON-Schema `$defs` table that every check points into.

use serde_json::{Map, Value, json};

use crate::error::{ApiError, Result};

/// Rewritten schema definitions of one discovery document.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    definitions: Value,
}

impl SchemaRegistry {
    pub fn new(schemas: &Map<String, Value>) -> Self {
        let definitions = schemas
            .iter()
            .map(|(id, schema)| (id.clone(), rewrite(schema.clone())))
            .collect::<Map<_, _>>();
        Self {
            definitions: Value::Object(definitions),
        }
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.definitions.get(reference).is_some()
    }

    /// Compile a check for instances of the schema `reference`.
    pub fn compile(&self, reference: &str) -> Result<SchemaCheck> {
        if !self.contains(reference) {
            return Err(ApiError::Configuration(format!(
                "Unknown schema reference '{reference}'"
            )));
        }
        let root = json!({
            "$ref": format!("#/$defs/{reference}"),
            "$defs": self.definitions.clone(),
        });
        let validator = jsonschema::validator_for(&root).map_err(|e| {
            ApiError::Configuration(format!("Invalid schema '{reference}': {e}"))
        })?;
        Ok(SchemaCheck {
            reference: reference.to_string(),
            validator,
        })
    }
}

fn rewrite(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, value) in map {
                match (key.as_str(), &value) {
                    ("$ref", Value::String(r)) if !r.starts_with('#') => {
                        out.insert(key, Value::String(format!("#/$defs/{r}")));
                    }
                    ("required", Value::Bool(_)) => {}
                    ("type", Value::String(t)) if t == "any" => {}
                    _ => {
                        out.insert(key, rewrite(value));
                    }
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(rewrite).collect()),
        other => other,
    }
}

/// A compiled check against one schema of the document.
pub struct SchemaCheck {
    reference: String,
    validator: jsonschema::Validator,
}

impl SchemaCheck {
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Human-readable violations; empty when `instance` conforms.
    pub fn violations(&self, instance: &Value) -> Vec<String> {
        self.validator
            .iter_errors(instance)
            .map(|err| describe(&err.to_string(), &err.instance_path.to_string()))
            .collect()
    }
}

impl std::fmt::Debug for SchemaCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaCheck")
            .field("reference", &self.reference)
            .finish_non_exhaustive()
    }
}

pub(crate) fn describe(message: &str, path: &str) -> String {
    if path.is_empty() {
        message.to_string()
    } else {
        format!("{message} at {path}")
    }
}
