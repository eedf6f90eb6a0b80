//! Query string serialization
//!
//! Remaining call parameters become query pairs:
//! - array `fields` is comma-joined
//! - array `id` is comma-joined and sets `maxResults` to its length
//! - a non-empty string `id` sets `maxResults` to its comma-separated count
//! - `null` values are dropped
//! - other arrays repeat the key, objects are sent as JSON text

use serde_json::{Map, Value};

/// Serialize parameters into ordered query pairs.
pub fn serialize_params(params: &Map<String, Value>) -> Vec<(String, String)> {
    let mut query = params.clone();

    if let Some(Value::Array(fields)) = query.get("fields")
        && !fields.is_empty()
    {
        let joined = join(fields);
        query.insert("fields".into(), Value::String(joined));
    }

    match query.get("id") {
        Some(Value::Array(ids)) if !ids.is_empty() => {
            let count = ids.len();
            let joined = join(ids);
            query.insert("id".into(), Value::String(joined));
            query.insert("maxResults".into(), Value::from(count));
        }
        Some(Value::String(id)) if !id.is_empty() => {
            let count = id.split(',').count();
            query.insert("maxResults".into(), Value::from(count));
        }
        _ => {}
    }

    let mut pairs = Vec::with_capacity(query.len());
    for (key, value) in query {
        match value {
            Value::Null => {}
            Value::Array(items) => pairs.extend(
                items
                    .iter()
                    .filter(|item| !item.is_null())
                    .map(|item| (key.clone(), scalar(item))),
            ),
            other => pairs.push((key, scalar(&other))),
        }
    }
    pairs
}

fn join(items: &[Value]) -> String {
    items
        .iter()
        .filter(|item| !item.is_null())
        .map(scalar)
        .collect::<Vec<_>>()
        .join(",")
}

/// Strings verbatim, objects and arrays as JSON text, everything else via `Display`.
pub(crate) fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
