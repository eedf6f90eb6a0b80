//! URL template expansion
//!
//! `{name}` is replaced by the percent-encoded parameter value, `{+name}` by
//! its reserved expansion where `/` is kept. Used parameters are removed from
//! the map so they are not repeated in the query string.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

use super::query::scalar;

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER
        .get_or_init(|| Regex::new(r"\{(\+?)([A-Za-z0-9_.\-]+)\}").expect("static placeholder pattern"))
}

/// Placeholder names of `template`, in order of appearance.
pub fn placeholders(template: &str) -> Vec<String> {
    placeholder()
        .captures_iter(template)
        .map(|c| c[2].to_string())
        .collect()
}

/// Expand `template` with values taken out of `params`.
///
/// Returns the name of the first placeholder without a value on failure.
pub fn expand(template: &str, params: &mut Map<String, Value>) -> Result<String, String> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in placeholder().captures_iter(template) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        let reserved = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let value = match params.remove(name.as_str()) {
            Some(Value::Null) | None => return Err(name.as_str().to_string()),
            Some(value) => value,
        };

        out.push_str(&template[last..whole.start()]);
        out.push_str(&render(&value, reserved));
        last = whole.end();
    }

    out.push_str(&template[last..]);
    Ok(out)
}

fn render(value: &Value, reserved: bool) -> String {
    let encode = |text: &str| {
        let encoded = urlencoding::encode(text);
        if reserved {
            encoded.replace("%2F", "/")
        } else {
            encoded.into_owned()
        }
    };
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| encode(&scalar(item)))
            .collect::<Vec<_>>()
            .join(","),
        other => encode(&scalar(other)),
    }
}
