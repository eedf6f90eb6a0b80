//! Type coercion for caller parameters
//!
//! Discovery documents transmit numbers as strings and callers often pass
//! query-ish strings, so declared scalar types are coerced before validation.

use serde_json::{Number, Value};

/// Scalar kind of a declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Number,
    Boolean,
    Any,
}

impl ParamKind {
    pub fn from_type(param_type: Option<&str>) -> Self {
        match param_type {
            Some("string") => Self::String,
            Some("integer") => Self::Integer,
            Some("number") => Self::Number,
            Some("boolean") => Self::Boolean,
            _ => Self::Any,
        }
    }

    /// JSON-Schema `type` keyword, if the kind constrains one.
    pub fn json_type(self) -> Option<&'static str> {
        match self {
            Self::String => Some("string"),
            Self::Integer => Some("integer"),
            Self::Number => Some("number"),
            Self::Boolean => Some("boolean"),
            Self::Any => None,
        }
    }
}

/// Parse a numeric literal, preferring an integer representation.
pub fn parse_number(text: &str) -> Option<Number> {
    let text = text.trim();
    if let Ok(i) = text.parse::<i64>() {
        return Some(Number::from(i));
    }
    if let Ok(u) = text.parse::<u64>() {
        return Some(Number::from(u));
    }
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Numeric bound given either as a JSON number or as a string.
pub fn coerce_bound(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(s) => parse_number(s).map(Value::Number),
        _ => None,
    }
}

/// Coerce `value` toward `kind`. Values that cannot be coerced are returned
/// unchanged so validation reports them.
pub fn coerce(kind: ParamKind, value: Value) -> Value {
    match (kind, value) {
        (_, Value::Array(items)) => {
            Value::Array(items.into_iter().map(|v| coerce(kind, v)).collect())
        }
        (ParamKind::Integer, Value::String(s)) => match s.trim().parse::<i64>() {
            Ok(i) => Value::Number(i.into()),
            Err(_) => match s.trim().parse::<u64>() {
                Ok(u) => Value::Number(u.into()),
                Err(_) => Value::String(s),
            },
        },
        (ParamKind::Number, Value::String(s)) => match parse_number(&s) {
            Some(n) => Value::Number(n),
            None => Value::String(s),
        },
        (ParamKind::Boolean, Value::String(s)) => match s.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(s),
        },
        (ParamKind::String, Value::Number(n)) => Value::String(n.to_string()),
        (ParamKind::String, Value::Bool(b)) => Value::String(b.to_string()),
        (_, value) => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strings_become_numbers_and_booleans() {
        assert_eq!(coerce(ParamKind::Integer, json!("25")), json!(25));
        assert_eq!(coerce(ParamKind::Number, json!("2.5")), json!(2.5));
        assert_eq!(coerce(ParamKind::Boolean, json!("true")), json!(true));
        assert_eq!(coerce(ParamKind::Integer, json!("abc")), json!("abc"));
    }

    #[test]
    fn scalars_become_strings_for_string_params() {
        assert_eq!(coerce(ParamKind::String, json!(42)), json!("42"));
        assert_eq!(coerce(ParamKind::String, json!(false)), json!("false"));
    }

    #[test]
    fn arrays_are_coerced_element_wise() {
        assert_eq!(coerce(ParamKind::Integer, json!(["1", "2"])), json!([1, 2]));
    }

    #[test]
    fn bounds_accept_strings() {
        assert_eq!(coerce_bound(&json!("50")), Some(json!(50)));
        assert_eq!(coerce_bound(&json!(0)), Some(json!(0)));
        assert_eq!(coerce_bound(&json!("many")), None);
    }
}
