//! Typed extraction helpers for JSON nodes
//!
//! Shape mismatches are protocol violations, not recoverable conditions:
//! the server advertises a stable schema and this client refuses to guess
//! around deviations.

use crate::error::{Error, Result};
use serde_json::Value;

/// Extract a required string field
pub fn str_field<'a>(value: &'a Value, name: &str) -> Result<&'a str> {
    value
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| shape_error(name, "a string", value))
}

/// Extract a required unsigned integer field
pub fn u64_field(value: &Value, name: &str) -> Result<u64> {
    value
        .get(name)
        .and_then(Value::as_u64)
        .ok_or_else(|| shape_error(name, "an unsigned integer", value))
}

/// Extract a required boolean field
pub fn bool_field(value: &Value, name: &str) -> Result<bool> {
    value
        .get(name)
        .and_then(Value::as_bool)
        .ok_or_else(|| shape_error(name, "a boolean", value))
}

/// Extract a required array field
pub fn array_field<'a>(value: &'a Value, name: &str) -> Result<&'a Vec<Value>> {
    value
        .get(name)
        .and_then(Value::as_array)
        .ok_or_else(|| shape_error(name, "an array", value))
}

/// Take ownership of the named envelope field of a response body
///
/// Every single-resource endpoint wraps its payload in a named object
/// (`{"droplet": {...}}`); this unwraps it.
pub fn envelope(mut value: Value, name: &str) -> Result<Value> {
    match value.get_mut(name) {
        Some(inner) => Ok(inner.take()),
        None => Err(shape_error(name, "present", &value)),
    }
}

fn shape_error(name: &str, expected: &str, value: &Value) -> Error {
    let context: String = value.to_string().chars().take(256).collect();
    Error::protocol(format!(
        "response field {name:?} is not {expected} in {context}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_typed_fields() {
        let node = json!({"name": "web-1", "id": 42, "locked": false, "tags": ["a"]});
        assert_eq!(str_field(&node, "name").unwrap(), "web-1");
        assert_eq!(u64_field(&node, "id").unwrap(), 42);
        assert!(!bool_field(&node, "locked").unwrap());
        assert_eq!(array_field(&node, "tags").unwrap().len(), 1);
    }

    #[test]
    fn shape_mismatch_is_a_protocol_violation() {
        let node = json!({"id": "not-a-number"});
        assert!(matches!(
            u64_field(&node, "id").unwrap_err(),
            Error::Protocol(_)
        ));
        assert!(matches!(
            str_field(&node, "missing").unwrap_err(),
            Error::Protocol(_)
        ));
    }

    #[test]
    fn envelope_unwraps_the_named_object() {
        let body = json!({"droplet": {"id": 42}});
        let inner = envelope(body, "droplet").unwrap();
        assert_eq!(inner, json!({"id": 42}));

        let body = json!({"droplets": []});
        assert!(envelope(body, "droplet").is_err());
    }
}
