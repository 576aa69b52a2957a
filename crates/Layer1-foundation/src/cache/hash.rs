//! Canonical encoding and hashing utilities for cache keys

use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Compute a hash for any hashable value
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Encode a JSON value as canonical text
///
/// Object keys are emitted in byte order at every depth, so two structurally
/// equal values always encode to the same string whatever order their maps
/// were built in. Numbers keep their written form: `1` and `1.0` differ.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

/// Append the canonical encoding of `value` to `out`
pub fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        // serde_json's string encoder handles escaping
        Value::String(s) => out.push_str(&Value::String(s.clone()).to_string()),
        Value::Array(arr) => {
            out.push('[');
            for (i, item) in arr.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(obj) => {
            let mut keys: Vec<_> = obj.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                if let Some(v) = obj.get(key) {
                    write_canonical(v, out);
                }
            }
            out.push('}');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_equal_canonical_text_equal_hash() {
        let a = canonical_json(&json!({"a": 1, "b": 2}));
        let b = canonical_json(&json!({"b": 2, "a": 1}));
        assert_eq!(compute_hash(&a), compute_hash(&b));
        assert_ne!(compute_hash(&a), compute_hash(&canonical_json(&json!({"a": 2}))));
    }

    #[test]
    fn test_canonical_sorts_nested_keys() {
        let value = json!({"z": {"b": [1, {"y": null, "x": true}], "a": "s"}, "m": 1.5});
        assert_eq!(
            canonical_json(&value),
            r#"{"m":1.5,"z":{"a":"s","b":[1,{"x":true,"y":null}]}}"#
        );
    }

    #[test]
    fn test_canonical_keeps_number_form() {
        assert_ne!(canonical_json(&json!(1)), canonical_json(&json!(1.0)));
        assert_eq!(canonical_json(&json!([1, -2.5, 3u64])), "[1,-2.5,3]");
        assert_eq!(canonical_json(&json!("a\"b")), r#""a\"b""#);
    }
}
