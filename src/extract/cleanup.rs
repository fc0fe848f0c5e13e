//! Attribute cleanup applied to every record before it is yielded.
//!
//! Graph stores want flat, scalar-ish properties. Cleanup drops empty lists
//! and `__`-prefixed internal keys, then flattens nested objects into
//! delimiter-joined keys: `{"a": {"b": 1}}` becomes `{"a.b": 1}`.
//!
//! Arrays of scalars are kept as arrays. Arrays holding objects or arrays are
//! flattened with the element index as the key segment, so
//! `{"hashes": [{"alg": "SHA-1"}]}` becomes `{"hashes.0.alg": "SHA-1"}`.

use crate::model::Attributes;
use serde_json::Value;
use thiserror::Error;

/// Prefix marking internal keys that never reach the graph.
pub const INTERNAL_KEY_PREFIX: &str = "__";

/// Default delimiter between flattened key segments.
pub const DEFAULT_DELIMITER: &str = ".";

/// Why cleanup could not produce a flat attribute map.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CleanupError {
    /// Two different paths flatten to the same key, e.g. `{"a.b": 1}` next
    /// to `{"a": {"b": 2}}`.
    #[error("flattened key '{key}' collides with an existing attribute")]
    KeyCollision { key: String },
}

/// Drop empty-list and internal keys, then flatten nested values.
///
/// Running this on its own output returns the same map.
pub fn clean_attributes(attributes: &Attributes, delimiter: &str) -> Result<Attributes, CleanupError> {
    let mut flat = Attributes::new();
    for (key, value) in attributes {
        if key.starts_with(INTERNAL_KEY_PREFIX) || is_empty_array(value) {
            continue;
        }
        flatten_into(&mut flat, key.clone(), value, delimiter)?;
    }
    Ok(flat)
}

/// Drop empty-list and internal keys without flattening.
#[must_use]
pub fn prune_attributes(attributes: &Attributes) -> Attributes {
    attributes
        .iter()
        .filter(|(key, value)| !key.starts_with(INTERNAL_KEY_PREFIX) && !is_empty_array(value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn is_empty_array(value: &Value) -> bool {
    matches!(value, Value::Array(items) if items.is_empty())
}

fn is_nested(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

fn flatten_into(
    flat: &mut Attributes,
    key: String,
    value: &Value,
    delimiter: &str,
) -> Result<(), CleanupError> {
    match value {
        Value::Object(fields) => {
            for (child_key, child) in fields {
                flatten_into(flat, format!("{key}{delimiter}{child_key}"), child, delimiter)?;
            }
            Ok(())
        }
        Value::Array(items) if items.iter().any(is_nested) => {
            for (index, item) in items.iter().enumerate() {
                flatten_into(flat, format!("{key}{delimiter}{index}"), item, delimiter)?;
            }
            Ok(())
        }
        // Flattening can leave nothing behind for an empty nested list.
        Value::Array(items) if items.is_empty() => Ok(()),
        // Joined segments can spell an internal key, e.g. "_" + "_" + "a".
        _ if key.starts_with(INTERNAL_KEY_PREFIX) => Ok(()),
        _ => {
            if flat.contains_key(&key) {
                return Err(CleanupError::KeyCollision { key });
            }
            flat.insert(key, value.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_flattens_nested_objects() {
        let cleaned = clean_attributes(&attrs(json!({"a": {"b": 1, "c": {"d": "x"}}})), ".").unwrap();
        assert_eq!(Value::Object(cleaned), json!({"a.b": 1, "a.c.d": "x"}));
    }

    #[test]
    fn test_drops_empty_lists_and_internal_keys() {
        let cleaned = clean_attributes(
            &attrs(json!({"tags": [], "__id": 3, "name": "foo", "nested": {"list": []}})),
            ".",
        )
        .unwrap();
        assert_eq!(Value::Object(cleaned), json!({"name": "foo"}));
    }

    #[test]
    fn test_scalar_arrays_are_kept() {
        let cleaned = clean_attributes(&attrs(json!({"creators": ["Tool: a", "Tool: b"]})), ".").unwrap();
        assert_eq!(Value::Object(cleaned), json!({"creators": ["Tool: a", "Tool: b"]}));
    }

    #[test]
    fn test_object_arrays_use_indexes() {
        let cleaned = clean_attributes(
            &attrs(json!({"hashes": [{"alg": "SHA-1", "content": "abc"}, {"alg": "MD5"}]})),
            "_",
        )
        .unwrap();
        assert_eq!(
            Value::Object(cleaned),
            json!({"hashes_0_alg": "SHA-1", "hashes_0_content": "abc", "hashes_1_alg": "MD5"})
        );
    }

    #[test]
    fn test_collision_is_an_error() {
        let err = clean_attributes(&attrs(json!({"a.b": 1, "a": {"b": 2}})), ".").unwrap_err();
        assert_eq!(err, CleanupError::KeyCollision { key: "a.b".to_string() });
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let original = attrs(json!({
            "name": "foo",
            "supplier": {"name": "acme", "url": ["https://acme.dev"]},
            "properties": [{"name": "p", "value": "v"}],
            "empty": [],
            "__hidden": true
        }));
        let once = clean_attributes(&original, ".").unwrap();
        let twice = clean_attributes(&once, ".").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_joined_internal_keys_are_dropped() {
        let original = attrs(json!({"_": {"a": 1, "b": [{"c": 2}]}, "x": {"_": 3}}));
        let once = clean_attributes(&original, "_").unwrap();
        assert_eq!(Value::Object(once.clone()), json!({"x__": 3}));
        assert_eq!(clean_attributes(&once, "_").unwrap(), once);
    }

    #[test]
    fn test_prune_keeps_nesting() {
        let pruned = prune_attributes(&attrs(json!({"a": {"b": 1}, "c": [], "__d": 1})));
        assert_eq!(Value::Object(pruned), json!({"a": {"b": 1}}));
    }
}
