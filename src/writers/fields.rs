//! Option-returning accessors over untyped SBOM JSON.
//!
//! Writers never index into a `Value` directly: every lookup goes through
//! these helpers so a missing or mistyped field becomes either `None` or a
//! structural error, never a panic.

use crate::error::{Result, SbomGraphError};
use crate::model::{Attributes, NodeKind, Record};
use serde_json::{Map, Value};

/// Maximum length of a JSON excerpt quoted in error messages.
const SUMMARY_LIMIT: usize = 120;

/// Text of a scalar field. Strings are returned as-is, numbers and booleans
/// in their JSON spelling; null, arrays and objects yield `None`.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Scalar text of `fields[key]`, if present.
pub(crate) fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(scalar_text)
}

/// View a value as an object or fail with a structural error.
pub(crate) fn expect_object<'v>(value: &'v Value, what: &str) -> Result<&'v Map<String, Value>> {
    value.as_object().ok_or_else(|| {
        SbomGraphError::invalid_structure(format!("{what} is not an object: {}", summarize(value)))
    })
}

/// An array field that drives record structure.
///
/// Absent or null yields `Ok(None)`; any other non-array type is a structural
/// error because the writer cannot tell what the document meant.
pub(crate) fn list<'v>(fields: &'v Map<String, Value>, key: &str) -> Result<Option<&'v [Value]>> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items.as_slice())),
        Some(other) => Err(SbomGraphError::invalid_structure(format!(
            "'{key}' must be an array, found {}",
            summarize(other)
        ))),
    }
}

/// Copy of `fields` without the given keys, in original order.
pub(crate) fn without_keys(fields: &Map<String, Value>, excluded: &[&str]) -> Attributes {
    fields
        .iter()
        .filter(|(key, _)| !excluded.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Move the value at `from` to `to`, if present.
pub(crate) fn rename_key(attributes: &mut Attributes, from: &str, to: &str) {
    if let Some(value) = attributes.shift_remove(from) {
        attributes.insert(to.to_string(), value);
    }
}

/// Compact, length-limited JSON excerpt for diagnostics.
pub(crate) fn summarize(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() <= SUMMARY_LIMIT {
        text
    } else {
        let truncated: String = text.chars().take(SUMMARY_LIMIT).collect();
        format!("{truncated}...")
    }
}

/// Build a Reference record keyed by the value of `locator_key`.
///
/// References without a usable locator are skipped with a warning.
pub(crate) fn reference_record(reference: &Value, locator_key: &str) -> Option<Record> {
    let Some(fields) = reference.as_object() else {
        tracing::warn!("Skipping external reference that is not an object: {}", summarize(reference));
        return None;
    };
    let Some(locator) = text_field(fields, locator_key) else {
        tracing::warn!(
            "Skipping external reference without '{}': {}",
            locator_key,
            summarize(reference)
        );
        return None;
    };
    Some(Record::new(
        NodeKind::Reference,
        NodeKind::Reference.identity(&[&locator]),
        fields.clone(),
    ))
}
