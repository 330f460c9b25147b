//! Test-only helpers for constructing output items.

use serde_json::Value;

use crate::core::types::JsonObject;

/// Build an item whose `json` field holds `value`.
pub fn item(value: Value) -> JsonObject {
    let mut item = JsonObject::new();
    item.insert("json".to_string(), value);
    item
}

/// Unwrap a `json!` object literal into a [`JsonObject`].
pub fn object(value: Value) -> JsonObject {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object literal, got {other}"),
    }
}
