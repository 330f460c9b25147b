//! Shared types for the sandbox output contract.
//!
//! These types define stable contracts between core components. They must
//! remain deterministic: key iteration order over a [`JsonObject`] is the
//! insertion order of the underlying map.

use serde_json::{Map, Value};

/// A structured key-value object, the canonical shape for items, `json`
/// payloads, and data-proxy bindings.
pub type JsonObject = Map<String, Value>;

/// Top-level keys recognized on an output item.
///
/// Fixed at startup, never mutated. `index` is accepted only for backward
/// compatibility with legacy producers.
pub const RESERVED_ITEM_KEYS: [&str; 5] = ["json", "binary", "pairedItem", "error", "index"];

/// True if `key` is a member of [`RESERVED_ITEM_KEYS`].
pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_ITEM_KEYS.contains(&key)
}

/// True if `item` carries at least one reserved top-level key.
pub fn has_reserved_key(item: &JsonObject) -> bool {
    item.keys().any(|key| is_reserved_key(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reserved_keys_are_recognized() {
        for key in ["json", "binary", "pairedItem", "error", "index"] {
            assert!(is_reserved_key(key), "{key} should be reserved");
        }
        assert!(!is_reserved_key("paired_item"));
        assert!(!is_reserved_key("data"));
    }

    #[test]
    fn detects_reserved_key_presence() {
        let with = json!({ "foo": 1, "json": {} });
        let without = json!({ "foo": 1, "bar": 2 });
        assert!(has_reserved_key(with.as_object().expect("object")));
        assert!(!has_reserved_key(without.as_object().expect("object")));
    }
}
