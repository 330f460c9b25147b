//! Canonical item coercion.
//!
//! The host engine owns the real normalization routine; validation only
//! decides when to invoke it and what to do with violations before and
//! after. The [`ItemNormalizer`] trait is that narrow seam, and
//! [`DefaultNormalizer`] reproduces the engine's coercion rules for
//! standalone use and tests.

use serde_json::Value;

use crate::core::types::{JsonObject, has_reserved_key};

/// Coerces arbitrary return shapes into canonical items.
pub trait ItemNormalizer {
    /// Normalize a raw execution result into a sequence of items.
    ///
    /// `None` models an absent result and yields zero items.
    fn normalize_items(&self, raw: Option<Value>) -> Vec<JsonObject>;
}

/// Engine coercion rules: an absent result is zero items, a single value is
/// a one-element sequence, elements already carrying a reserved key pass
/// through unchanged, and bare payloads are wrapped under `json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNormalizer;

impl ItemNormalizer for DefaultNormalizer {
    fn normalize_items(&self, raw: Option<Value>) -> Vec<JsonObject> {
        let Some(raw) = raw else {
            return Vec::new();
        };
        match raw {
            Value::Array(elements) => elements.into_iter().map(into_item).collect(),
            other => vec![into_item(other)],
        }
    }
}

fn into_item(value: Value) -> JsonObject {
    match value {
        Value::Object(map) if has_reserved_key(&map) => map,
        other => {
            let mut item = JsonObject::new();
            item.insert("json".to_string(), other);
            item
        }
    }
}
