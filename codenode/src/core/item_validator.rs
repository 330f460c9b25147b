//! Structural checks on a normalized item's recognized fields.

use serde_json::Value;

use crate::core::error::{ErrorCause, ValidationError};
use crate::core::text::{NounKind, NounOptions, TextPhrases};
use crate::core::types::JsonObject;

/// Validate that `json` (and `binary`, when present) are structured objects.
///
/// `json` must be defined and must not be null, an array, or a primitive.
/// No other fields are inspected here.
pub fn validate_item(
    item: &JsonObject,
    item_index: usize,
    phrases: &TextPhrases,
) -> Result<(), ValidationError> {
    if !matches!(item.get("json"), Some(Value::Object(_))) {
        return Err(malformed_field(
            ErrorCause::MalformedJsonField,
            "json",
            item_index,
            phrases,
        ));
    }

    if let Some(binary) = item.get("binary")
        && !binary.is_object()
    {
        return Err(malformed_field(
            ErrorCause::MalformedBinaryField,
            "binary",
            item_index,
            phrases,
        ));
    }

    Ok(())
}

fn malformed_field(
    cause: ErrorCause,
    field: &str,
    item_index: usize,
    phrases: &TextPhrases,
) -> ValidationError {
    let noun = phrases.noun(
        NounKind::Object,
        NounOptions {
            include_article: true,
            plural: false,
        },
    );
    ValidationError::new(
        cause,
        format!("A '{field}' property isn't {noun}"),
        format!("In the returned data, every key named '{field}' must point to {noun}."),
        Some(item_index),
    )
}
