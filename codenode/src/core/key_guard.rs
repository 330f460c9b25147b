//! Detection of payload keys placed beside `json` instead of under it.

use crate::core::error::{ErrorCause, ValidationError};
use crate::core::types::{JsonObject, is_reserved_key};

/// Check an item's own top-level keys against the reserved key set.
///
/// Keys partition into reserved and unknown. No unknown keys: pass. Unknown
/// keys next to a reserved key: reserved-key collision naming the first
/// reserved key in iteration order. Unknown keys only: generic error naming
/// the first unknown key. "First" is insertion order over the item's keys.
pub fn guard_top_level_keys(item: &JsonObject, item_index: usize) -> Result<(), ValidationError> {
    let mut first_reserved: Option<&str> = None;
    let mut first_unknown: Option<&str> = None;

    for key in item.keys() {
        if is_reserved_key(key) {
            if first_reserved.is_none() {
                first_reserved = Some(key.as_str());
            }
        } else if first_unknown.is_none() {
            first_unknown = Some(key.as_str());
        }
    }

    let Some(unknown) = first_unknown else {
        return Ok(());
    };

    if let Some(reserved) = first_reserved {
        return Err(ValidationError::reserved_key_found(reserved, item_index));
    }

    Err(ValidationError::new(
        ErrorCause::UnknownTopLevelKey,
        format!("Unknown top-level item key: {unknown}"),
        "Access the properties of an item under `.json`, e.g. `item.json`",
        Some(item_index),
    ))
}
