//! Entry points that validate what user code returned.
//!
//! Both entry points run classification, normalization (via the external
//! [`ItemNormalizer`] seam), item validation, and top-level key guarding in
//! that order, short-circuiting on the first violation. Index order is the
//! only determinism guarantee: "first offender" means lowest item index.

use serde_json::Value;

use crate::core::error::{ErrorCause, ValidationError};
use crate::core::item_validator::validate_item;
use crate::core::key_guard::guard_top_level_keys;
use crate::core::normalize::ItemNormalizer;
use crate::core::text::{NounKind, NounOptions, TextPhrases};
use crate::core::types::{JsonObject, has_reserved_key};

/// Validate the result of running code once for a single input item.
///
/// `None` models an absent return value, which is invalid in this mode.
pub fn validate_single_item<N: ItemNormalizer + ?Sized>(
    result: Option<Value>,
    item_index: usize,
    normalizer: &N,
    phrases: &TextPhrases,
) -> Result<JsonObject, ValidationError> {
    let value = match result {
        // Null passes the structured-value gate and is rejected later by the
        // item validator, matching the runtime's loose typing.
        Some(value @ (Value::Object(_) | Value::Array(_) | Value::Null)) => value,
        other => return Err(non_object_single(other, item_index, phrases)),
    };

    if let Value::Array(elements) = &value {
        return Err(unexpected_array(elements, item_index, phrases));
    }

    let item = normalizer
        .normalize_items(Some(Value::Array(vec![value])))
        .into_iter()
        .next()
        .unwrap_or_default();

    validate_item(&item, item_index, phrases)?;
    guard_top_level_keys(&item, item_index)?;
    Ok(item)
}

/// Validate the result of running code once over the whole input batch.
///
/// `None` models an absent return value and yields zero items. When at least
/// one array element carries a reserved key, every element is key-guarded
/// before normalization; otherwise elements are assumed to be raw payloads
/// for the normalizer to wrap.
pub fn validate_all_items<N: ItemNormalizer + ?Sized>(
    result: Option<Value>,
    normalizer: &N,
    phrases: &TextPhrases,
) -> Result<Vec<JsonObject>, ValidationError> {
    match &result {
        None | Some(Value::Object(_) | Value::Null) => {}
        Some(Value::Array(elements)) => {
            let must_have_reserved_key = elements
                .iter()
                .any(|element| element.as_object().is_some_and(has_reserved_key));
            if must_have_reserved_key {
                for (index, element) in elements.iter().enumerate() {
                    if let Value::Object(item) = element {
                        guard_top_level_keys(item, index)?;
                    }
                }
            }
        }
        Some(_) => {
            let nouns = phrases.noun(
                NounKind::Object,
                NounOptions {
                    include_article: false,
                    plural: true,
                },
            );
            return Err(ValidationError::new(
                ErrorCause::NonObjectResult,
                "Code doesn't return items properly",
                format!(
                    "Please return an array of {nouns}, one for each item you would like to output."
                ),
                None,
            ));
        }
    }

    let items = normalizer.normalize_items(result);
    for (index, item) in items.iter().enumerate() {
        validate_item(item, index, phrases)?;
    }
    Ok(items)
}

fn non_object_single(
    result: Option<Value>,
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
        ErrorCause::NonObjectResult,
        format!("Code doesn't return {noun}"),
        format!(
            "Please return {noun} representing the output item. \
             ('{}' was returned instead.)",
            display_value(result.as_ref())
        ),
        Some(item_index),
    )
}

fn unexpected_array(
    elements: &[Value],
    item_index: usize,
    phrases: &TextPhrases,
) -> ValidationError {
    let noun = phrases.noun(NounKind::Object, NounOptions::default());
    // Only the first element's type tag drives the sentence; mixed-type
    // arrays are reported by their first element.
    let first_sentence = match elements.first() {
        Some(first) => format!("An array of {}s was returned.", type_tag(first)),
        None => "An empty array was returned.".to_string(),
    };
    ValidationError::new(
        ErrorCause::UnexpectedArray,
        format!("Code doesn't return a single {noun}"),
        format!(
            "{first_sentence} If you need to output multiple items, \
             please use the 'Run Once for All Items' mode instead."
        ),
        Some(item_index),
    )
}

/// Run-time type tag of a value, in the source runtime's loose terms.
fn type_tag(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Null | Value::Array(_) | Value::Object(_) => "object",
    }
}

/// Literal rendering of the returned value for diagnostics.
fn display_value(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}
