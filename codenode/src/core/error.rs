//! Typed validation failures surfaced to the host pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable cause of a [`ValidationError`].
///
/// The host distinguishes [`ErrorCause::ReservedKeyCollision`] from the
/// generic causes to render its specialized guidance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCause {
    /// The top-level return value is not a structured value.
    NonObjectResult,
    /// An array was returned where a single item was expected.
    UnexpectedArray,
    /// A `json` field is present but not a structured object.
    MalformedJsonField,
    /// A `binary` field is present but not a structured object.
    MalformedBinaryField,
    /// An item mixes a reserved key with an unrecognized key.
    ReservedKeyCollision,
    /// An item has an unrecognized key and no reserved key present.
    UnknownTopLevelKey,
}

/// A structural violation in user-code output.
///
/// Every violation is fatal to the validation call that detected it. The
/// `description` may contain simple markup; final presentation (e.g. as a
/// node execution failure attributed to an input row) is the host's concern.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub message: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_index: Option<usize>,
    pub cause: ErrorCause,
}

impl ValidationError {
    pub fn new(
        cause: ErrorCause,
        message: impl Into<String>,
        description: impl Into<String>,
        item_index: Option<usize>,
    ) -> Self {
        Self {
            message: message.into(),
            description: description.into(),
            item_index,
            cause,
        }
    }

    /// Raised when an item mixes a reserved key with an unknown key.
    ///
    /// Signals that the user likely meant to nest data under `json` but
    /// added it as a sibling of a recognized key instead.
    pub fn reserved_key_found(reserved_key: &str, item_index: usize) -> Self {
        Self {
            message: "Invalid output format".to_string(),
            description: format!(
                "An output item contains the reserved key <code>{reserved_key}</code>. \
                 To output this data, move it inside the item's <code>json</code> object instead."
            ),
            item_index: Some(item_index),
            cause: ErrorCause::ReservedKeyCollision,
        }
    }

    pub fn is_reserved_key_collision(&self) -> bool {
        self.cause == ErrorCause::ReservedKeyCollision
    }
}
