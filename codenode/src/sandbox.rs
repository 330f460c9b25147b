//! Execution-strategy seam for sandboxed user code.
//!
//! Strategy variants decide how the code runs (external interpreter, worker,
//! test double); the output contract is enforced by shared default methods
//! built on the free functions in [`crate::core`]. Out-of-band output is
//! streamed through an explicit sink instead of an inherited emitter.

use serde_json::Value;
use thiserror::Error;

use crate::core::error::ValidationError;
use crate::core::normalize::{DefaultNormalizer, ItemNormalizer};
use crate::core::output_validator::{validate_all_items, validate_single_item};
use crate::core::text::TextPhrases;
use crate::core::types::JsonObject;

/// Sink for out-of-band output produced while the code runs (console lines,
/// streamed chunks).
pub type ChunkSink<'a> = &'a (dyn Fn(&str) + Send + Sync);

/// Failure modes when running sandboxed code.
///
/// The host needs the two arms kept apart: execution failures are attributed
/// to the runtime, validation failures to the user's returned data.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// The isolated runtime itself failed (spawn, timeout, malformed result).
    #[error(transparent)]
    Execution(#[from] anyhow::Error),
    /// The code ran but its output violates the item contract.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Capability interface implemented by execution strategy variants.
pub trait Sandbox {
    /// Noun phrases used in this runtime's diagnostics.
    fn phrases(&self) -> &TextPhrases;

    /// Normalization seam; the host engine may substitute its own routine.
    fn normalizer(&self) -> &dyn ItemNormalizer {
        &DefaultNormalizer
    }

    /// Run the code and return the raw, unvalidated result.
    ///
    /// `None` models a run that produced no result value.
    fn run_code(&self, on_chunk: Option<ChunkSink<'_>>) -> Result<Option<Value>, SandboxError>;

    /// Run for the whole input batch and validate the returned sequence.
    fn run_code_all_items(
        &self,
        on_chunk: Option<ChunkSink<'_>>,
    ) -> Result<Vec<JsonObject>, SandboxError> {
        let raw = self.run_code(on_chunk)?;
        Ok(validate_all_items(raw, self.normalizer(), self.phrases())?)
    }

    /// Run for one input item and validate the returned item.
    ///
    /// The strategy is already bound to that item's context; `item_index`
    /// attributes diagnostics to the right input row.
    fn run_code_each_item(
        &self,
        item_index: usize,
        on_chunk: Option<ChunkSink<'_>>,
    ) -> Result<JsonObject, SandboxError> {
        let raw = self.run_code(on_chunk)?;
        Ok(validate_single_item(
            raw,
            item_index,
            self.normalizer(),
            self.phrases(),
        )?)
    }
}
