//! Stable exit codes for codenode CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed due to invalid input, config, or a runtime error.
pub const INVALID: i32 = 1;
/// The code ran but its output violates the item contract.
pub const VALIDATION_FAILED: i32 = 2;
