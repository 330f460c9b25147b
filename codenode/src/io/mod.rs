//! Side-effecting operations: interpreter subprocess and configuration.
//!
//! Everything that touches the filesystem or spawns processes lives here,
//! isolated from [`crate::core`] to enable mocking in tests.

pub mod config;
pub mod interpreter;
pub mod process;
