//! Sandbox strategy backed by an external interpreter process.
//!
//! The isolation mechanism itself is external: the configured command owns
//! evaluating the user code. This adapter only drives it — it feeds the
//! execution envelope (`{"code": ..., "bindings": ...}`) to the child's
//! stdin, enforces the deadline and output bounds, and parses the child's
//! stdout as the raw result JSON (empty stdout means no result). Anything
//! the code prints for humans goes to stderr and is streamed to the chunk
//! sink line by line.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::core::text::TextPhrases;
use crate::core::types::JsonObject;
use crate::io::config::SandboxConfig;
use crate::io::process::run_with_deadline;
use crate::sandbox::{ChunkSink, Sandbox, SandboxError};

/// One sandbox execution bound to a piece of user code and its bindings.
pub struct InterpreterSandbox {
    command: Vec<String>,
    code: String,
    bindings: JsonObject,
    workdir: PathBuf,
    timeout: Duration,
    output_limit_bytes: usize,
    phrases: TextPhrases,
}

impl InterpreterSandbox {
    pub fn new(
        config: &SandboxConfig,
        workdir: impl Into<PathBuf>,
        code: impl Into<String>,
        bindings: JsonObject,
    ) -> Self {
        Self {
            command: config.runtime.command.clone(),
            code: code.into(),
            bindings,
            workdir: workdir.into(),
            timeout: Duration::from_secs(config.exec_timeout_secs),
            output_limit_bytes: config.output_limit_bytes,
            phrases: config.runtime.language.phrases(),
        }
    }

    #[instrument(skip_all, fields(timeout_secs = self.timeout.as_secs()))]
    fn exec(&self, on_chunk: Option<ChunkSink<'_>>) -> Result<Option<Value>> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| anyhow!("interpreter command is empty"))?;

        let envelope = json!({ "code": self.code, "bindings": self.bindings });
        let payload = serde_json::to_vec(&envelope).context("serialize execution envelope")?;

        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(&self.workdir);

        let output = run_with_deadline(
            cmd,
            Some(&payload),
            self.timeout,
            self.output_limit_bytes,
            on_chunk,
        )?;

        if output.timed_out {
            return Err(anyhow!("sandbox timed out after {:?}", self.timeout));
        }
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "interpreter exited with status {:?}: {}",
                output.status.code(),
                stderr.trim()
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let result = stdout.trim();
        if result.is_empty() {
            debug!("sandbox produced no result value");
            return Ok(None);
        }
        let value: Value = serde_json::from_str(result).context("parse sandbox result JSON")?;
        Ok(Some(value))
    }
}

impl Sandbox for InterpreterSandbox {
    fn phrases(&self) -> &TextPhrases {
        &self.phrases
    }

    fn run_code(&self, on_chunk: Option<ChunkSink<'_>>) -> Result<Option<Value>, SandboxError> {
        self.exec(on_chunk).map_err(SandboxError::Execution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorCause;
    use std::sync::Mutex;

    /// Build a sandbox whose "interpreter" is a shell one-liner. The real
    /// interpreter is external anyway; the adapter only cares about the
    /// stdin/stdout/stderr protocol.
    fn scripted(script: &str) -> InterpreterSandbox {
        let mut config = SandboxConfig::default();
        config.exec_timeout_secs = 5;
        config.runtime.command = vec!["sh".to_string(), "-c".to_string(), script.to_string()];
        InterpreterSandbox::new(&config, ".", "return items", JsonObject::new())
    }

    #[test]
    fn parses_stdout_as_result_and_validates() {
        let sandbox = scripted(r#"cat >/dev/null; printf '[{"json":{"ok":true}}]'"#);
        let items = sandbox.run_code_all_items(None).expect("items");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["json"]["ok"], serde_json::json!(true));
    }

    #[test]
    fn empty_stdout_means_zero_items_in_all_mode() {
        let sandbox = scripted("cat >/dev/null");
        let items = sandbox.run_code_all_items(None).expect("zero items");
        assert!(items.is_empty());
    }

    #[test]
    fn invalid_result_json_is_an_execution_error() {
        let sandbox = scripted("cat >/dev/null; printf 'not json'");
        let err = sandbox.run_code(None).expect_err("bad json");
        assert!(matches!(err, SandboxError::Execution(_)));
        assert!(err.to_string().contains("parse sandbox result JSON"));
    }

    #[test]
    fn nonzero_exit_is_an_execution_error_with_stderr() {
        let sandbox = scripted("cat >/dev/null; echo boom >&2; exit 3");
        let err = sandbox.run_code(None).expect_err("failed interpreter");
        let message = err.to_string();
        assert!(message.contains("status"));
        assert!(message.contains("boom"));
    }

    #[test]
    fn contract_violations_surface_as_validation_errors() {
        let sandbox = scripted(r#"cat >/dev/null; printf '"just a string"'"#);
        let err = sandbox.run_code_each_item(1, None).expect_err("bad output");
        match err {
            SandboxError::Validation(err) => {
                assert_eq!(err.cause, ErrorCause::NonObjectResult);
                assert_eq!(err.item_index, Some(1));
            }
            SandboxError::Execution(_) => panic!("expected validation error"),
        }
    }

    #[test]
    fn stderr_lines_stream_to_the_chunk_sink() {
        let seen: Mutex<Vec<String>> = Mutex::new(Vec::new());
        let sink = |line: &str| seen.lock().expect("lock").push(line.to_string());

        let sandbox = scripted("cat >/dev/null; echo progress >&2; printf '[]'");
        sandbox.run_code_all_items(Some(&sink)).expect("items");

        assert_eq!(*seen.lock().expect("lock"), vec!["progress".to_string()]);
    }

    #[test]
    fn envelope_reaches_the_interpreter_on_stdin() {
        // The "interpreter" echoes the envelope's bindings back as the result.
        let sandbox = {
            let mut config = SandboxConfig::default();
            config.exec_timeout_secs = 5;
            config.runtime.command = vec![
                "sh".to_string(),
                "-c".to_string(),
                "cat".to_string(),
            ];
            let mut bindings = JsonObject::new();
            bindings.insert("$itemIndex".to_string(), serde_json::json!(2));
            InterpreterSandbox::new(&config, ".", "return $json", bindings)
        };

        let raw = sandbox.run_code(None).expect("raw result").expect("value");
        assert_eq!(raw["code"], serde_json::json!("return $json"));
        assert_eq!(raw["bindings"]["$itemIndex"], serde_json::json!(2));
    }
}
