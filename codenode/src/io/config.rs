//! Sandbox runner configuration stored in `codenode.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::text::TextPhrases;

/// Runner configuration (TOML).
///
/// This file is intended to be edited by humans and must remain stable and
/// automatable. Missing fields default to sensible values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SandboxConfig {
    /// Wall-clock budget for one sandbox execution, in seconds.
    pub exec_timeout_secs: u64,

    /// Truncate captured interpreter output beyond this many bytes.
    pub output_limit_bytes: usize,

    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Interpreter command that evaluates user code. It receives the
    /// execution envelope on stdin and writes the result JSON to stdout.
    pub command: Vec<String>,

    /// Language the runtime evaluates; selects diagnostic wording.
    pub language: RuntimeLanguage,
}

/// Supported sandbox runtimes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeLanguage {
    Javascript,
    Python,
}

impl RuntimeLanguage {
    pub fn phrases(self) -> TextPhrases {
        match self {
            Self::Javascript => TextPhrases::javascript(),
            Self::Python => TextPhrases::python(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command: vec!["node".to_string(), "sandbox/entry.js".to_string()],
            language: RuntimeLanguage::Javascript,
        }
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            exec_timeout_secs: 60,
            output_limit_bytes: 1_000_000,
            runtime: RuntimeConfig::default(),
        }
    }
}

impl SandboxConfig {
    pub fn validate(&self) -> Result<()> {
        if self.exec_timeout_secs == 0 {
            return Err(anyhow!("exec_timeout_secs must be > 0"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        if self.runtime.command.is_empty() || self.runtime.command[0].trim().is_empty() {
            return Err(anyhow!("runtime.command must be a non-empty array"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `SandboxConfig::default()`.
pub fn load_config(path: &Path) -> Result<SandboxConfig> {
    if !path.exists() {
        let cfg = SandboxConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SandboxConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &SandboxConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');

    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, &buf)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
