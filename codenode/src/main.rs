//! Code-node sandbox harness CLI.
//!
//! Validates execution results against the item contract and, with a
//! configured interpreter, runs user code end to end.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;

use codenode::core::error::ValidationError;
use codenode::core::normalize::DefaultNormalizer;
use codenode::core::output_validator::{validate_all_items, validate_single_item};
use codenode::core::text::TextPhrases;
use codenode::core::types::JsonObject;
use codenode::exit_codes;
use codenode::io::config::{SandboxConfig, load_config, write_config};
use codenode::io::interpreter::InterpreterSandbox;
use codenode::logging;
use codenode::sandbox::{Sandbox, SandboxError};

#[derive(Parser)]
#[command(
    name = "codenode",
    version,
    about = "Validate and run code-node sandbox output"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default `codenode.toml` if missing.
    Init {
        /// Overwrite an existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Check a raw execution result JSON against the item contract.
    Validate {
        /// File holding the result JSON; reads stdin when omitted.
        file: Option<PathBuf>,
        /// Execution mode the result came from.
        #[arg(long, value_enum, default_value = "all")]
        mode: Mode,
        /// Input row index used for each-item diagnostics.
        #[arg(long, default_value_t = 0)]
        index: usize,
        /// Runtime whose wording diagnostics should use.
        #[arg(long, value_enum, default_value = "javascript")]
        language: Language,
    },
    /// Execute a code file through the configured interpreter and validate
    /// its output.
    Run {
        /// File holding the user code.
        code: PathBuf,
        /// JSON file with data-proxy bindings to expose to the code.
        #[arg(long)]
        bindings: Option<PathBuf>,
        /// Execution mode to validate against.
        #[arg(long, value_enum, default_value = "all")]
        mode: Mode,
        /// Input row index for each-item mode.
        #[arg(long, default_value_t = 0)]
        index: usize,
        /// Path to the runner config.
        #[arg(long, default_value = "codenode.toml")]
        config: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// One run produced the whole output batch.
    All,
    /// One run produced the output for a single input item.
    Each,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Language {
    Javascript,
    Python,
}

impl Language {
    fn phrases(self) -> TextPhrases {
        match self {
            Self::Javascript => TextPhrases::javascript(),
            Self::Python => TextPhrases::python(),
        }
    }
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Init { force } => cmd_init(force),
        Command::Validate {
            file,
            mode,
            index,
            language,
        } => cmd_validate(file.as_deref(), mode, index, language),
        Command::Run {
            code,
            bindings,
            mode,
            index,
            config,
        } => cmd_run(&code, bindings.as_deref(), mode, index, &config),
    }
}

fn cmd_init(force: bool) -> Result<i32> {
    let path = Path::new("codenode.toml");
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    write_config(path, &SandboxConfig::default())?;
    println!("wrote {}", path.display());
    Ok(exit_codes::OK)
}

fn cmd_validate(
    file: Option<&Path>,
    mode: Mode,
    index: usize,
    language: Language,
) -> Result<i32> {
    let result = read_result(file)?;
    let phrases = language.phrases();

    let outcome = match mode {
        Mode::All => validate_all_items(result, &DefaultNormalizer, &phrases),
        Mode::Each => validate_single_item(result, index, &DefaultNormalizer, &phrases)
            .map(|item| vec![item]),
    };

    match outcome {
        Ok(items) => print_items(&items),
        Err(err) => {
            report_validation_error(&err);
            Ok(exit_codes::VALIDATION_FAILED)
        }
    }
}

fn cmd_run(
    code: &Path,
    bindings: Option<&Path>,
    mode: Mode,
    index: usize,
    config: &Path,
) -> Result<i32> {
    let cfg = load_config(config)?;
    let code_text =
        std::fs::read_to_string(code).with_context(|| format!("read code {}", code.display()))?;
    let bindings = read_bindings(bindings)?;
    let workdir = std::env::current_dir().context("resolve working directory")?;

    let sandbox = InterpreterSandbox::new(&cfg, workdir, code_text, bindings);
    let sink = |line: &str| eprintln!("{line}");

    let outcome = match mode {
        Mode::All => sandbox.run_code_all_items(Some(&sink)),
        Mode::Each => sandbox
            .run_code_each_item(index, Some(&sink))
            .map(|item| vec![item]),
    };

    match outcome {
        Ok(items) => print_items(&items),
        Err(SandboxError::Validation(err)) => {
            report_validation_error(&err);
            Ok(exit_codes::VALIDATION_FAILED)
        }
        Err(SandboxError::Execution(err)) => Err(err),
    }
}

/// Read the raw result JSON; empty input models an absent result.
fn read_result(file: Option<&Path>) -> Result<Option<Value>> {
    let contents = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("read result {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("read result from stdin")?;
            buf
        }
    };
    let trimmed = contents.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value = serde_json::from_str(trimmed).context("parse result JSON")?;
    Ok(Some(value))
}

fn read_bindings(file: Option<&Path>) -> Result<JsonObject> {
    let Some(path) = file else {
        return Ok(JsonObject::new());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("read bindings {}", path.display()))?;
    let value: Value =
        serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => bail!("bindings file must contain a JSON object"),
    }
}

fn print_items(items: &[JsonObject]) -> Result<i32> {
    println!(
        "{}",
        serde_json::to_string_pretty(items).context("serialize items")?
    );
    Ok(exit_codes::OK)
}

fn report_validation_error(err: &ValidationError) {
    match err.item_index {
        Some(index) => eprintln!("validation failed at item {index}: {}", err.message),
        None => eprintln!("validation failed: {}", err.message),
    }
    eprintln!("{}", err.description);
}
