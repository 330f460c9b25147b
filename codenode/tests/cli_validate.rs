//! CLI tests for `codenode validate` and `codenode run`.
//!
//! Spawns the codenode binary and verifies exit codes match expected values
//! for valid, contract-violating, and malformed inputs.

use std::fs;
use std::process::Command;

use codenode::exit_codes;

#[test]
fn validate_accepts_a_well_formed_batch() {
    let temp = tempfile::tempdir().expect("tempdir");
    let result_path = temp.path().join("result.json");
    fs::write(&result_path, r#"[{"json":{"a":1}},{"json":{"b":2}}]"#).expect("write result");

    let status = Command::new(env!("CARGO_BIN_EXE_codenode"))
        .arg("validate")
        .arg(&result_path)
        .status()
        .expect("codenode validate");

    assert_eq!(status.code(), Some(exit_codes::OK));
}

#[test]
fn validate_rejects_a_primitive_in_each_mode() {
    let temp = tempfile::tempdir().expect("tempdir");
    let result_path = temp.path().join("result.json");
    fs::write(&result_path, "42").expect("write result");

    let status = Command::new(env!("CARGO_BIN_EXE_codenode"))
        .arg("validate")
        .arg(&result_path)
        .args(["--mode", "each"])
        .status()
        .expect("codenode validate");

    assert_eq!(status.code(), Some(exit_codes::VALIDATION_FAILED));
}

#[test]
fn validate_rejects_a_reserved_key_collision() {
    let temp = tempfile::tempdir().expect("tempdir");
    let result_path = temp.path().join("result.json");
    fs::write(&result_path, r#"[{"json":{},"extra":1}]"#).expect("write result");

    let output = Command::new(env!("CARGO_BIN_EXE_codenode"))
        .arg("validate")
        .arg(&result_path)
        .output()
        .expect("codenode validate");

    assert_eq!(output.status.code(), Some(exit_codes::VALIDATION_FAILED));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid output format"));
    assert!(stderr.contains("item 0"));
}

#[test]
fn validate_errors_on_malformed_json_input() {
    let temp = tempfile::tempdir().expect("tempdir");
    let result_path = temp.path().join("result.json");
    fs::write(&result_path, "{ not json").expect("write result");

    let status = Command::new(env!("CARGO_BIN_EXE_codenode"))
        .arg("validate")
        .arg(&result_path)
        .status()
        .expect("codenode validate");

    assert_eq!(status.code(), Some(exit_codes::INVALID));
}

#[test]
fn run_executes_the_configured_interpreter() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config_path = temp.path().join("codenode.toml");
    fs::write(
        &config_path,
        r#"
exec_timeout_secs = 5
[runtime]
command = ["sh", "-c", "cat >/dev/null; printf '[{\"json\":{\"ran\":true}}]'"]
"#,
    )
    .expect("write config");
    let code_path = temp.path().join("code.js");
    fs::write(&code_path, "return items").expect("write code");

    let output = Command::new(env!("CARGO_BIN_EXE_codenode"))
        .arg("run")
        .arg(&code_path)
        .arg("--config")
        .arg(&config_path)
        .current_dir(temp.path())
        .output()
        .expect("codenode run");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"ran\": true"));
}

#[test]
fn run_reports_contract_violations_from_the_interpreter() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config_path = temp.path().join("codenode.toml");
    fs::write(
        &config_path,
        r#"
exec_timeout_secs = 5
[runtime]
command = ["sh", "-c", "cat >/dev/null; printf '\"oops\"'"]
"#,
    )
    .expect("write config");
    let code_path = temp.path().join("code.js");
    fs::write(&code_path, "return 'oops'").expect("write code");

    let status = Command::new(env!("CARGO_BIN_EXE_codenode"))
        .arg("run")
        .arg(&code_path)
        .arg("--config")
        .arg(&config_path)
        .current_dir(temp.path())
        .status()
        .expect("codenode run");

    assert_eq!(status.code(), Some(exit_codes::VALIDATION_FAILED));
}
