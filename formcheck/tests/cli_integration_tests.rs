// formcheck/tests/cli_integration_tests.rs
//! Integration tests for the `formcheck` executable.
//!
//! Each test writes a YAML rule set to a temporary file, feeds a JSON payload
//! on stdin and checks stdout and the exit code: 0 valid, 1 invalid, 2 for a
//! broken rule set or unreadable input.

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;
use test_log::test;

const CONTACT_RULES: &str = r#"
rules:
  name:
    required: true
  email:
    required: true
    email: ~
  phone:
    mindigits: 7
messages:
  name:
    required: "Tell us your name."
"#;

fn rules_file(content: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(content.as_bytes())?;
    Ok(file)
}

fn formcheck() -> Command {
    let mut cmd = Command::cargo_bin("formcheck").unwrap();
    cmd.env("RUST_LOG", "debug");
    cmd.env_remove("FORMCHECK_METHOD");
    cmd
}

#[test]
fn test_valid_payload_exits_zero() -> Result<()> {
    let rules = rules_file(CONTACT_RULES)?;
    formcheck()
        .args(["validate", "--rules"])
        .arg(rules.path())
        .write_stdin(r#"{"name": "Ada", "email": "ada@example.com", "phone": "555-0199"}"#)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Form is valid."));
    Ok(())
}

#[test]
fn test_invalid_payload_lists_errors_and_exits_one() -> Result<()> {
    let rules = rules_file(CONTACT_RULES)?;
    formcheck()
        .args(["validate", "--rules"])
        .arg(rules.path())
        .write_stdin(r#"{"name": "", "email": "ada@", "phone": "12"}"#)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Form has 3 invalid field(s)."))
        .stdout(predicate::str::contains("Tell us your name."))
        .stdout(predicate::str::contains("Please enter a valid email address."))
        .stdout(predicate::str::contains("Please enter at least 7 digits."));
    Ok(())
}

#[test]
fn test_json_report() -> Result<()> {
    let rules = rules_file(CONTACT_RULES)?;
    let output = formcheck()
        .args(["validate", "--format", "json", "--rules"])
        .arg(rules.path())
        .write_stdin(r#"{"name": "O\\'Brien", "email": "x", "phone": "5550199"}"#)
        .arg("--strip-slashes")
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["submitted"], true);
    assert_eq!(report["valid"], false);
    assert_eq!(report["errors"]["email"], "Please enter a valid email address.");
    assert!(report["errors"].get("name").is_none());
    // Passing fields hold the raw submitted value.
    assert_eq!(report["clean"]["name"], r"O\'Brien");
    // Failing fields keep the sanitized value.
    assert_eq!(report["clean"]["email"], "x");
    Ok(())
}

#[test]
fn test_payload_from_input_file() -> Result<()> {
    let rules = rules_file(CONTACT_RULES)?;
    let payload = rules_file(r#"{"name": "Ada", "email": "ada@example.com"}"#)?;
    formcheck()
        .args(["validate", "--rules"])
        .arg(rules.path())
        .arg("--input")
        .arg(payload.path())
        .assert()
        .code(0);
    Ok(())
}

#[test]
fn test_get_request_is_not_a_submission() -> Result<()> {
    let rules = rules_file(CONTACT_RULES)?;
    formcheck()
        .args(["validate", "--method", "GET", "--rules"])
        .arg(rules.path())
        .write_stdin("{}")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("No submission"));
    Ok(())
}

#[test]
fn test_get_request_skips_rule_resolution() -> Result<()> {
    let rules = rules_file("rules:\n  phone:\n    telephone: true\n")?;
    formcheck()
        .args(["validate", "--method", "GET", "--rules"])
        .arg(rules.path())
        .write_stdin("{}")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("No submission"))
        .stderr(predicate::str::contains("Unknown validation rule").not());
    Ok(())
}

#[test]
fn test_unknown_rule_is_a_configuration_error() -> Result<()> {
    let rules = rules_file("rules:\n  phone:\n    telephone: true\n")?;
    formcheck()
        .args(["validate", "--rules"])
        .arg(rules.path())
        .write_stdin(r#"{"phone": "555"}"#)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown validation rule: telephone"));
    Ok(())
}

#[test]
fn test_malformed_payload_is_a_usage_error() -> Result<()> {
    let rules = rules_file(CONTACT_RULES)?;
    formcheck()
        .args(["validate", "--rules"])
        .arg(rules.path())
        .write_stdin("not json")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to parse JSON payload"));
    Ok(())
}

#[test]
fn test_missing_form_name() {
    formcheck()
        .args(["validate", "--rules", "no-such-form-7d1e"])
        .write_stdin("{}")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_rules_command_lists_builtins() {
    formcheck()
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("rangelength"))
        .stdout(predicate::str::contains("mindigits"));
}

#[test]
fn test_quiet_suppresses_logs() -> Result<()> {
    let rules = rules_file(CONTACT_RULES)?;
    formcheck()
        .args(["--quiet", "validate", "--rules"])
        .arg(rules.path())
        .write_stdin(r#"{"name": "Ada", "email": "ada@example.com"}"#)
        .assert()
        .code(0)
        .stderr(predicate::str::is_empty());
    Ok(())
}
