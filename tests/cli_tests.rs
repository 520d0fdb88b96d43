//! Integration tests for the CLI interface
//!
//! Runs the `regform` binary against the birth form fixture

mod common;

use assert_cmd::Command;
use common::fixture_path;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn regform() -> Command {
    Command::cargo_bin("regform").unwrap()
}

fn write_json(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_cli_help() {
    regform()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("mutate"))
        .stdout(predicate::str::contains("query"));
}

#[test]
fn test_invalid_command() {
    regform()
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_validate_fixture() {
    let report = stdout_json(regform().arg("validate").arg(fixture_path("birth_form.json")));
    assert_eq!(report["valid"], json!(true));
    assert_eq!(report["event"], json!("birth"));
    assert_eq!(report["sections"], json!(6));
}

#[test]
fn test_validate_reports_unknown_operation() {
    let dir = TempDir::new().unwrap();
    let form = write_json(
        &dir,
        "form.json",
        &json!({"event": "birth", "sections": [{"id": "child", "groups": [{"id": "g", "fields": [
            {"name": "gender", "type": "TEXT", "mapping": {"mutation": {"operation": "genderCode"}}}
        ]}]}]}),
    );

    regform()
        .arg("validate")
        .arg(&form)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("genderCode"));
}

#[test]
fn test_missing_form_file() {
    regform()
        .arg("validate")
        .arg("/nonexistent/form.json")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot read form definition"));
}

#[test]
fn test_visible_fields() {
    let dir = TempDir::new().unwrap();
    let draft = write_json(
        &dir,
        "draft.json",
        &json!({"registration": {"presentAtBirthRegistration": "BOTH_PARENTS"}}),
    );

    let states = stdout_json(
        regform()
            .arg("visible")
            .arg(fixture_path("birth_form.json"))
            .arg("registration")
            .arg(&draft),
    );
    let informant = states
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["name"] == "informant")
        .unwrap();
    assert_eq!(informant["visible"], json!(true));
    assert_eq!(informant["required"], json!(true));
}

#[test]
fn test_unknown_section() {
    let dir = TempDir::new().unwrap();
    let draft = write_json(&dir, "draft.json", &json!({}));
    regform()
        .arg("visible")
        .arg(fixture_path("birth_form.json"))
        .arg("grandparents")
        .arg(&draft)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("grandparents"));
}

#[test]
fn test_mutate_then_query() {
    let dir = TempDir::new().unwrap();
    let draft = write_json(
        &dir,
        "draft.json",
        &json!({
            "registration": {"presentAtBirthRegistration": "BOTH_PARENTS", "informant": "MOTHER"},
            "mother": {"firstNamesEng": "Jane", "countryPermanent": "FAR", "districtPermanent": "Ibombo"}
        }),
    );

    let mutated = stdout_json(
        regform()
            .arg("mutate")
            .arg(fixture_path("birth_form.json"))
            .arg(&draft),
    );
    assert_eq!(mutated["failures"], json!([]));
    assert_eq!(mutated["bundle"]["informant"], json!({"relationship": "MOTHER"}));

    let bundle = write_json(&dir, "bundle.json", &mutated["bundle"]);
    let queried = stdout_json(
        regform()
            .arg("query")
            .arg(fixture_path("birth_form.json"))
            .arg(&bundle)
            .args(["--section", "mother"]),
    );
    assert_eq!(queried["values"]["firstNamesEng"], json!("Jane"));
    assert_eq!(queried["values"]["districtPermanent"], json!("Ibombo"));
}

#[test]
fn test_mutate_reports_failed_fields() {
    let dir = TempDir::new().unwrap();
    let draft = write_json(
        &dir,
        "draft.json",
        &json!({"mother": {"countryPermanent": "FAR", "chiefPermanent": {"bad": true}}}),
    );

    let mutated = stdout_json(
        regform()
            .arg("mutate")
            .arg(fixture_path("birth_form.json"))
            .arg(&draft)
            .args(["--section", "mother"]),
    );
    assert_eq!(mutated["failures"][0]["field"], json!("chiefPermanent"));
    assert_eq!(mutated["failures"][0]["code"], json!(3001));
}

#[test]
fn test_config_file_changes_default_country() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("regform.toml");
    fs::write(&config, "default_country = \"XYZ\"\n").unwrap();
    let draft = write_json(&dir, "draft.json", &json!({"mother": {"countryPermanent": "XYZ"}}));

    let states = stdout_json(
        regform()
            .arg("--config")
            .arg(&config)
            .arg("visible")
            .arg(fixture_path("birth_form.json"))
            .arg("mother")
            .arg(&draft),
    );
    let state = states
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["name"] == "statePermanent")
        .unwrap();
    assert_eq!(state["visible"], json!(true));
}
