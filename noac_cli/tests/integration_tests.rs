//! Integration tests for the noac binary.
//!
//! These tests verify end-to-end behavior including:
//! - CrCl estimation and assessment output
//! - The valve override and alternatives listing
//! - Outcome logging and CSV export
//! - The interactive intake

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn cli() -> Command {
    Command::cargo_bin("noac").expect("Failed to find noac binary")
}

/// `assess` for a 65-year-old, 70 kg man with SCr 1.2 (CrCl 60.76)
fn assess(data_dir: &Path) -> Command {
    let mut cmd = cli();
    cmd.arg("assess")
        .arg("--data-dir")
        .arg(data_dir)
        .args(["--sex", "male", "--age", "65", "--weight", "70", "--scr", "1.2"]);
    cmd
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "NOAC selection and dosing decision support",
        ));
}

#[test]
fn test_crcl_command() {
    cli()
        .args(["crcl", "--sex", "female", "--age", "65", "--weight", "70", "--scr", "1.2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CrCl: 51.65 ml/min"));
}

#[test]
fn test_crcl_rejects_non_positive_weight() {
    cli()
        .args(["crcl", "--sex", "male", "--age", "65", "--weight", "0", "--scr", "1.2"])
        .assert()
        .failure();
}

#[test]
fn test_assess_shows_dose_and_alternatives() {
    let temp_dir = setup_test_dir();

    assess(temp_dir.path())
        .args(["--indication", "af", "--drug", "dabigatran", "--no-log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("150 mg twice daily"))
        .stdout(predicate::str::contains("Alternatives:"))
        .stdout(predicate::str::contains("Apixaban"));
}

#[test]
fn test_assess_accepts_brand_names() {
    let temp_dir = setup_test_dir();

    assess(temp_dir.path())
        .args(["--indication", "af", "--drug", "Xarelto", "--no-log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("20 mg once daily"));
}

#[test]
fn test_unknown_drug_gets_warning_verdict() {
    let temp_dir = setup_test_dir();

    assess(temp_dir.path())
        .args(["--indication", "af", "--drug", "warfarin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: Warning"))
        .stdout(predicate::str::contains("Dose: Unknown"))
        .stdout(predicate::str::contains("Unable to evaluate."));

    assert!(!temp_dir.path().join("outcomes.jsonl").exists());
}

#[test]
fn test_unknown_drug_json() {
    let temp_dir = setup_test_dir();

    let output = assess(temp_dir.path())
        .args(["--indication", "vte", "--drug", "heparin", "--json", "--no-log"])
        .output()
        .expect("Failed to run noac");
    assert!(output.status.success());

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Output is not JSON");
    assert_eq!(report["drug"], "heparin");
    assert_eq!(report["verdict"]["status"], "warning");
    assert_eq!(report["verdict"]["recommended_dose"]["type"], "unknown");
    assert!(report["verdict"]["drug"].is_null());
}

#[test]
fn test_tube_feeding_warning() {
    let temp_dir = setup_test_dir();

    assess(temp_dir.path())
        .args(["--indication", "af", "--drug", "dabigatran", "--ng-tube", "--no-log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: Warning"))
        .stdout(predicate::str::contains("Dose: N/A"));
}

#[test]
fn test_valve_override_needs_no_drug() {
    let temp_dir = setup_test_dir();

    assess(temp_dir.path())
        .args(["--indication", "af", "--valve", "--no-log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("NOAC CONTRAINDICATED"))
        .stdout(predicate::str::contains("warfarin"));
}

#[test]
fn test_missing_drug_is_an_error_without_valve_override() {
    let temp_dir = setup_test_dir();

    assess(temp_dir.path())
        .args(["--indication", "vte", "--no-log"])
        .assert()
        .failure();
}

#[test]
fn test_json_output() {
    let temp_dir = setup_test_dir();

    let output = assess(temp_dir.path())
        .args(["--indication", "vte", "--drug", "edoxaban", "--json", "--no-log"])
        .output()
        .expect("Failed to run noac");
    assert!(output.status.success());

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Output is not JSON");
    assert_eq!(report["crcl_ml_min"], 60.76);
    assert_eq!(report["assessment"]["outcome"], "evaluated");
    assert_eq!(report["assessment"]["drug"], "edoxaban");
    assert_eq!(report["assessment"]["verdict"]["drug"], "edoxaban");
    assert_eq!(report["assessment"]["verdict"]["status"], "appropriate");
    assert_eq!(
        report["assessment"]["verdict"]["recommended_dose"]["label"],
        "60 mg once daily"
    );
    assert!(report["assessment"]["verdict"]["initial_treatment_note"].is_string());

    let alternatives = report["assessment"]["alternatives"]
        .as_array()
        .expect("alternatives array");
    let drugs: Vec<&str> = alternatives
        .iter()
        .map(|a| a["drug"].as_str().unwrap())
        .collect();
    assert_eq!(drugs, vec!["dabigatran", "rivaroxaban", "apixaban"]);
}

#[test]
fn test_outcome_logged_and_exported() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    assess(data_dir)
        .args(["--indication", "af", "--drug", "apixaban"])
        .assert()
        .success();
    assess(data_dir)
        .args(["--indication", "af", "--valve"])
        .assert()
        .success();

    let log = fs::read_to_string(data_dir.join("outcomes.jsonl")).expect("Failed to read log");
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("5 mg twice daily"));
    assert!(lines[1].contains("Warfarin Recommended (Valve Issue)"));

    cli()
        .arg("export")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 outcomes"));

    let csv = fs::read_to_string(data_dir.join("outcomes.csv")).expect("Failed to read CSV");
    assert_eq!(csv.lines().count(), 3);
}

#[test]
fn test_no_log_leaves_data_dir_empty() {
    let temp_dir = setup_test_dir();

    assess(temp_dir.path())
        .args(["--indication", "af", "--drug", "apixaban", "--no-log"])
        .assert()
        .success();

    assert!(!temp_dir.path().join("outcomes.jsonl").exists());
}

#[test]
fn test_config_can_disable_logging() {
    let temp_dir = setup_test_dir();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[outcome_log]\nenabled = false\n").unwrap();

    assess(temp_dir.path())
        .arg("--config")
        .arg(&config_path)
        .args(["--indication", "af", "--drug", "apixaban"])
        .assert()
        .success();

    assert!(!temp_dir.path().join("outcomes.jsonl").exists());
}

#[test]
fn test_export_without_log() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("export")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to export"));
}

#[test]
fn test_drugs_command() {
    cli()
        .arg("drugs")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dabigatran"))
        .stdout(predicate::str::contains("Eliquis"))
        .stdout(predicate::str::contains("Verapamil"));
}

#[test]
fn test_interactive_intake() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("intake")
        .arg("--data-dir")
        .arg(temp_dir.path())
        // invalid weight first, then a valid patient
        .write_stdin("male\n82\n-5\n1.6\nmale\n82\n58\n1.6\naf\nn\neliquis\nn\nn\nn\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("weight must be a positive number"))
        .stdout(predicate::str::contains("2.5 mg twice daily"));

    assert!(temp_dir.path().join("outcomes.jsonl").exists());
}

#[test]
fn test_interactive_intake_valve_short_circuit() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("intake")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .arg("--no-log")
        .write_stdin("female\n70\n60\n1.0\naf\ny\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("NOAC CONTRAINDICATED"))
        .stdout(predicate::str::contains("Drug:").not());
}

#[test]
fn test_interactive_intake_fails_on_eof() {
    cli()
        .arg("intake")
        .arg("--no-log")
        .write_stdin("male\n65\n")
        .assert()
        .failure();
}
