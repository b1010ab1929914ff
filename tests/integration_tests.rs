//! Integration tests for the backcheck CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd. Each
//! test runs inside its own temp directory so project config files and
//! environment overrides never leak between tests.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get a backcheck command running in `dir`
fn backcheck(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("backcheck").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("BACKCHECK_FORMAT")
        .env_remove("BACKCHECK_WINDOW_MINUTES")
        .env_remove("BACKCHECK_ZERO_AQL_SUBSTITUTE")
        .env_remove("BACKCHECK_LOG");
    cmd
}

/// Run a command with `--format json` and parse stdout
fn json_output(dir: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = backcheck(dir)
        .args(args)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    backcheck(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("backward inspection"))
        .stdout(predicate::str::contains("stratify"));
}

#[test]
fn test_version_displays() {
    let tmp = TempDir::new().unwrap();
    backcheck(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("backcheck"));
}

#[test]
fn test_unknown_command_fails() {
    let tmp = TempDir::new().unwrap();
    backcheck(&tmp).arg("explode").assert().failure();
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    backcheck(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("backcheck"));
}

// ============================================================================
// Size Command Tests
// ============================================================================

#[test]
fn test_size_human_output() {
    let tmp = TempDir::new().unwrap();
    backcheck(&tmp)
        .args(["size", "--aql", "1", "--held", "10000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("459"))
        .stdout(predicate::str::contains("99%"));
}

#[test]
fn test_size_applies_population_correction() {
    let tmp = TempDir::new().unwrap();
    let value = json_output(
        &tmp,
        &["size", "--aql", "1", "--held", "1000", "--defect-rate", "0.5"],
    );
    assert_eq!(value["required_sample_size"], 459);
    assert_eq!(value["adjusted_sample_size"], 315);
    assert_eq!(value["expected_defects"], 1.6);
    assert_eq!(value["recommendation"], "consider_full_inspection");
}

#[test]
fn test_size_zero_aql_inspects_everything() {
    let tmp = TempDir::new().unwrap();
    let value = json_output(&tmp, &["size", "--aql", "0", "--held", "750"]);
    assert_eq!(value["policy"], "full_inspection");
    assert_eq!(value["adjusted_sample_size"], 750);
}

#[test]
fn test_size_expected_defects_round_half_to_even() {
    let tmp = TempDir::new().unwrap();
    let value = json_output(
        &tmp,
        &["size", "--aql", "6.5", "--held", "85", "--defect-rate", "1"],
    );
    assert_eq!(value["adjusted_sample_size"], 25);
    assert_eq!(value["expected_defects"], 0.2);
}

#[test]
fn test_iso_huge_rate_fails_cleanly() {
    let tmp = TempDir::new().unwrap();
    backcheck(&tmp)
        .args(["iso", "--rate", "1e30", "--aql", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("too large"));
}

#[test]
fn test_size_explicit_confidence() {
    let tmp = TempDir::new().unwrap();
    let value = json_output(
        &tmp,
        &["size", "--aql", "1", "--held", "100000", "--confidence", "95"],
    );
    assert_eq!(value["confidence"], "95");
    assert_eq!(value["required_sample_size"], 299);
}

#[test]
fn test_size_rejects_bad_percentage() {
    let tmp = TempDir::new().unwrap();
    backcheck(&tmp)
        .args(["size", "--aql", "150", "--held", "100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("percentage"));
}

#[test]
fn test_size_rejects_unknown_confidence() {
    let tmp = TempDir::new().unwrap();
    backcheck(&tmp)
        .args(["size", "--aql", "1", "--held", "100", "--confidence", "80"])
        .assert()
        .failure();
}

// ============================================================================
// Backward Command Tests
// ============================================================================

#[test]
fn test_backward_ratio_method() {
    let tmp = TempDir::new().unwrap();
    let value = json_output(
        &tmp,
        &["backward", "--defect-rate", "5", "--aql", "1", "--lot-size", "100000"],
    );
    assert_eq!(value["risk_tier"], "high");
    assert_eq!(value["base_sample_size"], 459);
    assert_eq!(value["total_samples"], 2295);
    assert!(value.get("rpn").is_none());
}

#[test]
fn test_backward_manual_method() {
    let tmp = TempDir::new().unwrap();
    let value = json_output(
        &tmp,
        &[
            "backward", "--defect-rate", "5", "--aql", "1", "--lot-size", "100000",
            "--method", "manual", "--multiplier", "2.5",
        ],
    );
    assert_eq!(value["total_samples"], 1148);
}

#[test]
fn test_backward_manual_requires_multiplier() {
    let tmp = TempDir::new().unwrap();
    backcheck(&tmp)
        .args([
            "backward", "--defect-rate", "5", "--aql", "1", "--lot-size", "1000",
            "--method", "manual",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--multiplier"));
}

#[test]
fn test_backward_fmea_method() {
    let tmp = TempDir::new().unwrap();
    let value = json_output(
        &tmp,
        &[
            "backward", "--defect-rate", "0.5", "--aql", "1", "--lot-size", "100000",
            "--method", "fmea", "-S", "8", "-O", "5", "-D", "4",
        ],
    );
    assert_eq!(value["rpn"], 160);
    assert_eq!(value["risk_tier"], "high");
}

#[test]
fn test_backward_fmea_rating_out_of_range() {
    let tmp = TempDir::new().unwrap();
    backcheck(&tmp)
        .args([
            "backward", "--defect-rate", "1", "--aql", "1", "--lot-size", "1000",
            "--method", "fmea", "-S", "11", "-O", "5", "-D", "4",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("rating"));
}

#[test]
fn test_backward_human_shows_tier() {
    let tmp = TempDir::new().unwrap();
    backcheck(&tmp)
        .args(["backward", "--defect-rate", "5", "--aql", "1", "--lot-size", "100000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Risk tier high"))
        .stdout(predicate::str::contains("2295"));
}

// ============================================================================
// Pattern Command Tests
// ============================================================================

#[test]
fn test_pattern_clustered() {
    let tmp = TempDir::new().unwrap();
    let value = json_output(
        &tmp,
        &[
            "pattern", "--defects", "5", "--checked", "100", "--aql", "1",
            "--pattern", "clustered", "--units-per-container", "10",
            "--production-rate", "50",
        ],
    );
    assert_eq!(value["boxes_to_check"], 200);
    assert_eq!(value["total_samples"], 2000);
    assert_eq!(value["hours_to_check_back"], 4.0);
    assert_eq!(value["strategy"], "focused");
    assert_eq!(value["zero_aql_substituted"], false);
}

#[test]
fn test_pattern_requires_units_per_container() {
    let tmp = TempDir::new().unwrap();
    backcheck(&tmp)
        .args([
            "pattern", "--defects", "5", "--checked", "100", "--aql", "1",
            "--production-rate", "50",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("units-per-container"));
}

#[test]
fn test_pattern_zero_checked_fails() {
    let tmp = TempDir::new().unwrap();
    backcheck(&tmp)
        .args([
            "pattern", "--defects", "0", "--checked", "0", "--aql", "1",
            "--units-per-container", "10", "--production-rate", "50",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("zero checked samples"));
}

#[test]
fn test_pattern_zero_aql_is_flagged() {
    let tmp = TempDir::new().unwrap();
    let value = json_output(
        &tmp,
        &[
            "pattern", "--defects", "5", "--checked", "100", "--aql", "0",
            "--units-per-container", "10", "--production-rate", "50",
        ],
    );
    assert_eq!(value["zero_aql_substituted"], true);
    assert_eq!(value["base_sample_size"], 4603);
}

#[test]
fn test_pattern_reads_config_defaults() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".backcheck.yaml"), "units_per_container: 10\n").unwrap();

    let value = json_output(
        &tmp,
        &[
            "pattern", "--defects", "5", "--checked", "100", "--aql", "1",
            "--pattern", "random", "--production-rate", "100",
        ],
    );
    assert_eq!(value["units_per_container"], 10);
    assert_eq!(value["total_samples"], 10000);
}

// ============================================================================
// ISO Command Tests
// ============================================================================

#[test]
fn test_iso_from_production_rate() {
    let tmp = TempDir::new().unwrap();
    let value = json_output(&tmp, &["iso", "--rate", "500", "--aql", "1"]);
    assert_eq!(value["products_per_interval"], 250);
    assert_eq!(value["total_samples"], 128);
    assert_eq!(value["intervals"].as_array().unwrap().len(), 4);
    assert_eq!(value["intervals"][0]["lot_code"], "G");
    assert_eq!(value["intervals"][2]["aql"], 1.5);
}

#[test]
fn test_iso_tightened_level() {
    let tmp = TempDir::new().unwrap();
    let value = json_output(
        &tmp,
        &["iso", "--rate", "500", "--aql", "1", "--level", "tightened"],
    );
    assert_eq!(value["intervals"][0]["sample_size"], 39);
}

#[test]
fn test_iso_dispositions() {
    let tmp = TempDir::new().unwrap();
    backcheck(&tmp)
        .args(["iso", "--rate", "500", "--aql", "1", "--defects", "0,2,0,3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hold interval(s) 2, 4"));
}

#[test]
fn test_iso_csv_has_one_row_per_interval() {
    let tmp = TempDir::new().unwrap();
    let output = backcheck(&tmp)
        .args(["iso", "--rate", "500", "--aql", "1", "--format", "csv"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("interval,time_range,lot_code"));
    assert!(lines[1].starts_with("1,0-30 min,G,1%,32"));
}

#[test]
fn test_iso_requires_a_source() {
    let tmp = TempDir::new().unwrap();
    backcheck(&tmp)
        .args(["iso", "--aql", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--rate or --lot-size"));
}

#[test]
fn test_iso_rate_conflicts_with_lot_size() {
    let tmp = TempDir::new().unwrap();
    backcheck(&tmp)
        .args(["iso", "--rate", "500", "--lot-size", "1000", "--aql", "1"])
        .assert()
        .failure();
}

#[test]
fn test_iso_interval_count_bounds() {
    let tmp = TempDir::new().unwrap();
    backcheck(&tmp)
        .args(["iso", "--rate", "500", "--aql", "1", "--intervals", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("interval count"));
}

#[test]
fn test_iso_window_from_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".backcheck.yaml"), "window_minutes: 240\n").unwrap();

    let value = json_output(&tmp, &["iso", "--rate", "500", "--aql", "1"]);
    assert_eq!(value["slice_minutes"], 60.0);
    assert_eq!(value["products_per_interval"], 500);
}

// ============================================================================
// Stratify Command Tests
// ============================================================================

#[test]
fn test_stratify_critical_allocation() {
    let tmp = TempDir::new().unwrap();
    let value = json_output(&tmp, &["stratify", "--budget", "200", "--aql", "0.65"]);
    let sizes: Vec<u64> = value["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["sample_size"].as_u64().unwrap())
        .collect();
    assert_eq!(sizes, vec![115, 52, 23, 10]);
}

#[test]
fn test_stratify_csv() {
    let tmp = TempDir::new().unwrap();
    backcheck(&tmp)
        .args([
            "stratify", "--budget", "200", "--aql", "0.65", "--severity", "major",
            "--format", "csv",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("interval,weight,sample_size"))
        .stdout(predicate::str::contains(",100,"));
}

#[test]
fn test_stratify_budget_too_small() {
    let tmp = TempDir::new().unwrap();
    backcheck(&tmp)
        .args(["stratify", "--budget", "10", "--aql", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sample budget 10"));
}

// ============================================================================
// Reference Command Tests
// ============================================================================

#[test]
fn test_reference_table() {
    let tmp = TempDir::new().unwrap();
    backcheck(&tmp)
        .arg("reference")
        .assert()
        .success()
        .stdout(predicate::str::contains("4603"))
        .stdout(predicate::str::contains("2995"));
}

#[test]
fn test_reference_markdown() {
    let tmp = TempDir::new().unwrap();
    backcheck(&tmp)
        .args(["reference", "--format", "md"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Zero-defect sample size reference"))
        .stdout(predicate::str::contains("| 0.1%"));
}

// ============================================================================
// Output and Config Tests
// ============================================================================

#[test]
fn test_yaml_output() {
    let tmp = TempDir::new().unwrap();
    backcheck(&tmp)
        .args(["size", "--aql", "1", "--held", "10000", "--format", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("required_sample_size: 459"));
}

#[test]
fn test_output_to_file() {
    let tmp = TempDir::new().unwrap();
    backcheck(&tmp)
        .args(["size", "--aql", "1", "--held", "10000", "-f", "json", "-o", "plan.json"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let content = fs::read_to_string(tmp.path().join("plan.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value["required_sample_size"], 459);
}

#[test]
fn test_default_format_from_project_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".backcheck.yaml"), "default_format: json\n").unwrap();
    let nested = tmp.path().join("line-3");
    fs::create_dir(&nested).unwrap();

    let output = Command::cargo_bin("backcheck")
        .unwrap()
        .current_dir(&nested)
        .env_remove("BACKCHECK_FORMAT")
        .args(["size", "--aql", "1", "--held", "10000"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["required_sample_size"], 459);
}

#[test]
fn test_format_flag_beats_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".backcheck.yaml"), "default_format: json\n").unwrap();

    backcheck(&tmp)
        .args(["size", "--aql", "1", "--held", "10000", "--format", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("required_sample_size: 459"));
}

#[test]
fn test_format_from_environment() {
    let tmp = TempDir::new().unwrap();
    backcheck(&tmp)
        .env("BACKCHECK_FORMAT", "yaml")
        .args(["size", "--aql", "1", "--held", "10000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("required_sample_size: 459"));
}

#[test]
fn test_invalid_config_is_skipped() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".backcheck.yaml"), "window_minutes: [not a number\n").unwrap();

    backcheck(&tmp)
        .args(["size", "--aql", "1", "--held", "10000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("459"))
        .stderr(predicate::str::contains("skipping config"));
}

#[test]
fn test_verbose_logs_to_stderr() {
    let tmp = TempDir::new().unwrap();
    backcheck(&tmp)
        .args(["size", "--aql", "1", "--held", "10000", "--verbose"])
        .assert()
        .success()
        .stderr(predicate::str::contains("zero-defect plan"));
}

#[test]
fn test_lookup_miss_warns_on_stderr() {
    let tmp = TempDir::new().unwrap();
    backcheck(&tmp)
        .args(["iso", "--lot-size", "4", "--aql", "1", "--format", "json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("lookup miss"))
        .stdout(predicate::str::contains("approximations"));
}
