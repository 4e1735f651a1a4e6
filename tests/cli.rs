//! End-to-end tests of the limitcalc binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn limitcalc() -> Command {
    Command::cargo_bin("limitcalc").unwrap()
}

fn json_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn catalogs() -> (NamedTempFile, NamedTempFile) {
    let amps = json_file(
        r#"[{"reference": "TSA", "gain": 37.8, "power": {"8": 1220, "4": 1670}, "outputs": 4}]"#,
    );
    let spks = json_file(
        r#"[
            {"reference": "MTH", "impedance": 8, "power": 1500, "response": "40-330", "baffle": "CLOSED"},
            {"reference": "NEXOK", "impedance": 4, "power": 600, "response": "50-800", "baffle": "OPEN"}
        ]"#,
    );
    (amps, spks)
}

#[test]
fn limit_dbu_open_baffle() {
    limitcalc()
        .args([
            "limit", "--hp", "100", "--impedance", "8", "--ampli", "200", "--gain", "26",
            "--baffle", "ouverte", "--limiter", "dBu",
        ])
        .assert()
        .success()
        .stdout("3.3 dBu\n");
}

#[test]
fn limit_accepts_comma_decimals_and_locale() {
    limitcalc()
        .args([
            "limit", "--hp", "100,0", "--impedance", "8", "--ampli", "200", "--gain", "26",
            "--baffle", "ouverte", "--limiter", "DCX2496 SUB", "--decimal", ",",
        ])
        .assert()
        .success()
        .stdout("-17,2 dB\n");
}

#[test]
fn limit_unknown_limiter_is_zero() {
    limitcalc()
        .args([
            "limit", "--hp", "100", "--impedance", "8", "--ampli", "200", "--gain", "26",
            "--limiter", "unknown-value",
        ])
        .assert()
        .success()
        .stdout("0 dB\n");
}

#[test]
fn limit_zero_impedance_reports_nan() {
    limitcalc()
        .args(["limit", "--hp", "100", "--ampli", "200", "--gain", "26"])
        .assert()
        .success()
        .stdout("NaN dBu\n");
}

#[test]
fn limit_query_prefill_overrides_flags() {
    limitcalc()
        .args([
            "limit", "--hp", "100", "--impedance", "8", "--ampli", "200", "--gain", "0",
            "--baffle", "ouverte", "--query", "?gain=40&limiter=ignored",
        ])
        .assert()
        .success()
        .stdout("-10.7 dBu\n");
}

#[test]
fn limit_breakdown_lists_every_limiter() {
    limitcalc()
        .args([
            "limit", "--hp", "100", "--impedance", "8", "--ampli", "200", "--gain", "26",
            "--baffle", "ouverte", "--breakdown",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("T.Racks DS2/4"))
        .stdout(predicate::str::contains("DCX2496 Top"))
        .stdout(predicate::str::contains("-15"));
}

#[test]
fn pair_reports_threshold_and_devices() {
    let (amps, spks) = catalogs();
    limitcalc()
        .arg("pair")
        .arg("--amplifiers")
        .arg(amps.path())
        .arg("--speakers")
        .arg(spks.path())
        .args(["--amplifier", "TSA", "--speaker", "MTH", "--load", "8"])
        .assert()
        .success()
        .stdout(predicate::str::contains("71.55 V"))
        .stdout(predicate::str::contains("1.2 dBu"))
        .stdout(predicate::str::contains("DCX2496 SUB"));
}

#[test]
fn pair_without_smart_limit() {
    let (amps, spks) = catalogs();
    limitcalc()
        .arg("pair")
        .arg("--amplifiers")
        .arg(amps.path())
        .arg("--speakers")
        .arg(spks.path())
        .args(["--amplifier", "TSA", "--speaker", "MTH", "--load", "8", "--no-smart"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4.3 dBu"))
        .stdout(predicate::str::contains("DCX2496").not());
}

#[test]
fn pair_rejects_unsupported_load() {
    let (amps, spks) = catalogs();
    limitcalc()
        .arg("pair")
        .arg("--amplifiers")
        .arg(amps.path())
        .arg("--speakers")
        .arg(spks.path())
        .args(["--amplifier", "TSA", "--speaker", "NEXOK", "--load", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not support 2 Ohm"));
}

#[test]
fn pair_rejects_unknown_reference() {
    let (amps, spks) = catalogs();
    limitcalc()
        .arg("pair")
        .arg("--amplifiers")
        .arg(amps.path())
        .arg("--speakers")
        .arg(spks.path())
        .args(["--amplifier", "TSA", "--speaker", "F221", "--load", "4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown speaker: F221"));
}

#[test]
fn list_shows_both_catalogs() {
    let (amps, spks) = catalogs();
    limitcalc()
        .arg("list")
        .arg("--amplifiers")
        .arg(amps.path())
        .arg("--speakers")
        .arg(spks.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1220W@8\u{2126}"))
        .stdout(predicate::str::contains("NEXOK"));
}

#[test]
fn gain_from_voltages() {
    limitcalc()
        .args(["gain", "--vin", "0,775", "--vout", "30"])
        .assert()
        .success()
        .stdout("31.76 dB\n");
}

#[test]
fn gain_rejects_zero_voltage() {
    limitcalc()
        .args(["gain", "--vin", "0", "--vout", "30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("voltages must be positive"));
}

#[test]
fn date_default_format() {
    limitcalc()
        .args(["date", "--serial", "45000.5"])
        .assert()
        .success()
        .stdout("15/03/2023\n");
}

#[test]
fn date_custom_codes() {
    limitcalc()
        .args(["date", "--serial", "45000.5", "--codes", "9,34,6,34,5"])
        .assert()
        .success()
        .stdout("mercredi 15 mars\n");
}

#[test]
fn log_file_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("limitcalc.log");
    limitcalc()
        .args(["limit", "--hp", "100", "--impedance", "8", "--ampli", "200"])
        .arg("--log")
        .arg(&log)
        .env_remove("RUST_LOG")
        .assert()
        .success();
    let content = std::fs::read_to_string(&log).unwrap();
    assert!(content.contains("Starting limitcalc"));
    assert!(content.contains("Computing threshold"));
}

#[test]
fn log_level_follows_rust_log() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("limitcalc.log");
    limitcalc()
        .args(["limit", "--hp", "100", "--impedance", "8", "--ampli", "200"])
        .arg("--log")
        .arg(&log)
        .env("RUST_LOG", "info")
        .assert()
        .success();
    let content = std::fs::read_to_string(&log).unwrap();
    assert!(content.contains("Starting limitcalc"));
    assert!(!content.contains("Computing threshold"));
}

#[test]
fn convert_from_distance() {
    limitcalc()
        .args(["convert", "--distance", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("343 m/s"))
        .stdout(predicate::str::contains("333 Hz"))
        .stdout(predicate::str::contains("0.003 s"));
}

#[test]
fn convert_from_frequency_at_temperature() {
    limitcalc()
        .args(["convert", "--frequency", "100", "--temperature", "-10", "--decimal", ","])
        .assert()
        .success()
        .stdout(predicate::str::contains("325 m/s"))
        .stdout(predicate::str::contains("3,25 m"));
}

#[test]
fn convert_needs_exactly_one_source() {
    limitcalc()
        .args(["convert", "--distance", "1", "--time", "0.01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exactly one of"));
}
