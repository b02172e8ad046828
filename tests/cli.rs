use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_tutor_options() {
    Command::cargo_bin("calcterm")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--ollama-url"))
        .stdout(predicate::str::contains("--outline"));
}

#[test]
fn outline_prints_modules_without_a_terminal() {
    Command::cargo_bin("calcterm")
        .unwrap()
        .args(["--outline", "--ollama-url", "http://127.0.0.1:9"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Calculus Modules"))
        .stdout(predicate::str::contains("CHUNK 1"))
        .stdout(predicate::str::contains("CHUNK 8"));
}

#[test]
fn outline_writes_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("calcterm.log");

    Command::cargo_bin("calcterm")
        .unwrap()
        .arg("--outline")
        .arg("--log")
        .arg(&log)
        .assert()
        .success();

    let text = std::fs::read_to_string(&log).unwrap();
    assert!(text.contains("Starting Calcterm"));
}

#[test]
fn rejects_unknown_flags() {
    Command::cargo_bin("calcterm")
        .unwrap()
        .arg("--no-such-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--no-such-flag"));
}

#[test]
fn unknown_function_is_rejected_before_startup() {
    Command::cargo_bin("calcterm")
        .unwrap()
        .args(["--function", "tan", "--outline"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown function 'tan'"))
        .stderr(predicate::str::contains("logarithm"));
}

#[test]
fn known_function_is_accepted() {
    Command::cargo_bin("calcterm")
        .unwrap()
        .args(["--function", "Sine", "--outline"])
        .assert()
        .success();
}
