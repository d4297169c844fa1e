// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! End-to-end tests for the `predict` binary.

use std::path::PathBuf;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;

/// An empty directory unique to this test, so no `best.onnx` is in reach.
fn empty_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("yolo-top1-{name}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn missing_argument_prints_error_record() {
    let dir = empty_dir("no-arg");
    Command::cargo_bin("predict")
        .unwrap()
        .current_dir(&dir)
        .assert()
        .code(1)
        .stdout("{\"label\": \"error\", \"confidence\": 0}\n");
}

#[test]
fn missing_argument_output_is_valid_json() {
    let dir = empty_dir("no-arg-json");
    let output = Command::cargo_bin("predict")
        .unwrap()
        .current_dir(&dir)
        .output()
        .unwrap();

    let line = String::from_utf8(output.stdout).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
    assert_eq!(parsed["label"], "error");
    assert_eq!(parsed["confidence"], 0);
    assert_eq!(parsed.as_object().unwrap().len(), 2);
}

#[test]
fn missing_model_fails_without_json() {
    let dir = empty_dir("no-model");
    Command::cargo_bin("predict")
        .unwrap()
        .current_dir(&dir)
        .arg("photo.jpg")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("best.onnx"));
}

#[test]
fn extra_and_hyphenated_arguments_reach_prediction() {
    let dir = empty_dir("extra-args");
    Command::cargo_bin("predict")
        .unwrap()
        .current_dir(&dir)
        .args(["-photo.jpg", "second.jpg", "--conf", "0.5"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("best.onnx"))
        .stderr(predicate::str::contains("Usage").not());
}

#[test]
fn version_flag() {
    Command::cargo_bin("predict")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
