//! # childproc Worker Integration Tests
//!
//! File: cli/tests/worker.rs
//!
//! ## Overview
//!
//! Runs the `childproc-worker` binary directly, the way a supervisor would,
//! and checks both entry modes: positional argument with bare stdout, and
//! one JSON message in / one JSON reply out when `CHILDPROC_CHANNEL=message`.
//!

mod common;
use common::*;
use predicates::prelude::*;
use serde_json::Value;

fn reply_from(output: &[u8]) -> Value {
    let text = String::from_utf8_lossy(output);
    assert_eq!(text.lines().count(), 1, "expected one reply line: {:?}", text);
    serde_json::from_str(text.trim()).expect("reply is JSON")
}

#[test]
fn test_argument_mode_prints_bare_result() {
    worker_cmd()
        .arg("100")
        .assert()
        .success()
        .stdout("4950")
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_argument_mode_smallest_size() {
    worker_cmd().arg("1").assert().success().stdout("0");
}

#[test]
fn test_argument_mode_invalid_argument() {
    let output = worker_cmd()
        .arg("abc")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .get_output()
        .clone();
    let reply = reply_from(&output.stderr);
    assert_eq!(reply["status"], "error");
    assert_eq!(
        reply["message"],
        "Invalid size argument. Please provide a positive integer."
    );
    assert_eq!(reply["received"], "abc");
}

#[test]
fn test_argument_mode_missing_argument() {
    let output = worker_cmd().assert().code(1).get_output().clone();
    assert_eq!(reply_from(&output.stderr)["received"], Value::Null);
}

#[test]
fn test_message_mode_success() {
    let output = worker_cmd()
        .env("CHILDPROC_CHANNEL", "message")
        .write_stdin("{\"size\":100}\n")
        .assert()
        .success()
        .stderr(predicate::str::is_empty())
        .get_output()
        .clone();
    let reply = reply_from(&output.stdout);
    assert_eq!(reply["status"], "success");
    assert_eq!(reply["data"], 4950);
    assert_eq!(reply["calculation"], "Sum of 0-99");
    assert!(reply["timeTakenMs"].is_number());
}

/// An invalid message gets an error reply and a non-zero exit.
#[test]
fn test_message_mode_error_message() {
    let output = worker_cmd()
        .env("CHILDPROC_CHANNEL", "message")
        .write_stdin("{\"error\":true}\n")
        .assert()
        .code(1)
        .get_output()
        .clone();
    let reply = reply_from(&output.stdout);
    assert_eq!(reply["status"], "error");
    assert_eq!(
        reply["message"],
        "Invalid size parameter. Must be a positive integer."
    );
    assert_eq!(reply["received"]["error"], true);
}

/// Message mode ignores positional arguments.
#[test]
fn test_message_mode_ignores_argument() {
    let output = worker_cmd()
        .env("CHILDPROC_CHANNEL", "message")
        .arg("5")
        .write_stdin("{\"size\":4}\n")
        .assert()
        .success()
        .get_output()
        .clone();
    assert_eq!(reply_from(&output.stdout)["data"], 6);
}

#[test]
fn test_message_mode_closed_channel() {
    let output = worker_cmd()
        .env("CHILDPROC_CHANNEL", "message")
        .write_stdin("")
        .assert()
        .code(1)
        .get_output()
        .clone();
    assert_eq!(reply_from(&output.stdout)["status"], "error");
}

#[test]
fn test_worker_logging_is_opt_in() {
    worker_cmd()
        .env("CHILDPROC_WORKER_LOG", "debug")
        .arg("10")
        .assert()
        .success()
        .stdout("45")
        .stderr(predicate::str::contains("argument mode"));
}
