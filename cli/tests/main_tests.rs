//! # childproc CLI Main Integration Tests
//!
//! File: cli/tests/main_tests.rs
//!
//! ## Overview
//!
//! Top-level behavior of the `childproc` binary: standard flags and usage
//! errors reported by Clap.
//!

mod common;
use common::*;
use predicates::prelude::*;

#[test]
fn test_version_flag() {
    childproc_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    childproc_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--type"))
        .stdout(predicate::str::contains("--value"))
        .stdout(predicate::str::contains("--channel"));
}

/// Missing arguments are usage errors (exit 2), not supervisor failures.
#[test]
fn test_missing_arguments() {
    childproc_cmd()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--type"));

    childproc_cmd()
        .arg("--type=native")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--value"));
}

#[test]
fn test_unparseable_value() {
    childproc_cmd()
        .args(["--type=native", "--value=abc"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_unknown_channel() {
    childproc_cmd()
        .args(["--type=native", "--value=1", "--channel=socket"])
        .assert()
        .code(2);
}
