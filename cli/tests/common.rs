//! # childproc Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration test crates in `cli/tests/`: commands
//! for the two built binaries, an isolated configuration file, and small
//! shell-script workers for exercising failure paths.
//!

// Each test crate uses a different subset of these helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Path of the compiled `childproc-worker` binary for this test run.
pub fn worker_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_childproc-worker"))
}

/// `assert_cmd::Command` for the `childproc` supervisor CLI.
pub fn childproc_cmd() -> Command {
    Command::cargo_bin("childproc").expect("Failed to find childproc binary for testing")
}

/// `assert_cmd::Command` for the worker binary, with the channel variable
/// cleared so argument mode is the default.
pub fn worker_cmd() -> Command {
    let mut cmd =
        Command::cargo_bin("childproc-worker").expect("Failed to find childproc-worker binary");
    cmd.env_remove("CHILDPROC_CHANNEL");
    cmd.env_remove("CHILDPROC_WORKER_LOG");
    cmd
}

/// Write `contents` as the configuration file `childproc.toml` in `dir`.
pub fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("childproc.toml");
    std::fs::write(&path, contents).expect("Failed to write test config");
    path
}

/// `childproc` isolated from any user or project configuration: it reads
/// `config` only and launches the worker built for this test run.
pub fn isolated_cmd(config: &Path) -> Command {
    let mut cmd = childproc_cmd();
    cmd.arg("--config")
        .arg(config)
        .env("CHILDPROC_WORKER", worker_path())
        .env_remove("RUST_LOG");
    cmd
}

/// Create an executable `sh` script named `name` in `dir`.
#[cfg(unix)]
pub fn write_script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.path().join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("Failed to write script");
    let mut perms = std::fs::metadata(&path)
        .expect("Failed to stat script")
        .permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("Failed to chmod script");
    path
}
