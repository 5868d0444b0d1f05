//! # childproc Run Handler
//!
//! File: cli/src/commands/run.rs
//!
//! ## Overview
//!
//! Implements the `childproc --type=<kind> --value=<number>` action: load the
//! configuration, apply command-line overrides, run one task through the
//! supervisor, and print the settled outcome.
//!
//! ## Architecture
//!
//! 1. Parse `RunArgs` (Clap). Missing or unparseable values are usage errors
//!    reported by Clap itself (exit code 2).
//! 2. Load configuration via `core::config::load_config`, honoring `--config`.
//! 3. Override `timeout_ms` / `max_buffer` from the flags, if given.
//! 4. Build a `Supervisor` and call `execute` (argument mode) or
//!    `execute_message` (message channel) depending on `--channel`.
//! 5. Print `Execution Result:` and a table, or a JSON object with `--json`.
//!
//! Supervisor failures are returned as errors; `main` prints them and exits 1.
//!
//! ## Usage
//!
//! ```bash
//! childproc --type=native --value=100
//! childproc --type=python --value=100 --timeout-ms 2000
//! childproc --type=native --value=100 --channel message --json
//! ```
//!
use anyhow::Context;
use childproc::common::ui;
use childproc::core::config;
use childproc::core::error::Result;
use childproc::{Supervisor, SupervisorOptions};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// How the task reaches the worker.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Channel {
    /// Pass the task as a positional argument; read the result from stdout.
    #[default]
    Args,
    /// Send the task as a JSON line on stdin; read a JSON reply from stdout.
    Message,
}

/// Arguments for running one task.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Executor kind to launch (case-insensitive), e.g. `native` or a kind
    /// defined under `[executors]` in the configuration.
    #[arg(long = "type", value_name = "KIND")]
    pub kind: String,

    /// Task size. Must be a positive integer.
    #[arg(long, value_name = "NUMBER", allow_negative_numbers = true)]
    pub value: f64,

    /// Task delivery channel.
    #[arg(long, value_enum, default_value_t = Channel::Args)]
    pub channel: Channel,

    /// Wall-clock limit for the worker, in milliseconds (overrides config).
    #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_ms: Option<u64>,

    /// Limit on combined worker output in bytes; 0 disables it (overrides config).
    #[arg(long, value_name = "BYTES")]
    pub max_buffer: Option<usize>,

    /// Read configuration from this file instead of the user/project files.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the result as a JSON object.
    #[arg(long)]
    pub json: bool,
}

/// Apply command-line overrides on top of the configured options.
fn apply_overrides(mut options: SupervisorOptions, args: &RunArgs) -> SupervisorOptions {
    if let Some(ms) = args.timeout_ms {
        options.timeout = Some(Duration::from_millis(ms));
    }
    if let Some(bytes) = args.max_buffer {
        options.max_buffer = (bytes > 0).then_some(bytes);
    }
    options
}

/// # Handle Run (`handle_run`)
///
/// Runs the requested task and prints the report to stdout.
///
/// ## Returns
///
/// * `Ok(())` when the worker produced a result.
/// * `Err` for configuration problems or any `SupervisorError`; the error's
///   message already carries the `[KIND Process, input N]` prefix.
pub async fn handle_run(args: RunArgs) -> Result<()> {
    let kind = args.kind.to_lowercase();
    info!(
        "Handling run command (Type: {}, Value: {}, Channel: {:?})",
        kind, args.value, args.channel
    );

    let cfg = config::load_config(args.config.as_deref())
        .context("Failed to load childproc configuration")?;
    let options = apply_overrides(cfg.supervisor_options(), &args);
    debug!("Effective supervisor options: {:?}", options);
    let supervisor = Supervisor::new(cfg.registry(), options);

    match args.channel {
        Channel::Args => {
            let report = supervisor.execute(&kind, args.value).await?;
            if args.json {
                println!("{}", ui::execution_json(&report));
            } else {
                println!("Execution Result:");
                println!("{}", ui::render_execution(&report));
            }
        }
        Channel::Message => {
            let report = supervisor.execute_message(&kind, args.value).await?;
            if args.json {
                println!("{}", ui::message_json(&report));
            } else {
                println!("Execution Result:");
                println!("{}", ui::render_message(&report));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        run: RunArgs,
    }

    fn parse(args: &[&str]) -> std::result::Result<RunArgs, clap::Error> {
        let mut argv = vec!["childproc"];
        argv.extend_from_slice(args);
        TestCli::try_parse_from(argv).map(|cli| cli.run)
    }

    #[test]
    fn test_parse_minimal() {
        let args = parse(&["--type=NATIVE", "--value=100"]).unwrap();
        assert_eq!(args.kind, "NATIVE");
        assert_eq!(args.value, 100.0);
        assert_eq!(args.channel, Channel::Args);
        assert!(!args.json);
    }

    #[test]
    fn test_parse_negative_and_message() {
        let args = parse(&["--type", "native", "--value", "-5", "--channel", "message"]).unwrap();
        assert_eq!(args.value, -5.0);
        assert_eq!(args.channel, Channel::Message);
    }

    #[test]
    fn test_parse_rejects_missing_and_bad_values() {
        assert!(parse(&["--value=100"]).is_err());
        assert!(parse(&["--type=native"]).is_err());
        assert!(parse(&["--type=native", "--value=abc"]).is_err());
        assert!(parse(&["--type=native", "--value=1", "--timeout-ms=0"]).is_err());
    }

    #[test]
    fn test_overrides() {
        let args = parse(&[
            "--type=native",
            "--value=1",
            "--timeout-ms=250",
            "--max-buffer=0",
        ])
        .unwrap();
        let options = apply_overrides(SupervisorOptions::default(), &args);
        assert_eq!(options.timeout, Some(Duration::from_millis(250)));
        assert_eq!(options.max_buffer, None);

        let args = parse(&["--type=native", "--value=1"]).unwrap();
        assert_eq!(
            apply_overrides(SupervisorOptions::default(), &args),
            SupervisorOptions::default()
        );
    }
}
