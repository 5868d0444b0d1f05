//! # childproc Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! Entry point for the `childproc` supervisor CLI. It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Handing the parsed arguments to `commands::run`
//!
//! ## Architecture
//!
//! The supervision logic lives in the `childproc` library crate; this binary
//! only parses arguments, configures logging, and turns the outcome into
//! output and an exit code:
//! - `0`: the worker produced a result
//! - `1`: any supervisor or configuration failure
//! - `2`: usage errors (reported by Clap)
//!
//! ## Examples
//!
//! ```bash
//! # Get help
//! childproc --help
//!
//! # Compute the sum of 0..99 with the bundled worker
//! childproc --type=native --value=100
//!
//! # Same, with debug logging on stderr
//! childproc -vv --type=native --value=100
//! ```
//!
use childproc::SupervisorError;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

/// Top-level command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "childproc",
    about = "Run a task in a supervised worker process",
    long_about = "Launches a worker process for the given executor kind, hands it a task,\n\
                  and reports the result, or why the worker failed (spawn error,\n\
                  stderr output, exit code, timeout, or output overflow).",
    version
)]
struct Cli {
    #[command(flatten)]
    run: commands::run::RunArgs,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    if let Err(e) = commands::run::handle_run(cli.run).await {
        tracing::error!("Execution failed: {:?}", e);
        eprintln!("Execution Failed:");
        // Supervisor errors already embed their cause; others get the full chain.
        if e.downcast_ref::<SupervisorError>().is_some() {
            eprintln!("{}", e);
        } else {
            eprintln!("{:#}", e);
        }
        std::process::exit(1);
    }

    Ok(())
}
