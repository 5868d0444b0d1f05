//! # childproc Worker Entry Point
//!
//! File: cli/src/bin/childproc-worker.rs
//!
//! ## Overview
//!
//! The executable launched by the supervisor for the `native` executor kind.
//! All behavior lives in `childproc::worker`; this file only sets up logging
//! and turns the worker's status into the process exit code.
//!
//! Anything the worker writes to stderr is treated as a failure by the
//! supervisor, so a tracing subscriber is installed only when
//! `CHILDPROC_WORKER_LOG` is set (its value is the filter, e.g. `debug`).
//!
use tracing_subscriber::{fmt, EnvFilter};

const LOG_ENV: &str = "CHILDPROC_WORKER_LOG";

fn main() {
    if std::env::var_os(LOG_ENV).is_some() {
        let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("debug"));
        fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .init();
    }

    std::process::exit(childproc::worker::run());
}
