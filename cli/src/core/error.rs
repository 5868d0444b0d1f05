//! # childproc Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used throughout childproc. There are
//! three families:
//!
//! - `ChildprocError`: application-level failures (configuration) that travel
//!   inside `anyhow::Error` through the CLI plumbing.
//! - `SupervisorError`: the classification of a single supervised invocation.
//!   Exactly one of these (or a success report) settles every call to
//!   `Supervisor::execute`.
//! - `WorkerError`: failures inside the worker executable, each of which maps
//!   to one structured error reply and a non-zero exit.
//!
//! ## Examples
//!
//! ```rust,ignore
//! match supervisor.execute("native", 100.0).await {
//!     Ok(report) => println!("{}", report.result),
//!     Err(e) if e.kind() == FailureKind::Timeout => eprintln!("worker hung: {e}"),
//!     Err(e) => return Err(e.into()),
//! }
//! ```
//!
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Custom error type for application plumbing (config loading).
#[derive(Error, Debug)]
pub enum ChildprocError {
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;

/// Identifies one supervised invocation in error messages: which executor kind
/// was launched and with which task size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub kind: String,
    pub parameter: u64,
}

impl Invocation {
    pub fn new(kind: impl Into<String>, parameter: u64) -> Self {
        Self {
            kind: kind.into(),
            parameter,
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} Process, input {}]",
            self.kind.to_uppercase(),
            self.parameter
        )
    }
}

/// Failure classification for one supervised invocation.
///
/// Every variant except `InvalidArgument` carries the `Invocation` it belongs
/// to, so callers can report which executor and input failed without keeping
/// their own bookkeeping.
#[derive(Error, Debug)]
pub enum SupervisorError {
    /// Bad executor kind or task size, detected before any process is launched.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The worker process could not be started (missing binary, permissions).
    #[error("{invocation} Spawn Error: failed to launch '{command}': {source}")]
    Spawn {
        invocation: Invocation,
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The worker wrote to its error stream, reported an error reply, or broke
    /// the message protocol.
    #[error("{invocation} Process Error: {detail}")]
    Process { invocation: Invocation, detail: String },

    /// The worker exited unsuccessfully without any error-stream output.
    #[error("{invocation} {}", describe_exit(.code))]
    ExitCode {
        invocation: Invocation,
        code: Option<i32>,
    },

    /// The worker outlived the configured wall-clock ceiling and was killed.
    #[error("{invocation} Timeout Error: worker did not finish within {} ms", .timeout.as_millis())]
    Timeout {
        invocation: Invocation,
        timeout: Duration,
    },

    /// The worker produced more output than the configured ceiling and was killed.
    #[error("{invocation} Buffer Overflow Error: output exceeded {limit} bytes")]
    BufferOverflow { invocation: Invocation, limit: usize },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("Exit Code {}", code),
        None => "Exit Code none (terminated by signal)".to_string(),
    }
}

/// Flat tag for `SupervisorError`, convenient for matching and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidArgument,
    Spawn,
    Process,
    ExitCode,
    Timeout,
    BufferOverflow,
}

impl SupervisorError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SupervisorError::InvalidArgument(_) => FailureKind::InvalidArgument,
            SupervisorError::Spawn { .. } => FailureKind::Spawn,
            SupervisorError::Process { .. } => FailureKind::Process,
            SupervisorError::ExitCode { .. } => FailureKind::ExitCode,
            SupervisorError::Timeout { .. } => FailureKind::Timeout,
            SupervisorError::BufferOverflow { .. } => FailureKind::BufferOverflow,
        }
    }

    /// The invocation this failure belongs to (`None` for validation failures).
    pub fn invocation(&self) -> Option<&Invocation> {
        match self {
            SupervisorError::InvalidArgument(_) => None,
            SupervisorError::Spawn { invocation, .. }
            | SupervisorError::Process { invocation, .. }
            | SupervisorError::ExitCode { invocation, .. }
            | SupervisorError::Timeout { invocation, .. }
            | SupervisorError::BufferOverflow { invocation, .. } => Some(invocation),
        }
    }
}

/// Failures inside the worker executable.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// The task descriptor did not carry a usable size.
    #[error("{message}")]
    InvalidTask {
        message: String,
        received: serde_json::Value,
    },

    /// The message channel could not be read or written.
    #[error("Message channel error: {0}")]
    Channel(#[from] std::io::Error),
}
