//! # childproc Worker
//!
//! File: cli/src/worker/mod.rs
//!
//! ## Overview
//!
//! The worker is the subordinate process launched by the supervisor. It
//! accepts exactly one task, computes the triangular sum of its size, reports
//! the outcome once, and exits.
//!
//! ## Architecture
//!
//! - `compute`: the pure computation, shared by both entry modes.
//! - `protocol`: `TaskDescriptor` / `WorkerReply` wire types.
//! - `channel`: capability detection and the JSON line channel.
//!
//! The two entry adapters below (`run_message_mode`, `run_argument_mode`) are
//! thin: each validates its input into a `TaskDescriptor`, calls
//! `compute::triangular_sum`, and reports through its own channel. Both return
//! the process exit code instead of exiting, so they can be tested in-process.
//!
pub mod channel;
pub mod compute;
pub mod protocol;

use crate::core::error::WorkerError;
use channel::{EntryMode, Incoming, MessageChannel};
use protocol::{TaskDescriptor, WorkerReply};
use serde_json::Value;
use std::io::{self, BufRead, Write};
use std::time::Instant;
use tracing::{debug, warn};

/// Exit code for a successfully reported task.
pub const EXIT_OK: i32 = 0;
/// Exit code after any reported error.
pub const EXIT_FAILURE: i32 = 1;

/// Run the worker against the real process environment and stdio.
pub fn run() -> i32 {
    match EntryMode::from_env() {
        EntryMode::Message => {
            debug!("Worker starting in message mode");
            let stdin = io::stdin();
            let stdout = io::stdout();
            let mut channel = MessageChannel::new(stdin.lock(), stdout.lock());
            run_message_mode(&mut channel)
        }
        EntryMode::Argument(arg) => {
            debug!("Worker starting in argument mode (arg: {:?})", arg);
            run_argument_mode(arg.as_deref(), &mut io::stdout(), &mut io::stderr())
        }
    }
}

/// Message-mode adapter: one message in, one reply out.
pub fn run_message_mode<R: BufRead, W: Write>(channel: &mut MessageChannel<R, W>) -> i32 {
    let reply = match receive_task(channel) {
        Ok(task) => match compute_reply(task) {
            Ok(reply) => reply,
            Err(e) => WorkerReply::from_error(&e),
        },
        Err(e) => WorkerReply::from_error(&e),
    };

    let code = match reply {
        WorkerReply::Success { .. } => EXIT_OK,
        WorkerReply::Error { .. } => EXIT_FAILURE,
    };
    if let Err(e) = channel.send(&reply) {
        // The supervisor went away; nothing left to report to.
        warn!("Failed to send reply: {}", e);
        return EXIT_FAILURE;
    }
    code
}

fn receive_task<R: BufRead, W: Write>(
    channel: &mut MessageChannel<R, W>,
) -> Result<TaskDescriptor, WorkerError> {
    match channel.recv()? {
        Incoming::Message(message) => TaskDescriptor::from_message(&message),
        Incoming::Malformed(line) => Err(WorkerError::InvalidTask {
            message: protocol::INVALID_SIZE_PARAMETER.to_string(),
            received: Value::String(line),
        }),
        Incoming::Closed => Err(WorkerError::InvalidTask {
            message: "No task received on message channel.".to_string(),
            received: Value::Null,
        }),
    }
}

fn compute_reply(task: TaskDescriptor) -> Result<WorkerReply, WorkerError> {
    let started = Instant::now();
    let data = compute::triangular_sum(task).ok_or_else(|| WorkerError::InvalidTask {
        message: "Sum calculation failed".to_string(),
        received: serde_json::json!({ "size": task.size() }),
    })?;
    let time_taken_ms = started.elapsed().as_secs_f64() * 1e3;
    Ok(WorkerReply::success(task, data, time_taken_ms))
}

/// Argument-mode adapter: bare result on `out`, one JSON error line on `err`.
pub fn run_argument_mode<O: Write, E: Write>(arg: Option<&str>, out: &mut O, err: &mut E) -> i32 {
    let result = TaskDescriptor::from_argument(arg).and_then(|task| {
        compute::triangular_sum(task).ok_or_else(|| WorkerError::InvalidTask {
            message: "Sum calculation failed".to_string(),
            received: serde_json::json!(task.size()),
        })
    });

    match result {
        Ok(sum) => match write!(out, "{}", sum).and_then(|_| out.flush()) {
            Ok(()) => EXIT_OK,
            Err(_) => EXIT_FAILURE,
        },
        Err(e) => {
            let line = WorkerReply::from_error(&e).to_line();
            let _ = err.write_all(line.as_bytes()).and_then(|_| err.flush());
            EXIT_FAILURE
        }
    }
}
