//! Wire protocol shared by the supervisor and the worker.
//!
//! Messages are JSON-serialized and newline-delimited. The supervisor sends a
//! single `TaskDescriptor`; the worker answers with a single `WorkerReply`.

use crate::core::error::WorkerError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Largest accepted task size. Keeps `(size - 1) * size / 2` inside `u64`.
pub const MAX_TASK_SIZE: u64 = 1 << 32;

/// Reply message when a message-channel task carries no usable size.
pub const INVALID_SIZE_PARAMETER: &str = "Invalid size parameter. Must be a positive integer.";

/// Error line written to stderr when the positional size argument is unusable.
pub const INVALID_SIZE_ARGUMENT: &str =
    "Invalid size argument. Please provide a positive integer.";

/// The single unit of work sent to a worker. Only constructible through the
/// validating constructors, so `size` is always within `1..=MAX_TASK_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskDescriptor {
    size: u64,
}

impl TaskDescriptor {
    /// Build a descriptor, rejecting sizes outside `1..=MAX_TASK_SIZE`.
    pub fn new(size: u64) -> Option<Self> {
        (1..=MAX_TASK_SIZE).contains(&size).then_some(Self { size })
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Validate an arbitrary JSON message the way the worker's message mode does.
    ///
    /// Accepts `{"size": n}` where `n` is a positive integer, including floats
    /// without a fractional part (`100.0`).
    pub fn from_message(message: &Value) -> Result<Self, WorkerError> {
        let invalid = || WorkerError::InvalidTask {
            message: INVALID_SIZE_PARAMETER.to_string(),
            received: message.clone(),
        };

        let size = message.get("size").ok_or_else(invalid)?;
        let size = match size.as_u64() {
            Some(n) => n,
            None => match size.as_f64() {
                Some(f) if f.fract() == 0.0 && f >= 1.0 && f <= MAX_TASK_SIZE as f64 => f as u64,
                _ => return Err(invalid()),
            },
        };
        Self::new(size).ok_or_else(invalid)
    }

    /// Validate a positional command-line argument the way argument mode does.
    pub fn from_argument(arg: Option<&str>) -> Result<Self, WorkerError> {
        let invalid = || WorkerError::InvalidTask {
            message: INVALID_SIZE_ARGUMENT.to_string(),
            received: arg.map_or(Value::Null, |a| Value::String(a.to_string())),
        };

        let size = arg
            .and_then(|a| a.trim().parse::<u64>().ok())
            .ok_or_else(invalid)?;
        Self::new(size).ok_or_else(invalid)
    }

    /// Serialize to JSON line (with newline).
    pub fn to_line(&self) -> String {
        let mut json = serde_json::json!({ "size": self.size }).to_string();
        json.push('\n');
        json
    }
}

/// Reply from worker to supervisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum WorkerReply {
    Success {
        data: u64,
        calculation: String,
        #[serde(rename = "timeTakenMs")]
        time_taken_ms: f64,
    },
    Error {
        message: String,
        #[serde(default)]
        received: Value,
    },
}

impl WorkerReply {
    /// Create a successful result reply.
    pub fn success(task: TaskDescriptor, data: u64, time_taken_ms: f64) -> Self {
        Self::Success {
            data,
            calculation: format!("Sum of 0-{}", task.size() - 1),
            time_taken_ms,
        }
    }

    /// Create an error reply from a worker failure.
    pub fn from_error(err: &WorkerError) -> Self {
        match err {
            WorkerError::InvalidTask { message, received } => Self::Error {
                message: message.clone(),
                received: received.clone(),
            },
            WorkerError::Channel(e) => Self::Error {
                message: e.to_string(),
                received: Value::Null,
            },
        }
    }

    /// Serialize to a single JSON line (with newline).
    pub fn to_line(&self) -> String {
        // A reply only holds strings, integers, finite floats and JSON values.
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            serde_json::json!({ "status": "error", "message": e.to_string() }).to_string()
        });
        json.push('\n');
        json
    }

    /// Deserialize from JSON line.
    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim())
    }
}
