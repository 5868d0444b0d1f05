//! Success reports returned by the supervisor.

use crate::core::error::SupervisorError;
use std::time::Duration;

/// Result of a successful argument-mode invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    /// Executor kind that ran.
    pub kind: String,
    pub parameter: u64,
    /// Trimmed stdout of the worker.
    pub result: String,
    /// Wall time from launch to settlement.
    pub duration: Duration,
}

impl ExecutionReport {
    /// The result parsed as an integer, if the worker printed one.
    pub fn value(&self) -> Option<u64> {
        self.result.parse().ok()
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration.as_micros() as f64 / 1e3
    }
}

/// Result of a successful message-channel invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageReport {
    pub kind: String,
    pub parameter: u64,
    pub data: u64,
    pub calculation: String,
    /// Compute time measured inside the worker.
    pub worker_time_ms: f64,
    pub duration: Duration,
}

impl MessageReport {
    pub fn duration_ms(&self) -> f64 {
        self.duration.as_micros() as f64 / 1e3
    }
}

/// Settled outcome of one argument-mode invocation.
pub type ExecutionOutcome = Result<ExecutionReport, SupervisorError>;

/// Settled outcome of one message-channel invocation.
pub type MessageOutcome = Result<MessageReport, SupervisorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_parsing() {
        let mut report = ExecutionReport {
            kind: "native".into(),
            parameter: 100,
            result: "4950".into(),
            duration: Duration::from_micros(1500),
        };
        assert_eq!(report.value(), Some(4950));
        assert!((report.duration_ms() - 1.5).abs() < 1e-9);

        report.result = "not a number".into();
        assert_eq!(report.value(), None);
    }
}
