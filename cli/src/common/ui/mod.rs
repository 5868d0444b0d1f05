//! # childproc UI Utilities Module (`common::ui`)
//!
//! File: cli/src/common/ui/mod.rs
//!
//! ## Overview
//!
//! Terminal presentation of supervisor results. The supervisor itself never
//! prints; the CLI turns reports into either a boxed table for people or a
//! single JSON object for scripts.
//!
//! ## Architecture
//!
//! - **`tables`**: generic aligned table rendering (`render_table`).
//! - Report helpers in this file: `execution_rows` / `message_rows` build the
//!   `Field | Value` rows, and `execution_json` / `message_json` build the
//!   machine-readable form with `serde_json`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let report = supervisor.execute("native", 100.0).await?;
//! println!("{}", ui::render_execution(&report));
//! ```
//!
pub mod tables;

use crate::supervisor::report::{ExecutionReport, MessageReport};
use serde_json::{json, Value};

pub use tables::render_table;

const HEADERS: [&str; 2] = ["Field", "Value"];

fn format_ms(ms: f64) -> String {
    format!("{:.2} ms", ms)
}

/// `Field | Value` rows for an argument-mode result.
pub fn execution_rows(report: &ExecutionReport) -> Vec<Vec<String>> {
    vec![
        vec!["Type".to_string(), report.kind.clone()],
        vec!["Parameter".to_string(), report.parameter.to_string()],
        vec!["Result".to_string(), report.result.clone()],
        vec!["Duration".to_string(), format_ms(report.duration_ms())],
    ]
}

/// `Field | Value` rows for a message-channel result.
pub fn message_rows(report: &MessageReport) -> Vec<Vec<String>> {
    vec![
        vec!["Type".to_string(), report.kind.clone()],
        vec!["Parameter".to_string(), report.parameter.to_string()],
        vec!["Result".to_string(), report.data.to_string()],
        vec!["Calculation".to_string(), report.calculation.clone()],
        vec!["Worker Time".to_string(), format_ms(report.worker_time_ms)],
        vec!["Duration".to_string(), format_ms(report.duration_ms())],
    ]
}

pub fn render_execution(report: &ExecutionReport) -> String {
    render_table(&HEADERS, &execution_rows(report))
}

pub fn render_message(report: &MessageReport) -> String {
    render_table(&HEADERS, &message_rows(report))
}

/// JSON form of an argument-mode result. `result` stays a string since the
/// worker's stdout is not required to be numeric.
pub fn execution_json(report: &ExecutionReport) -> Value {
    json!({
        "type": report.kind,
        "parameter": report.parameter,
        "result": report.result,
        "duration_ms": report.duration_ms(),
    })
}

pub fn message_json(report: &MessageReport) -> Value {
    json!({
        "type": report.kind,
        "parameter": report.parameter,
        "result": report.data,
        "calculation": report.calculation,
        "worker_time_ms": report.worker_time_ms,
        "duration_ms": report.duration_ms(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn execution() -> ExecutionReport {
        ExecutionReport {
            kind: "native".to_string(),
            parameter: 100,
            result: "4950".to_string(),
            duration: Duration::from_millis(12),
        }
    }

    #[test]
    fn test_render_execution_table() {
        let table = render_execution(&execution());
        assert!(table.contains("| Type      | native   |"));
        assert!(table.contains("| Result    | 4950     |"));
        assert!(table.contains("| Duration  | 12.00 ms |"));
    }

    #[test]
    fn test_execution_json() {
        let value = execution_json(&execution());
        assert_eq!(value["type"], "native");
        assert_eq!(value["parameter"], 100);
        assert_eq!(value["result"], "4950");
        assert_eq!(value["duration_ms"], 12.0);
    }

    #[test]
    fn test_message_output() {
        let report = MessageReport {
            kind: "native".to_string(),
            parameter: 100,
            data: 4950,
            calculation: "Sum of 0-99".to_string(),
            worker_time_ms: 0.5,
            duration: Duration::from_millis(3),
        };
        let value = message_json(&report);
        assert_eq!(value["result"], 4950);
        assert_eq!(value["calculation"], "Sum of 0-99");

        let table = render_message(&report);
        assert!(table.contains("Sum of 0-99"));
        assert!(table.contains("0.50 ms"));
    }
}
