//! # childproc Supervisor
//!
//! File: cli/src/supervisor/mod.rs
//!
//! ## Overview
//!
//! The supervisor launches one worker per invocation, hands it a task,
//! collects what it reports, and settles exactly one outcome: an
//! `ExecutionReport` (or `MessageReport`) on success, or a `SupervisorError`
//! classifying the failure.
//!
//! ## Architecture
//!
//! - `validation`: kind and parameter checks. `Supervisor::prepare` runs them
//!   synchronously, before anything is launched.
//! - `registry`: executor kinds and their `{command, script, args}`.
//! - `settle`: the invocation state machine and first-writer-wins guard.
//! - `argument`: argument-mode run loop (task passed as a positional argument,
//!   result read from stdout).
//! - `message`: message-channel run loop (task sent as a JSON line on stdin,
//!   reply read as a JSON line from stdout).
//! - `report`: success report types.
//!
//! Concurrent invocations share nothing but the immutable `Supervisor`; each
//! owns its own `WorkerHandle` and `Settlement`.
//!
//! ## Examples
//!
//! ```rust,ignore
//! let supervisor = Supervisor::new(registry, SupervisorOptions::default());
//! let report = supervisor.execute("native", 100.0).await?;
//! assert_eq!(report.result, "4950");
//! ```
//!
mod argument;
mod message;
pub mod registry;
pub mod report;
pub mod settle;
pub mod validation;

use crate::common::process::{LaunchCommand, Limits};
use crate::core::error::{Invocation, SupervisorError};
use crate::worker::protocol::TaskDescriptor;
use registry::{ExecutorRegistry, ExecutorSpec};
use report::{ExecutionOutcome, MessageOutcome};
use std::path::PathBuf;
use std::time::Duration;

/// Default output ceiling (1 MiB).
pub const DEFAULT_MAX_BUFFER: usize = 1024 * 1024;

/// Default time a settled worker gets to exit on its own before it is killed.
pub const DEFAULT_KILL_GRACE: Duration = Duration::from_millis(500);

/// Limits and launch settings shared by every invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorOptions {
    /// Wall-clock ceiling per invocation. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Ceiling on combined stdout + stderr bytes. `None` is unbounded.
    pub max_buffer: Option<usize>,
    /// Time a worker that settled successfully (or exited) gets to finish on
    /// its own before it is killed. Error output, timeouts and overflows kill
    /// at once.
    pub kill_grace: Duration,
    /// Working directory for launched workers.
    pub cwd: Option<PathBuf>,
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            max_buffer: Some(DEFAULT_MAX_BUFFER),
            kill_grace: DEFAULT_KILL_GRACE,
            cwd: None,
        }
    }
}

impl SupervisorOptions {
    pub(crate) fn limits(&self) -> Limits {
        Limits {
            timeout: self.timeout,
            max_output: self.max_buffer,
        }
    }
}

/// Launches workers and settles their outcomes.
#[derive(Debug, Clone)]
pub struct Supervisor {
    registry: ExecutorRegistry,
    options: SupervisorOptions,
}

impl Supervisor {
    pub fn new(registry: ExecutorRegistry, options: SupervisorOptions) -> Self {
        Self { registry, options }
    }

    pub fn registry(&self) -> &ExecutorRegistry {
        &self.registry
    }

    pub fn options(&self) -> &SupervisorOptions {
        &self.options
    }

    /// Validate `kind` and `parameter` without side effects.
    pub fn prepare(&self, kind: &str, parameter: f64) -> Result<PreparedTask<'_>, SupervisorError> {
        let spec = validation::validate_kind(&self.registry, kind)?;
        let task = validation::validate_parameter(parameter)?;
        Ok(PreparedTask {
            options: &self.options,
            kind: kind.to_string(),
            spec,
            task,
        })
    }

    /// Run `kind` with `parameter` in argument mode.
    pub async fn execute(&self, kind: &str, parameter: f64) -> ExecutionOutcome {
        self.prepare(kind, parameter)?.run().await
    }

    /// Run `kind` with `parameter` over the message channel.
    pub async fn execute_message(&self, kind: &str, parameter: f64) -> MessageOutcome {
        self.prepare(kind, parameter)?.run_message().await
    }
}

/// A validated invocation, ready to launch exactly once.
#[derive(Debug)]
pub struct PreparedTask<'a> {
    options: &'a SupervisorOptions,
    kind: String,
    spec: &'a ExecutorSpec,
    task: TaskDescriptor,
}

impl PreparedTask<'_> {
    pub fn task(&self) -> TaskDescriptor {
        self.task
    }

    pub fn invocation(&self) -> Invocation {
        Invocation::new(self.kind.clone(), self.task.size())
    }

    fn launch(&self) -> LaunchCommand {
        self.spec.launch(self.options.cwd.clone())
    }

    /// Launch in argument mode and wait for the settled outcome.
    pub async fn run(self) -> ExecutionOutcome {
        argument::run(&self).await
    }

    /// Launch in message-channel mode and wait for the settled outcome.
    pub async fn run_message(self) -> MessageOutcome {
        message::run(&self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::FailureKind;

    fn supervisor() -> Supervisor {
        let registry =
            ExecutorRegistry::new().with("native", ExecutorSpec::new("/nonexistent/childproc-worker"));
        Supervisor::new(registry, SupervisorOptions::default())
    }

    #[test]
    fn test_default_options() {
        let options = SupervisorOptions::default();
        assert_eq!(options.timeout, None);
        assert_eq!(options.max_buffer, Some(1024 * 1024));
        assert_eq!(options.limits().max_output, Some(1024 * 1024));
    }

    #[test]
    fn test_prepare_is_synchronous_and_validates() {
        let supervisor = supervisor();
        let prepared = supervisor.prepare("native", 100.0).unwrap();
        assert_eq!(prepared.task().size(), 100);
        assert_eq!(prepared.invocation(), Invocation::new("native", 100));

        assert_eq!(
            supervisor.prepare("cobol", 100.0).unwrap_err().kind(),
            FailureKind::InvalidArgument
        );
        assert_eq!(
            supervisor.prepare("native", 0.0).unwrap_err().kind(),
            FailureKind::InvalidArgument
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let err = supervisor().execute("native", 10.0).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Spawn);
        assert_eq!(err.invocation(), Some(&Invocation::new("native", 10)));

        let err = supervisor().execute_message("native", 10.0).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Spawn);
    }
}
