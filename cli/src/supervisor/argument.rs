//! Argument-mode run loop.
//!
//! Launches `command args... script size`, then settles on the first of:
//! stderr output, deadline, output overflow, or a finished process (both
//! pipes closed and exit status known).

use super::report::{ExecutionOutcome, ExecutionReport};
use super::settle::{InvocationState, Settlement};
use super::PreparedTask;
use crate::common::process::{WorkerEvent, WorkerHandle};
use crate::core::error::{Invocation, SupervisorError};
use crate::worker::channel::CHANNEL_ENV;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub(super) async fn run(prepared: &PreparedTask<'_>) -> ExecutionOutcome {
    let invocation = prepared.invocation();
    let options = prepared.options;
    let launch = prepared
        .launch()
        .env_remove(CHANNEL_ENV)
        .arg(prepared.task.size().to_string());
    let mut settlement = Settlement::validated();

    info!("Launching {} worker: {}", invocation.kind, launch.display());
    let started = Instant::now();
    let mut handle = match WorkerHandle::spawn(&launch, options.limits()) {
        Ok(handle) => handle,
        Err(source) => {
            settlement.reject(SupervisorError::Spawn {
                invocation: invocation.clone(),
                command: launch.display(),
                source,
            });
            return settlement.finish(&invocation);
        }
    };
    settlement.advance(InvocationState::Launched);
    settlement.advance(InvocationState::Running);

    let mut grace = options.kill_grace;
    while !settlement.is_settled() {
        match handle.next_event().await {
            WorkerEvent::Stderr(_) => {
                grace = Duration::ZERO;
                settlement.reject(SupervisorError::Process {
                    invocation: invocation.clone(),
                    detail: handle.stderr_text().trim().to_string(),
                });
            }
            WorkerEvent::TimedOut => {
                grace = Duration::ZERO;
                settlement.reject(SupervisorError::Timeout {
                    invocation: invocation.clone(),
                    timeout: options.timeout.unwrap_or_default(),
                });
            }
            WorkerEvent::Overflow { limit } => {
                grace = Duration::ZERO;
                settlement.reject(SupervisorError::BufferOverflow {
                    invocation: invocation.clone(),
                    limit,
                });
            }
            WorkerEvent::Failed(e) => {
                settlement.reject(SupervisorError::Process {
                    invocation: invocation.clone(),
                    detail: format!("failed to supervise worker: {}", e),
                });
            }
            WorkerEvent::Finished => settle_exit(&mut settlement, &handle, &invocation, started),
            event => debug!("{} worker event: {:?}", invocation.kind, event),
        }
    }

    if let Err(e) = handle.release(grace).await {
        warn!("Failed to reap {} worker: {}", invocation.kind, e);
    }
    settlement.finish(&invocation)
}

fn settle_exit(
    settlement: &mut Settlement<ExecutionReport>,
    handle: &WorkerHandle,
    invocation: &Invocation,
    started: Instant,
) {
    match handle.exit_status() {
        Some(status) if status.success() => {
            settlement.resolve(ExecutionReport {
                kind: invocation.kind.clone(),
                parameter: invocation.parameter,
                result: String::from_utf8_lossy(handle.stdout_bytes())
                    .trim()
                    .to_string(),
                duration: started.elapsed(),
            });
        }
        status => {
            settlement.reject(SupervisorError::ExitCode {
                invocation: invocation.clone(),
                code: status.and_then(|s| s.code()),
            });
        }
    }
}
