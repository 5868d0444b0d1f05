//! Message-channel run loop.
//!
//! Launches `command args... script` with `CHILDPROC_CHANNEL=message`, sends
//! one `TaskDescriptor` line on stdin, and settles on the first reply line,
//! stderr output, deadline, overflow, or process exit without a reply.

use super::report::{MessageOutcome, MessageReport};
use super::settle::{InvocationState, Settlement};
use super::PreparedTask;
use crate::common::process::{WorkerEvent, WorkerHandle};
use crate::core::error::{Invocation, SupervisorError};
use crate::worker::channel::{CHANNEL_ENV, CHANNEL_MESSAGE};
use crate::worker::protocol::WorkerReply;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub(super) async fn run(prepared: &PreparedTask<'_>) -> MessageOutcome {
    let invocation = prepared.invocation();
    let options = prepared.options;
    let launch = prepared
        .launch()
        .env(CHANNEL_ENV, CHANNEL_MESSAGE)
        .piped_stdin(true);
    let mut settlement = Settlement::validated();

    info!(
        "Launching {} worker over message channel: {}",
        invocation.kind,
        launch.display()
    );
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

    if let Err(e) = handle.send_line(&prepared.task.to_line()).await {
        // The exit status and stderr tell the real story; keep supervising.
        debug!("Could not deliver task to {} worker: {}", invocation.kind, e);
    }
    settlement.advance(InvocationState::Running);

    let mut grace = options.kill_grace;
    while !settlement.is_settled() {
        match handle.next_event().await {
            WorkerEvent::Stdout(_) => {
                if let Some(line) = first_line(handle.stdout_bytes()) {
                    settle_reply(&mut settlement, &line, &invocation, started);
                }
            }
            WorkerEvent::StdoutClosed => {
                let rest = String::from_utf8_lossy(handle.stdout_bytes()).trim().to_string();
                if !rest.is_empty() {
                    settle_reply(&mut settlement, &rest, &invocation, started);
                }
            }
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
            WorkerEvent::Finished => {
                let error = match handle.exit_status() {
                    Some(status) if status.success() => SupervisorError::Process {
                        invocation: invocation.clone(),
                        detail: "worker exited without replying".to_string(),
                    },
                    status => SupervisorError::ExitCode {
                        invocation: invocation.clone(),
                        code: status.and_then(|s| s.code()),
                    },
                };
                settlement.reject(error);
            }
            event => debug!("{} worker event: {:?}", invocation.kind, event),
        }
    }

    if let Err(e) = handle.release(grace).await {
        warn!("Failed to reap {} worker: {}", invocation.kind, e);
    }
    settlement.finish(&invocation)
}

/// First complete line of `bytes`, if a newline has arrived.
fn first_line(bytes: &[u8]) -> Option<String> {
    let end = bytes.iter().position(|&b| b == b'\n')?;
    Some(String::from_utf8_lossy(&bytes[..end]).trim().to_string())
}

fn settle_reply(
    settlement: &mut Settlement<MessageReport>,
    line: &str,
    invocation: &Invocation,
    started: Instant,
) {
    match WorkerReply::from_line(line) {
        Ok(WorkerReply::Success {
            data,
            calculation,
            time_taken_ms,
        }) => {
            settlement.resolve(MessageReport {
                kind: invocation.kind.clone(),
                parameter: invocation.parameter,
                data,
                calculation,
                worker_time_ms: time_taken_ms,
                duration: started.elapsed(),
            });
        }
        Ok(WorkerReply::Error { message, .. }) => {
            settlement.reject(SupervisorError::Process {
                invocation: invocation.clone(),
                detail: message,
            });
        }
        Err(e) => {
            settlement.reject(SupervisorError::Process {
                invocation: invocation.clone(),
                detail: format!("invalid reply {:?}: {}", line, e),
            });
        }
    }
}
