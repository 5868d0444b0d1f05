//! # childproc Process Execution Utilities (`common::process`)
//!
//! File: cli/src/common/process.rs
//!
//! ## Overview
//!
//! This module wraps `tokio::process::Command` into an owned worker handle.
//! A `WorkerHandle` owns the child process and its three pipes, collects
//! stdout and stderr in arrival order, tracks the exit status, and enforces an
//! optional deadline and output ceiling.
//!
//! ## Architecture
//!
//! - `LaunchCommand`: everything needed to start one worker (program,
//!   arguments, environment, working directory, whether stdin is piped).
//! - `WorkerHandle::spawn`: starts the process with piped stdio and
//!   `kill_on_drop(true)`.
//! - `WorkerHandle::next_event`: waits for the next thing that happens
//!   (output chunk, stream EOF, exit, deadline, overflow) using
//!   `tokio::select!`. Callers interpret events; the handle never decides an
//!   outcome on its own.
//! - `WorkerHandle::release`: consumes the handle, waits up to a grace period
//!   for a natural exit, then kills and reaps. Dropping an unreleased handle
//!   still kills the child.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut handle = WorkerHandle::spawn(&launch, Limits::default())?;
//! while !handle.is_finished() {
//!     match handle.next_event().await {
//!         WorkerEvent::TimedOut => break,
//!         _ => {}
//!     }
//! }
//! let status = handle.release(Duration::ZERO).await?;
//! ```
//!
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::time::Instant;
use tracing::{debug, trace, warn};

/// Size of each read from a worker pipe.
const CHUNK_SIZE: usize = 8 * 1024;

/// How to start one worker process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub envs: Vec<(OsString, OsString)>,
    /// Inherited variables to clear before launch.
    pub removed_envs: Vec<OsString>,
    pub cwd: Option<PathBuf>,
    /// Pipe stdin (message mode) instead of connecting it to /dev/null.
    pub piped_stdin: bool,
}

impl LaunchCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            removed_envs: Vec::new(),
            cwd: None,
            piped_stdin: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn env_remove(mut self, key: impl Into<OsString>) -> Self {
        self.removed_envs.push(key.into());
        self
    }

    pub fn cwd(mut self, cwd: Option<PathBuf>) -> Self {
        self.cwd = cwd;
        self
    }

    pub fn piped_stdin(mut self, piped: bool) -> Self {
        self.piped_stdin = piped;
        self
    }

    /// Human-readable command line for logs and errors.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(|a| a.as_os_str()))
            .map(|s| s.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Deadline and output ceiling applied to one handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Limits {
    pub timeout: Option<Duration>,
    /// Maximum combined stdout + stderr bytes.
    pub max_output: Option<usize>,
}

/// Something that happened to a running worker.
#[derive(Debug)]
pub enum WorkerEvent {
    /// New bytes were appended to the stdout buffer.
    Stdout(usize),
    /// New bytes were appended to the stderr buffer.
    Stderr(usize),
    StdoutClosed,
    StderrClosed,
    Exited(ExitStatus),
    /// The deadline passed.
    TimedOut,
    /// Combined output passed `max_output`.
    Overflow { limit: usize },
    /// Reading a pipe or waiting on the child failed.
    Failed(io::Error),
    /// Both pipes are closed and the exit status is known.
    Finished,
}

/// Owned handle to one launched worker.
pub struct WorkerHandle {
    child: Child,
    pid: Option<u32>,
    stdin: Option<ChildStdin>,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
    stdout_buf: Vec<u8>,
    stderr_buf: Vec<u8>,
    status: Option<ExitStatus>,
    deadline: Option<Instant>,
    max_output: Option<usize>,
    reaped: bool,
}

enum Raw {
    Stdout(io::Result<usize>),
    Stderr(io::Result<usize>),
    Exit(io::Result<ExitStatus>),
    Deadline,
}

impl WorkerHandle {
    /// Start the worker. The deadline starts counting now.
    pub fn spawn(launch: &LaunchCommand, limits: Limits) -> io::Result<Self> {
        let mut command = Command::new(&launch.program);
        command
            .args(&launch.args)
            .stdin(if launch.piped_stdin {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for key in &launch.removed_envs {
            command.env_remove(key);
        }
        for (key, value) in &launch.envs {
            command.env(key, value);
        }
        if let Some(cwd) = &launch.cwd {
            command.current_dir(cwd);
        }

        let mut child = command.spawn()?;
        let pid = child.id();
        debug!("Spawned worker (pid {:?}): {}", pid, launch.display());

        Ok(Self {
            stdin: child.stdin.take(),
            stdout: child.stdout.take(),
            stderr: child.stderr.take(),
            child,
            pid,
            stdout_buf: Vec::new(),
            stderr_buf: Vec::new(),
            status: None,
            deadline: limits.timeout.map(|t| Instant::now() + t),
            max_output: limits.max_output,
            reaped: false,
        })
    }

    /// OS process id captured at launch.
    pub fn id(&self) -> Option<u32> {
        self.pid
    }

    /// Write one line to the worker's stdin and close it.
    pub async fn send_line(&mut self, line: &str) -> io::Result<()> {
        let mut stdin = self.stdin.take().ok_or_else(|| {
            io::Error::new(io::ErrorKind::BrokenPipe, "worker stdin is not piped")
        })?;
        stdin.write_all(line.as_bytes()).await?;
        stdin.flush().await?;
        // Dropping stdin closes the pipe: one task per handle.
        Ok(())
    }

    pub fn stdout_bytes(&self) -> &[u8] {
        &self.stdout_buf
    }

    /// Accumulated stderr, lossily decoded.
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr_buf).into_owned()
    }

    pub fn exit_status(&self) -> Option<ExitStatus> {
        self.status
    }

    /// Both pipes reached EOF and the exit status is known.
    pub fn is_finished(&self) -> bool {
        self.stdout.is_none() && self.stderr.is_none() && self.status.is_some()
    }

    /// Wait for the next event.
    ///
    /// The deadline is polled first so a chatty worker cannot starve it. Stderr
    /// comes before stdout and exit, so error output racing with a normal exit
    /// is always observed before the handle reports `Finished`.
    pub async fn next_event(&mut self) -> WorkerEvent {
        if self.is_finished() {
            return WorkerEvent::Finished;
        }

        let mut out_chunk = [0u8; CHUNK_SIZE];
        let mut err_chunk = [0u8; CHUNK_SIZE];
        let waiting_for_exit = self.status.is_none();
        let deadline = self.deadline;

        let raw = {
            let Self {
                child,
                stdout,
                stderr,
                ..
            } = self;
            tokio::select! {
                biased;
                _ = sleep_until(deadline) => Raw::Deadline,
                read = read_chunk(stderr, &mut err_chunk) => Raw::Stderr(read),
                read = read_chunk(stdout, &mut out_chunk) => Raw::Stdout(read),
                status = child.wait(), if waiting_for_exit => Raw::Exit(status),
            }
        };

        match raw {
            Raw::Stderr(Ok(0)) => {
                self.stderr = None;
                WorkerEvent::StderrClosed
            }
            Raw::Stderr(Ok(n)) => {
                let first = self.stderr_buf.is_empty();
                self.stderr_buf.extend_from_slice(&err_chunk[..n]);
                trace!("Worker stderr: {} bytes", n);
                // The first error output is always reported as such, even if it
                // alone crosses the ceiling.
                if first {
                    WorkerEvent::Stderr(n)
                } else {
                    self.check_overflow().unwrap_or(WorkerEvent::Stderr(n))
                }
            }
            Raw::Stdout(Ok(0)) => {
                self.stdout = None;
                WorkerEvent::StdoutClosed
            }
            Raw::Stdout(Ok(n)) => {
                self.stdout_buf.extend_from_slice(&out_chunk[..n]);
                trace!("Worker stdout: {} bytes", n);
                self.check_overflow().unwrap_or(WorkerEvent::Stdout(n))
            }
            Raw::Stderr(Err(e)) | Raw::Stdout(Err(e)) => WorkerEvent::Failed(e),
            Raw::Exit(Ok(status)) => {
                debug!("Worker (pid {:?}) exited: {}", self.pid, status);
                self.status = Some(status);
                self.reaped = true;
                WorkerEvent::Exited(status)
            }
            Raw::Exit(Err(e)) => WorkerEvent::Failed(e),
            Raw::Deadline => WorkerEvent::TimedOut,
        }
    }

    fn check_overflow(&self) -> Option<WorkerEvent> {
        let limit = self.max_output?;
        (self.stdout_buf.len() + self.stderr_buf.len() > limit)
            .then_some(WorkerEvent::Overflow { limit })
    }

    /// Consume the handle: give the worker `grace` to exit on its own, then
    /// kill it. Always reaps. Returns the exit status when one was observed.
    pub async fn release(mut self, grace: Duration) -> io::Result<Option<ExitStatus>> {
        drop(self.stdin.take());
        if self.status.is_some() {
            return Ok(self.status);
        }

        if !grace.is_zero() {
            if let Ok(waited) = tokio::time::timeout(grace, self.child.wait()).await {
                let status = waited?;
                self.status = Some(status);
                self.reaped = true;
                return Ok(self.status);
            }
        }

        debug!("Killing worker (pid {:?})", self.pid);
        // `kill` sends SIGKILL and waits, so the child is reaped here.
        match self.child.kill().await {
            Ok(()) => {
                self.reaped = true;
                Ok(self.child.try_wait()?)
            }
            Err(e) => {
                warn!("Failed to kill worker (pid {:?}): {}", self.pid, e);
                Err(e)
            }
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        if !self.reaped {
            // Also covered by kill_on_drop.
            let _ = self.child.start_kill();
        }
    }
}

async fn read_chunk<R: AsyncRead + Unpin>(
    stream: &mut Option<R>,
    buf: &mut [u8],
) -> io::Result<usize> {
    match stream {
        Some(s) => s.read(buf).await,
        None => std::future::pending().await,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(d).await,
        None => std::future::pending().await,
    }
}
