//! # childproc Library
//!
//! File: cli/src/lib.rs
//!
//! ## Overview
//!
//! Shared code for the two binaries built from this crate:
//!
//! - `childproc`: the supervisor CLI (`src/main.rs`).
//! - `childproc-worker`: the worker executable (`src/bin/childproc-worker.rs`).
//!
//! ## Architecture
//!
//! - `core`: configuration loading and error types.
//! - `common`: the owned worker process handle and terminal output helpers.
//! - `supervisor`: validation, launch, stream supervision, and single
//!   settlement of each invocation.
//! - `worker`: the worker's computation, wire protocol, and entry adapters.
//!
pub mod common;
pub mod core;
pub mod supervisor;
pub mod worker;

pub use crate::core::error::{FailureKind, Invocation, SupervisorError};
pub use crate::supervisor::registry::{ExecutorRegistry, ExecutorSpec, NATIVE_KIND};
pub use crate::supervisor::report::{
    ExecutionOutcome, ExecutionReport, MessageOutcome, MessageReport,
};
pub use crate::supervisor::{Supervisor, SupervisorOptions};
