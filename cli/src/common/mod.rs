//! # childproc Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Shared utilities used by the supervisor and the CLI, kept apart from the
//! supervision logic (`supervisor::`) and core infrastructure (`core::`).
//!
//! - **`process`**: the owned `WorkerHandle` around a `tokio::process::Child`,
//!   with stream aggregation, deadline, output ceiling, and guaranteed reaping.
//! - **`ui`**: terminal rendering of results (aligned tables, JSON).
//!

/// Owned worker process handle: launch, stream collection, limits, and reaping.
pub mod process;
/// Terminal output helpers (tables, JSON rendering).
pub mod ui;
