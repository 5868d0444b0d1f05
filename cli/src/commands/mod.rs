//! # childproc Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! Command handlers for the `childproc` binary. The CLI has a single action,
//! running one task through the supervisor, so there is one module and no
//! subcommand layer.
//!
//! - `run`: argument definitions (`RunArgs`) and the `handle_run` handler.
//!

/// Runs one task through the supervisor and prints the result.
pub mod run;
