//! # childproc Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! Foundational pieces used by both the supervisor and the CLI:
//! - `config`: configuration loading, merging, and validation
//! - `error`: error types and the `Result` alias
//!
//! ## Usage
//!
//! ```rust,ignore
//! use childproc::core::config; // For loading configuration
//! use childproc::core::error::{ChildprocError, Result}; // For error handling
//! ```
//!
pub mod config;
pub mod error;
