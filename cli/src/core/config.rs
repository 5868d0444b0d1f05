//! # childproc Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module loads, merges, and validates configuration: supervisor limits
//! and the table of executor kinds the supervisor may launch.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. An explicit file passed with `--config`, used on its own
//! 2. Project-specific `.childproc.toml` in current directory or ancestors
//! 3. User-specific `<config dir>/childproc/config.toml`
//! 4. Default values defined in the code
//!
//! The `native` executor is always present. It points at `childproc-worker`
//! next to the running binary, or at `$CHILDPROC_WORKER` when set, unless the
//! configuration defines `[executors.native]` itself.
//!
//! ## Examples
//!
//! ```toml
//! [supervisor]
//! timeout_ms = 5000
//! max_buffer = 1048576
//!
//! [executors.python]
//! command = "python3"
//! script = "~/scripts/child-script.py"
//! ```
//!
use crate::core::error::{ChildprocError, Result};
use crate::supervisor::registry::{ExecutorRegistry, ExecutorSpec, NATIVE_KIND};
use crate::supervisor::{SupervisorOptions, DEFAULT_KILL_GRACE, DEFAULT_MAX_BUFFER};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Environment variable overriding the location of the native worker binary.
pub const WORKER_PATH_ENV: &str = "CHILDPROC_WORKER";

const PROJECT_CONFIG_FILENAME: &str = ".childproc.toml";
const WORKER_BINARY: &str = "childproc-worker";

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub supervisor: SupervisorConfig,
    /// Executor kinds by name.
    #[serde(default)]
    pub executors: BTreeMap<String, ExecutorConfig>,
}

/// Limits applied to every supervised invocation.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SupervisorConfig {
    /// Wall-clock ceiling in milliseconds. Absent means no timeout.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Ceiling on combined worker output in bytes. `0` disables the ceiling.
    #[serde(default = "default_max_buffer")]
    pub max_buffer: usize,
    /// Grace period for a settled worker before it is killed.
    #[serde(default = "default_kill_grace_ms")]
    pub kill_grace_ms: u64,
    /// Working directory for launched workers (can use ~).
    #[serde(default)]
    pub cwd: Option<String>,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: None,
            max_buffer: default_max_buffer(),
            kill_grace_ms: default_kill_grace_ms(),
            cwd: None,
        }
    }
}

/// Configuration for a single executor kind.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ExecutorConfig {
    /// Program to run (can use ~).
    pub command: String,
    /// Script passed to the program before the task parameter (can use ~).
    #[serde(default)]
    pub script: Option<String>,
    /// Extra arguments placed before the script.
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_max_buffer() -> usize {
    DEFAULT_MAX_BUFFER
}
fn default_kill_grace_ms() -> u64 {
    DEFAULT_KILL_GRACE.as_millis() as u64
}

impl Config {
    /// Executor registry: the built-in `native` worker plus configured kinds.
    pub fn registry(&self) -> ExecutorRegistry {
        let mut registry = ExecutorRegistry::new();
        registry.insert(NATIVE_KIND, ExecutorSpec::new(native_worker_path()));
        for (kind, executor) in &self.executors {
            let mut spec = ExecutorSpec::new(&executor.command).with_args(executor.args.clone());
            if let Some(script) = &executor.script {
                spec = spec.with_script(script);
            }
            registry.insert(kind, spec);
        }
        registry
    }

    /// Supervisor limits derived from the `[supervisor]` section.
    pub fn supervisor_options(&self) -> SupervisorOptions {
        let s = &self.supervisor;
        SupervisorOptions {
            timeout: s.timeout_ms.map(Duration::from_millis),
            max_buffer: (s.max_buffer > 0).then_some(s.max_buffer),
            kill_grace: Duration::from_millis(s.kill_grace_ms),
            cwd: s.cwd.as_ref().map(PathBuf::from),
        }
    }
}

/// Locate the bundled worker binary.
pub fn native_worker_path() -> PathBuf {
    if let Some(path) = std::env::var_os(WORKER_PATH_ENV) {
        return PathBuf::from(path);
    }
    let file_name = format!("{}{}", WORKER_BINARY, std::env::consts::EXE_SUFFIX);
    match std::env::current_exe() {
        Ok(exe) => exe.with_file_name(file_name),
        Err(e) => {
            warn!(
                "Could not locate the running executable ({}); relying on PATH for {}",
                e, WORKER_BINARY
            );
            PathBuf::from(file_name)
        }
    }
}

/// Load configuration. With `explicit`, only that file is read (on top of
/// defaults); otherwise user and project files are merged.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut config = match explicit {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            load_config_from_path(path)?
        }
        None => {
            let user_config = load_user_config()?;
            let project_config = load_project_config()?;
            merge_configs(user_config.unwrap_or_default(), project_config)
        }
    };
    expand_config_paths(&mut config).context("Failed to expand paths in configuration")?;
    validate_config(&config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", config);
    Ok(config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "childproc", "childproc") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config() -> Result<Option<Config>> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    if let Some(project_config_path) = find_project_config_path(&current_dir) {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_config_from_path(&project_config_path).map(Some)
    } else {
        debug!("No project configuration file (.childproc.toml) found in current directory or ancestors.");
        Ok(None)
    }
}

/// Walk from `start` up to the filesystem root (or the first `.git`
/// directory) looking for `.childproc.toml`.
fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path = start;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Project values win where they differ from the defaults; executor tables
/// are combined with project entries replacing user entries of the same kind.
fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let project_cfg = match project {
        Some(p) => p,
        None => return user,
    };
    let defaults = SupervisorConfig::default();
    let mut merged = Config::default();

    merged.supervisor.timeout_ms = project_cfg
        .supervisor
        .timeout_ms
        .or(user.supervisor.timeout_ms);
    merged.supervisor.max_buffer = if project_cfg.supervisor.max_buffer != defaults.max_buffer {
        project_cfg.supervisor.max_buffer
    } else {
        user.supervisor.max_buffer
    };
    merged.supervisor.kill_grace_ms =
        if project_cfg.supervisor.kill_grace_ms != defaults.kill_grace_ms {
            project_cfg.supervisor.kill_grace_ms
        } else {
            user.supervisor.kill_grace_ms
        };
    merged.supervisor.cwd = project_cfg.supervisor.cwd.or(user.supervisor.cwd);

    merged.executors = user.executors;
    merged.executors.extend(project_cfg.executors);
    merged
}

fn expand_config_paths(config: &mut Config) -> Result<()> {
    debug!("Expanding paths in configuration...");
    if let Some(cwd) = &mut config.supervisor.cwd {
        *cwd = shellexpand::tilde(cwd).into_owned();
        debug!("Expanded worker cwd: {}", cwd);
    }
    for (kind, executor) in &mut config.executors {
        executor.command = shellexpand::tilde(&executor.command).into_owned();
        if let Some(script) = &mut executor.script {
            *script = shellexpand::tilde(script).into_owned();
        }
        debug!("Expanded executor '{}': {:?}", kind, executor);
    }
    Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
    info!("Validating final configuration...");
    if config.supervisor.timeout_ms == Some(0) {
        return Err(anyhow!(ChildprocError::Config(
            "supervisor.timeout_ms must be greater than zero (omit it to disable the timeout)."
                .to_string()
        )));
    }
    if let Some(cwd) = &config.supervisor.cwd {
        let dir = PathBuf::from(cwd);
        if !dir.is_dir() {
            return Err(anyhow!(ChildprocError::Config(format!(
                "Configured worker directory '{}' does not exist or is not a directory.",
                dir.display()
            ))));
        }
    }
    for (kind, executor) in &config.executors {
        if kind.is_empty() || kind.chars().any(|c| c.is_uppercase() || c.is_whitespace()) {
            return Err(anyhow!(ChildprocError::Config(format!(
                "Invalid executor kind '{}'. Kinds must be non-empty, lowercase, and contain no whitespace.",
                kind
            ))));
        }
        if executor.command.trim().is_empty() {
            return Err(anyhow!(ChildprocError::Config(format!(
                "Executor '{}' has an empty command.",
                kind
            ))));
        }
        if let Some(script) = &executor.script {
            if !Path::new(script).exists() {
                warn!("Script for executor '{}' does not exist: {}", kind, script);
            }
        }
    }
    info!("Configuration validation successful.");
    Ok(())
}
