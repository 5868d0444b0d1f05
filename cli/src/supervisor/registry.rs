//! Executor kinds and how to launch them.
//!
//! An executor is a `{command, script, args}` triple. Launching kind `k` with
//! size `n` runs `command args... script n`; the script is optional for
//! executors that are themselves binaries (like the bundled `native` worker).

use crate::common::process::LaunchCommand;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Name of the always-available executor backed by `childproc-worker`.
pub const NATIVE_KIND: &str = "native";

/// How to launch one executor kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorSpec {
    pub command: PathBuf,
    pub script: Option<PathBuf>,
    pub args: Vec<String>,
}

impl ExecutorSpec {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            script: None,
            args: Vec::new(),
        }
    }

    pub fn with_script(mut self, script: impl Into<PathBuf>) -> Self {
        self.script = Some(script.into());
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// `command args... [script]`, without the task parameter.
    pub fn launch(&self, cwd: Option<PathBuf>) -> LaunchCommand {
        let mut launch = LaunchCommand::new(&self.command).cwd(cwd);
        for arg in &self.args {
            launch = launch.arg(arg);
        }
        if let Some(script) = &self.script {
            launch = launch.arg(script);
        }
        launch
    }
}

/// Map of executor kind name to launch spec.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutorRegistry {
    executors: BTreeMap<String, ExecutorSpec>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) an executor. Kind names are stored lowercase.
    pub fn insert(&mut self, kind: impl AsRef<str>, spec: ExecutorSpec) -> Option<ExecutorSpec> {
        self.executors.insert(kind.as_ref().to_lowercase(), spec)
    }

    pub fn with(mut self, kind: impl AsRef<str>, spec: ExecutorSpec) -> Self {
        self.insert(kind, spec);
        self
    }

    pub fn get(&self, kind: &str) -> Option<&ExecutorSpec> {
        self.executors.get(kind)
    }

    /// Registered kinds in sorted order.
    pub fn kinds(&self) -> Vec<&str> {
        self.executors.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }
}
