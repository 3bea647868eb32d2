// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::exec::{DEFAULT_DRAIN_GRACE, DEFAULT_OUTPUT_CAPACITY, ExecutorOptions};
use crate::project::DEFAULT_HISTORY_LIMIT;

/// Settings as read from a TOML file, before validation.
///
/// ```toml
/// [executor]
/// output_capacity = 100
/// drain_grace_ms = 250
///
/// [feedback]
/// history_limit = 10
/// gui_script = "/opt/feedback/desktop_gui_single.py"
/// python = "python3"
/// command_wait_ms = 5000
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawServerConfig {
    #[serde(default)]
    pub executor: ExecutorSection,

    #[serde(default)]
    pub feedback: FeedbackSection,
}

/// Validated settings. Build one with `ServerConfig::try_from(raw)` or
/// `ServerConfig::default()`.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    pub executor: ExecutorSection,
    pub feedback: FeedbackSection,
}

impl ServerConfig {
    pub(crate) fn new_unchecked(executor: ExecutorSection, feedback: FeedbackSection) -> Self {
        Self { executor, feedback }
    }
}

/// `[executor]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutorSection {
    /// Lines buffered per process before new lines are dropped.
    #[serde(default = "default_output_capacity")]
    pub output_capacity: usize,

    /// Milliseconds to keep draining pipes after the process exited.
    #[serde(default = "default_drain_grace_ms")]
    pub drain_grace_ms: u64,
}

fn default_output_capacity() -> usize {
    DEFAULT_OUTPUT_CAPACITY
}

fn default_drain_grace_ms() -> u64 {
    DEFAULT_DRAIN_GRACE.as_millis() as u64
}

impl Default for ExecutorSection {
    fn default() -> Self {
        Self {
            output_capacity: default_output_capacity(),
            drain_grace_ms: default_drain_grace_ms(),
        }
    }
}

impl ExecutorSection {
    pub fn options(&self) -> ExecutorOptions {
        ExecutorOptions {
            output_capacity: self.output_capacity,
            drain_grace: Duration::from_millis(self.drain_grace_ms),
        }
    }
}

/// `[feedback]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackSection {
    /// Conversation entries kept per project.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Desktop prompt script. If `None`, the script is looked up next to
    /// the executable.
    #[serde(default)]
    pub gui_script: Option<PathBuf>,

    /// Interpreter used to run the prompt script.
    #[serde(default = "default_python")]
    pub python: String,

    /// How long to wait for an auto-executed command to finish after the
    /// feedback came back.
    #[serde(default = "default_command_wait_ms")]
    pub command_wait_ms: u64,
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_python() -> String {
    "python3".to_string()
}

fn default_command_wait_ms() -> u64 {
    5_000
}

impl Default for FeedbackSection {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            gui_script: None,
            python: default_python(),
            command_wait_ms: default_command_wait_ms(),
        }
    }
}

impl FeedbackSection {
    pub fn command_wait(&self) -> Duration {
        Duration::from_millis(self.command_wait_ms)
    }
}
