// src/exec/backend.rs

//! Pluggable command-runner abstraction.
//!
//! The feedback workflow talks to a `CommandRunner` instead of a concrete
//! executor. Production code uses [`ProcessExecutor`]; tests can wrap it to
//! record calls or substitute a runner that always fails to spawn.

use std::path::Path;
use std::sync::Arc;

use crate::errors::Result;

use super::executor::ProcessExecutor;
use super::handle::{HandleId, ProcessHandle};

/// Trait abstracting how commands are started and stopped.
pub trait CommandRunner: Send + Sync {
    /// Start `command` in `working_dir` without waiting for it.
    fn execute(&self, command: &str, working_dir: &Path) -> Result<Arc<ProcessHandle>>;

    /// Terminate the process tree behind `id`.
    fn kill_tree(&self, id: HandleId) -> Result<()>;
}

impl CommandRunner for ProcessExecutor {
    fn execute(&self, command: &str, working_dir: &Path) -> Result<Arc<ProcessHandle>> {
        ProcessExecutor::execute(self, command, working_dir)
    }

    fn kill_tree(&self, id: HandleId) -> Result<()> {
        ProcessExecutor::kill_tree(self, id)
    }
}
