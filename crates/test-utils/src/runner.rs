use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use interactive_feedback::errors::{FeedbackError, Result};
use interactive_feedback::exec::{
    CommandRunner, ExecutorOptions, HandleId, ProcessExecutor, ProcessHandle,
};

/// A runner that:
/// - records every command it was asked to start (and where)
/// - records every kill request
/// - delegates the real work to a `ProcessExecutor`.
#[derive(Debug, Clone)]
pub struct RecordingRunner {
    inner: ProcessExecutor,
    executed: Arc<Mutex<Vec<(String, PathBuf)>>>,
    killed: Arc<Mutex<Vec<HandleId>>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::with_options(ExecutorOptions::default())
    }

    pub fn with_options(options: ExecutorOptions) -> Self {
        Self {
            inner: ProcessExecutor::new(options),
            executed: Arc::new(Mutex::new(Vec::new())),
            killed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn executor(&self) -> &ProcessExecutor {
        &self.inner
    }

    /// Commands started so far, in call order.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().iter().map(|(cmd, _)| cmd.clone()).collect()
    }

    pub fn executed_dirs(&self) -> Vec<PathBuf> {
        self.executed.lock().unwrap().iter().map(|(_, dir)| dir.clone()).collect()
    }

    pub fn killed(&self) -> Vec<HandleId> {
        self.killed.lock().unwrap().clone()
    }
}

impl Default for RecordingRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for RecordingRunner {
    fn execute(&self, command: &str, working_dir: &Path) -> Result<Arc<ProcessHandle>> {
        self.executed
            .lock()
            .unwrap()
            .push((command.to_string(), working_dir.to_path_buf()));
        self.inner.execute(command, working_dir)
    }

    fn kill_tree(&self, id: HandleId) -> Result<()> {
        self.killed.lock().unwrap().push(id);
        self.inner.kill_tree(id)
    }
}

/// A runner whose every spawn fails, as if the shell were missing.
#[derive(Debug, Clone, Default)]
pub struct FailingRunner;

impl CommandRunner for FailingRunner {
    fn execute(&self, command: &str, _working_dir: &Path) -> Result<Arc<ProcessHandle>> {
        Err(FeedbackError::Spawn {
            command: command.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "shell not found"),
        })
    }

    fn kill_tree(&self, id: HandleId) -> Result<()> {
        Err(FeedbackError::ProcessNotFound(id))
    }
}
