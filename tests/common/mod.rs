#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use interactive_feedback::feedback::FeedbackWorkflow;
use interactive_feedback::fs::RealFileSystem;
use interactive_feedback::project::ProjectStore;
use interactive_feedback::rpc::Dispatcher;
use interactive_feedback::types::ProjectConfig;
use interactive_feedback_test_utils::{RecordingRunner, ScriptedPrompter};
use sysinfo::{Pid, ProcessStatus, ProcessesToUpdate, System};

pub use interactive_feedback_test_utils::{init_tracing, with_timeout};

/// Workflow over the real filesystem with a recording runner and a
/// scripted human.
pub fn workflow(
    runner: RecordingRunner,
    prompter: ScriptedPrompter,
    history_limit: usize,
    command_wait: Duration,
) -> FeedbackWorkflow {
    let store = ProjectStore::new(Arc::new(RealFileSystem), history_limit);
    FeedbackWorkflow::new(store, Arc::new(runner), Arc::new(prompter), command_wait)
}

pub fn dispatcher(answer: &str) -> Dispatcher {
    let wf = workflow(
        RecordingRunner::new(),
        ScriptedPrompter::answering(answer),
        10,
        Duration::from_secs(5),
    );
    Dispatcher::new(Arc::new(wf))
}

/// Write a project record into `dir`.
pub fn write_project_config(dir: &Path, config: &ProjectConfig) {
    let data = serde_json::to_string_pretty(config).unwrap();
    std::fs::write(ProjectStore::config_path(dir), data).unwrap();
}

pub fn read_project_config(dir: &Path) -> ProjectConfig {
    let raw = std::fs::read_to_string(ProjectStore::config_path(dir)).unwrap();
    serde_json::from_str(&raw).unwrap()
}

/// Whether `pid` exists and is not a zombie.
pub fn is_alive(pid: u32) -> bool {
    let pid = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    system
        .process(pid)
        .is_some_and(|p| !matches!(p.status(), ProcessStatus::Zombie | ProcessStatus::Dead))
}

/// Poll until `pid` is gone or `limit` elapses.
pub async fn wait_until_dead(pid: u32, limit: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if !is_alive(pid) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    !is_alive(pid)
}
