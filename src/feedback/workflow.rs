// src/feedback/workflow.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::errors::{FeedbackError, Result};
use crate::exec::{CommandRunner, ProcessHandle};
use crate::project::ProjectStore;
use crate::types::{ConversationEntry, FeedbackResult, ProjectConfig, Role};

use super::prompter::{FeedbackPrompter, PromptRequest};

/// Arguments of one `interactive_feedback` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRequest {
    pub project_directory: PathBuf,
    pub prompt: String,
    pub previous_user_request: String,
}

/// One feedback round-trip:
///
/// 1. record the previous user request and the prompt, save;
/// 2. start the project's command if it is set to run automatically;
/// 3. ask the human;
/// 4. stop the command if it is still running and collect its logs;
/// 5. record the feedback, save, and return everything.
pub struct FeedbackWorkflow {
    store: ProjectStore,
    runner: Arc<dyn CommandRunner>,
    prompter: Arc<dyn FeedbackPrompter>,
    command_wait: Duration,
}

impl FeedbackWorkflow {
    pub fn new(
        store: ProjectStore,
        runner: Arc<dyn CommandRunner>,
        prompter: Arc<dyn FeedbackPrompter>,
        command_wait: Duration,
    ) -> Self {
        Self {
            store,
            runner,
            prompter,
            command_wait,
        }
    }

    pub async fn run(&self, request: FeedbackRequest) -> Result<FeedbackResult> {
        let dir = request.project_directory.as_path();
        let mut config = self.store.load(dir);

        if !request.previous_user_request.trim().is_empty() {
            config
                .conversation_history
                .push(ConversationEntry::new(Role::User, request.previous_user_request.as_str()));
        }
        config
            .conversation_history
            .push(ConversationEntry::new(Role::Assistant, request.prompt.as_str()));

        if let Err(e) = self.store.ensure_ignored(dir) {
            warn!(project = ?dir, error = %e, "could not update .gitignore");
        }
        self.save_best_effort(&request, &mut config);

        let capture = config
            .auto_command()
            .map(|cmd| {
                CommandCapture::start(self.runner.as_ref(), cmd, &request.project_directory)
            });

        let prompt = PromptRequest {
            project_directory: request.project_directory.clone(),
            prompt: request.prompt.clone(),
        };
        let feedback = self.prompter.prompt(&prompt).await;

        let command_logs = match capture {
            Some(capture) => capture.finish(self.runner.as_ref(), self.command_wait).await,
            None => String::new(),
        };

        let feedback = feedback.map_err(FeedbackError::Other)?;

        if !feedback.is_empty() {
            config
                .conversation_history
                .push(ConversationEntry::new(Role::User, feedback.as_str()));
        }
        self.save_best_effort(&request, &mut config);

        Ok(FeedbackResult {
            command_logs,
            interactive_feedback: feedback,
            conversation_history: config.conversation_history,
        })
    }

    /// Run the round-trip and render it as the tool's text block.
    ///
    /// Failures become a readable error string; the caller always gets text.
    pub async fn run_to_text(&self, request: FeedbackRequest) -> String {
        match self.run(request).await {
            Ok(result) => serde_json::to_string_pretty(&result)
                .unwrap_or_else(|e| format!("Error creating feedback result: {e}")),
            Err(e) => {
                warn!(error = %e, "feedback round-trip failed");
                format!("Error collecting feedback: {e}")
            }
        }
    }

    /// Persisting is not allowed to lose the human's answer.
    fn save_best_effort(&self, request: &FeedbackRequest, config: &mut ProjectConfig) {
        if let Err(e) = self.store.save(&request.project_directory, config) {
            warn!(
                project = ?request.project_directory,
                error = %e,
                "could not save project config"
            );
        }
    }
}

/// Output collection for an auto-executed command.
enum CommandCapture {
    Running {
        handle: Arc<ProcessHandle>,
        collector: JoinHandle<String>,
        stop: oneshot::Sender<()>,
    },
    FailedToStart(String),
}

impl CommandCapture {
    fn start(runner: &dyn CommandRunner, command: &str, dir: &Path) -> Self {
        match runner.execute(command, dir) {
            Ok(handle) => {
                info!(
                    id = %handle.id(),
                    pid = handle.pid(),
                    cmd = %command,
                    "auto-executing project command"
                );
                let (stop, stop_rx) = oneshot::channel();
                let collector = tokio::spawn(collect_lines(Arc::clone(&handle), stop_rx));
                CommandCapture::Running {
                    handle,
                    collector,
                    stop,
                }
            }
            Err(e) => {
                warn!(cmd = %command, error = %e, "auto-execute failed to start");
                CommandCapture::FailedToStart(format!("$ {command}\nError: {e}\n"))
            }
        }
    }

    async fn finish(self, runner: &dyn CommandRunner, wait: Duration) -> String {
        let (handle, collector, stop) = match self {
            CommandCapture::FailedToStart(logs) => return logs,
            CommandCapture::Running {
                handle,
                collector,
                stop,
            } => (handle, collector, stop),
        };

        if handle.is_running() {
            match runner.kill_tree(handle.id()) {
                Ok(()) => debug!(id = %handle.id(), "stopped command after feedback"),
                Err(FeedbackError::ProcessNotFound(_)) => {}
                Err(e) => warn!(id = %handle.id(), error = %e, "could not stop command"),
            }
        }

        let summary = match timeout(wait, handle.wait()).await {
            Ok(outcome) => format!("[exit] {outcome}\n"),
            Err(_) => {
                // Stream stays open until exit; stop collecting what we have.
                let _ = stop.send(());
                format!("[exit] still running after {}ms\n", wait.as_millis())
            }
        };

        let mut logs = collector
            .await
            .unwrap_or_else(|e| format!("[output] collector failed: {e}\n"));
        let dropped = handle.dropped_lines();
        if dropped > 0 {
            logs.push_str(&format!("[output] {dropped} lines dropped\n"));
        }
        logs.push_str(&summary);
        logs
    }
}

async fn collect_lines(handle: Arc<ProcessHandle>, mut stop: oneshot::Receiver<()>) -> String {
    let mut logs = format!("$ {}\n", handle.command());
    loop {
        tokio::select! {
            biased;
            line = handle.next_line() => match line {
                Some(line) => logs.push_str(&line),
                None => break,
            },
            _ = &mut stop => break,
        }
    }
    logs
}
