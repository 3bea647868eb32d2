// src/feedback/prompter.rs

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;

use anyhow::{Context, Result, bail};
use tokio::process::Command;
use tracing::{debug, info};

/// File name of the desktop prompt script looked up next to the binary.
pub const GUI_SCRIPT_NAME: &str = "desktop_gui_single.py";

/// What the human is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub project_directory: PathBuf,
    pub prompt: String,
}

/// Trait abstracting how feedback is collected from the human.
///
/// Production code uses [`GuiPrompter`]; tests provide scripted answers.
pub trait FeedbackPrompter: Send + Sync {
    /// Show `request` and return the (possibly empty) feedback text.
    fn prompt<'a>(
        &'a self,
        request: &'a PromptRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;
}

/// Runs the desktop prompt script and reads the feedback from its STDOUT.
#[derive(Debug, Clone)]
pub struct GuiPrompter {
    python: String,
    script: Option<PathBuf>,
}

impl GuiPrompter {
    pub fn new(python: impl Into<String>, script: Option<PathBuf>) -> Self {
        Self {
            python: python.into(),
            script,
        }
    }

    /// Configured script, or the first of `<exe dir>/<name>` and
    /// `<exe dir>/../<name>` that exists.
    fn resolve_script(&self) -> Result<PathBuf> {
        if let Some(script) = &self.script {
            if script.is_file() {
                return Ok(script.clone());
            }
            bail!("prompt script not found at {:?}", script);
        }

        let exe = std::env::current_exe().context("locating current executable")?;
        let exe_dir = exe.parent().unwrap_or(Path::new("."));
        [exe_dir.join(GUI_SCRIPT_NAME), exe_dir.join("..").join(GUI_SCRIPT_NAME)]
            .into_iter()
            .find(|candidate| candidate.is_file())
            .with_context(|| {
                format!("{GUI_SCRIPT_NAME} not found next to {:?}; pass --gui-script", exe_dir)
            })
    }

    async fn run_script(&self, request: &PromptRequest) -> Result<String> {
        let script = self.resolve_script()?;
        let script_dir = script.parent().unwrap_or(Path::new(".")).to_path_buf();

        info!(script = ?script, project = ?request.project_directory, "opening feedback prompt");

        let output = Command::new(&self.python)
            .arg(&script)
            .arg(&request.project_directory)
            .arg(&request.prompt)
            .current_dir(&script_dir)
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("running {} {:?}", self.python, script))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("prompt script exited with {}: {}", output.status, stderr.trim());
        }

        let feedback = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!(chars = feedback.len(), "feedback received");
        Ok(feedback)
    }
}

impl FeedbackPrompter for GuiPrompter {
    fn prompt<'a>(
        &'a self,
        request: &'a PromptRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(self.run_script(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_configured_script_is_an_error() {
        let prompter = GuiPrompter::new("python3", Some(PathBuf::from("/definitely/not/here.py")));
        let err = prompter.resolve_script().unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn script_stdout_becomes_feedback() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("answer.sh");
        std::fs::write(&script, "echo \"  looks good for $1  \"\n").unwrap();

        // `sh` stands in for the interpreter.
        let prompter = GuiPrompter::new("sh", Some(script));
        let request = PromptRequest {
            project_directory: PathBuf::from("demo"),
            prompt: "Review?".into(),
        };

        let feedback = prompter.prompt(&request).await.unwrap();
        assert_eq!(feedback, "looks good for demo");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_script_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fail.sh");
        std::fs::write(&script, "echo 'no display' >&2\nexit 3\n").unwrap();

        let prompter = GuiPrompter::new("sh", Some(script));
        let request = PromptRequest {
            project_directory: PathBuf::from("."),
            prompt: "Review?".into(),
        };

        let err = prompter.prompt(&request).await.unwrap_err();
        assert!(err.to_string().contains("no display"));
    }
}
