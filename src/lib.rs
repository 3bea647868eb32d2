// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod feedback;
pub mod fs;
pub mod logging;
pub mod project;
pub mod rpc;
pub mod types;

use std::sync::Arc;

use anyhow::Result;
use tokio::io::BufReader;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ServerConfig, load_or_default};
use crate::exec::ProcessExecutor;
use crate::feedback::{FeedbackWorkflow, GuiPrompter};
use crate::fs::RealFileSystem;
use crate::project::ProjectStore;
use crate::rpc::{Dispatcher, serve};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - settings loading
/// - process executor
/// - per-project store and prompt script
/// - the request loop on stdin/stdout
pub async fn run(args: CliArgs) -> Result<()> {
    let mut cfg = load_or_default(args.config.as_deref())?;
    if let Some(script) = args.gui_script {
        cfg.feedback.gui_script = Some(script);
    }
    debug!(?cfg, "effective settings");

    let dispatcher = build_dispatcher(&cfg);

    info!("interactive feedback server ready");
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve(&dispatcher, stdin, stdout).await?;

    info!("stdin closed; shutting down");
    Ok(())
}

/// Build the production dispatcher for the given settings.
pub fn build_dispatcher(cfg: &ServerConfig) -> Dispatcher {
    let executor = Arc::new(ProcessExecutor::new(cfg.executor.options()));
    let store = ProjectStore::new(Arc::new(RealFileSystem), cfg.feedback.history_limit);
    let prompter = Arc::new(GuiPrompter::new(
        cfg.feedback.python.clone(),
        cfg.feedback.gui_script.clone(),
    ));

    let workflow = FeedbackWorkflow::new(store, executor, prompter, cfg.feedback.command_wait());
    Dispatcher::new(Arc::new(workflow))
}
