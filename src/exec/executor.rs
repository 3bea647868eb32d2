// src/exec/executor.rs

//! Spawn, drain, wait, finalize, and tree-kill.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, warn};

use crate::errors::{FeedbackError, Result};

use super::handle::{ExitOutcome, HandleId, ProcessHandle};
use super::output::{OutputSink, StreamKind, spawn_drain};
use super::registry::ProcessRegistry;
use super::signal::{TermSignal, TreeSignaller, platform_signaller};

/// Default capacity of a handle's output stream.
pub const DEFAULT_OUTPUT_CAPACITY: usize = 100;

/// Default time the completion waiter gives the drain tasks to flush after
/// the process exited.
pub const DEFAULT_DRAIN_GRACE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy)]
pub struct ExecutorOptions {
    /// Bounded capacity of each handle's line stream.
    pub output_capacity: usize,
    /// How long to wait for pipes to reach EOF once the process has exited.
    /// Descendants that inherited the pipes can keep them open forever, so
    /// the drains are aborted after this.
    pub drain_grace: Duration,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            output_capacity: DEFAULT_OUTPUT_CAPACITY,
            drain_grace: DEFAULT_DRAIN_GRACE,
        }
    }
}

/// Runs shell commands and tracks them until they are reaped.
///
/// No admission control: every `execute` call spawns immediately.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    registry: Arc<ProcessRegistry>,
    signaller: Arc<dyn TreeSignaller>,
    options: ExecutorOptions,
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new(ExecutorOptions::default())
    }
}

impl ProcessExecutor {
    pub fn new(options: ExecutorOptions) -> Self {
        Self::with_signaller(options, platform_signaller())
    }

    pub fn with_signaller(options: ExecutorOptions, signaller: Arc<dyn TreeSignaller>) -> Self {
        Self {
            registry: Arc::new(ProcessRegistry::new()),
            signaller,
            options: ExecutorOptions {
                output_capacity: options.output_capacity.max(1),
                ..options
            },
        }
    }

    pub fn registry(&self) -> &Arc<ProcessRegistry> {
        &self.registry
    }

    pub fn options(&self) -> ExecutorOptions {
        self.options
    }

    /// Spawn `command` through the platform shell in `working_dir`.
    ///
    /// Returns as soon as the process is running; draining and completion
    /// detection happen on background tasks. Must be called from within a
    /// Tokio runtime. Nothing is registered if the spawn fails.
    pub fn execute(&self, command: &str, working_dir: &Path) -> Result<Arc<ProcessHandle>> {
        let spawn_err = |source: std::io::Error| FeedbackError::Spawn {
            command: command.to_string(),
            source,
        };

        let mut child = shell_command(command, working_dir).spawn().map_err(spawn_err)?;

        let (Some(pid), Some(stdout), Some(stderr)) =
            (child.id(), child.stdout.take(), child.stderr.take())
        else {
            let _ = child.start_kill();
            return Err(spawn_err(std::io::Error::other("child pipes unavailable after spawn")));
        };

        let (line_tx, line_rx) = mpsc::channel(self.options.output_capacity);
        let (done_tx, done_rx) = watch::channel(None);
        let dropped = Arc::new(AtomicU64::new(0));

        let id = self.registry.allocate_id();
        let handle = Arc::new(ProcessHandle::new(
            id,
            pid,
            command,
            line_rx,
            done_rx,
            Arc::clone(&dropped),
        ));
        self.registry.insert(Arc::clone(&handle));

        info!(%id, pid, cmd = %command, dir = ?working_dir, "spawned command");

        let drains = vec![
            spawn_drain(
                stdout,
                StreamKind::Stdout,
                OutputSink::new(line_tx.clone(), Arc::clone(&dropped)),
                id,
            ),
            spawn_drain(
                stderr,
                StreamKind::Stderr,
                OutputSink::new(line_tx.clone(), dropped),
                id,
            ),
        ];

        let finalizer = Finalizer {
            handle: Arc::clone(&handle),
            completion: done_tx,
            stream: line_tx,
            registry: Arc::clone(&self.registry),
        };
        tokio::spawn(wait_for_exit(child, drains, finalizer, self.options.drain_grace));

        Ok(handle)
    }

    /// Terminate the process tree behind `id`.
    ///
    /// Fire-and-forget: signal delivery failures are logged and escalated,
    /// never returned, and process death is not awaited. The completion
    /// waiter still observes the exit and finalizes the handle.
    pub fn kill_tree(&self, id: HandleId) -> Result<()> {
        let signaller = Arc::clone(&self.signaller);
        let not_found = || FeedbackError::ProcessNotFound(id);

        // The process-table walk is slow; take it before locking.
        let pid = self.registry.get(id).ok_or_else(not_found)?.pid();
        let descendants = if signaller.supports_groups() {
            Vec::new()
        } else {
            signaller.descendants(pid)
        };

        self.registry
            .with_handle(id, |handle| {
                info!(%id, pid, "terminating process tree");

                if signaller.supports_groups() {
                    signal_with_escalation(pid, "group", |s| signaller.signal_group(pid, s));
                } else {
                    for &child in &descendants {
                        signal_with_escalation(child, "descendant", |s| {
                            signaller.signal_process(child, s)
                        });
                    }
                    signal_with_escalation(pid, "root", |s| signaller.signal_process(pid, s));
                }

                handle.mark_stopped();
            })
            .ok_or_else(not_found)
    }
}

/// Graceful first; forceful right away if the graceful call itself errored.
fn signal_with_escalation(
    pid: u32,
    target: &str,
    send: impl Fn(TermSignal) -> std::io::Result<()>,
) {
    let Err(e) = send(TermSignal::Graceful) else {
        return;
    };
    debug!(pid, target, error = %e, "graceful termination failed; escalating");
    if let Err(e) = send(TermSignal::Forceful) {
        warn!(pid, target, error = %e, "forceful termination failed");
    }
}

/// Build a shell command appropriate for the platform.
fn shell_command(command: &str, working_dir: &Path) -> Command {
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command);
        c
    };

    cmd.current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    // New group so the whole tree can be signalled at once.
    #[cfg(unix)]
    cmd.process_group(0);
    #[cfg(windows)]
    cmd.creation_flags(0x0000_0200); // CREATE_NEW_PROCESS_GROUP

    cmd
}

/// Everything needed to finalize one handle. Consumed by
/// [`Finalizer::finalize`], so a handle is finalized at most once.
struct Finalizer {
    handle: Arc<ProcessHandle>,
    completion: watch::Sender<Option<ExitOutcome>>,
    /// Last producer of the output stream; dropping it closes the stream.
    stream: mpsc::Sender<String>,
    registry: Arc<ProcessRegistry>,
}

impl Finalizer {
    /// The root has been reaped: flip the running flag, then publish the
    /// outcome. Waiters wake here, before the pipes have settled.
    fn publish(&self, outcome: ExitOutcome) {
        self.handle.mark_stopped();
        self.completion.send_replace(Some(outcome));
    }

    /// The pipes have settled: close the stream and deregister, under one
    /// registry lock.
    fn finalize(self) {
        let Finalizer {
            handle,
            stream,
            registry,
            ..
        } = self;
        let id = handle.id();

        registry.finalize(id, move || drop(stream));

        debug!(%id, "handle finalized and deregistered");
    }
}

async fn wait_for_exit(
    mut child: Child,
    drains: Vec<JoinHandle<()>>,
    finalizer: Finalizer,
    grace: Duration,
) {
    let id = finalizer.handle.id();

    let outcome = match child.wait().await {
        Ok(status) => ExitOutcome::from_status(status),
        Err(e) => ExitOutcome::Failed(format!("waiting for process failed: {e}")),
    };

    info!(%id, pid = finalizer.handle.pid(), %outcome, "command exited");
    finalizer.publish(outcome);

    settle_drains(id, drains, grace).await;
    finalizer.finalize();
}

/// Give the drain tasks until `grace` elapses to reach EOF, then abort the
/// rest. On return no drain task holds a stream sender any more.
async fn settle_drains(id: HandleId, drains: Vec<JoinHandle<()>>, grace: Duration) {
    let deadline = Instant::now() + grace;
    for mut drain in drains {
        if timeout_at(deadline, &mut drain).await.is_err() {
            debug!(%id, "output pipe still open after exit; aborting drain");
            drain.abort();
            let _ = drain.await;
        }
    }
}
