// src/exec/handle.rs

//! In-memory record for one spawned command.

use std::fmt;
use std::process::ExitStatus;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, mpsc, watch};

/// Internal identifier for a spawned process.
///
/// Allocated from a monotonic counter and never reused, unlike the OS pid.
/// All registry lookups go through this id; the raw pid is only used for
/// the final OS call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl HandleId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a process ended.
///
/// A non-zero exit and a forced termination both land in `Failed`; the
/// description carries the distinguishing detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    Failed(String),
}

impl ExitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExitOutcome::Success)
    }

    /// Failure description, if any.
    pub fn failure(&self) -> Option<&str> {
        match self {
            ExitOutcome::Success => None,
            ExitOutcome::Failed(reason) => Some(reason),
        }
    }

    pub fn from_status(status: ExitStatus) -> Self {
        if status.success() {
            return ExitOutcome::Success;
        }
        if let Some(code) = status.code() {
            return ExitOutcome::Failed(format!("exit status {code}"));
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitOutcome::Failed(format!("terminated by signal {signal}"));
            }
        }
        ExitOutcome::Failed(status.to_string())
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Success => f.write_str("success"),
            ExitOutcome::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Shared view of one running (or recently finished) command.
///
/// The registry owns the long-lived `Arc`; callers keep a clone for as long
/// as they care about the output and the outcome. Output lines arrive
/// through a bounded stream that is closed once, after the process exited.
/// The completion signal is written once, after the process exited.
pub struct ProcessHandle {
    id: HandleId,
    pid: u32,
    command: String,
    started_at: DateTime<Utc>,
    running: AtomicBool,
    dropped: Arc<AtomicU64>,
    output: Mutex<mpsc::Receiver<String>>,
    completion: watch::Receiver<Option<ExitOutcome>>,
}

impl ProcessHandle {
    pub(crate) fn new(
        id: HandleId,
        pid: u32,
        command: impl Into<String>,
        output: mpsc::Receiver<String>,
        completion: watch::Receiver<Option<ExitOutcome>>,
        dropped: Arc<AtomicU64>,
    ) -> Self {
        Self {
            id,
            pid,
            command: command.into(),
            started_at: Utc::now(),
            running: AtomicBool::new(true),
            dropped,
            output: Mutex::new(output),
            completion,
        }
    }

    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Flip the running flag to `false`.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub(crate) fn mark_stopped(&self) -> bool {
        self.running.swap(false, Ordering::AcqRel)
    }

    /// Number of lines discarded because the stream was at capacity.
    pub fn dropped_lines(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Next output line, newline-terminated.
    ///
    /// Blocks until a line is available. Returns `None` once the stream has
    /// been closed and every buffered line was consumed.
    pub async fn next_line(&self) -> Option<String> {
        self.output.lock().await.recv().await
    }

    /// Drain the stream until it closes.
    pub async fn collect_output(&self) -> Vec<String> {
        let mut rx = self.output.lock().await;
        let mut lines = Vec::new();
        while let Some(line) = rx.recv().await {
            lines.push(line);
        }
        lines
    }

    /// Wait for the completion signal.
    ///
    /// Any number of callers may wait concurrently; all of them observe the
    /// same outcome.
    pub async fn wait(&self) -> ExitOutcome {
        let mut rx = self.completion.clone();
        if let Ok(value) = rx.wait_for(Option::is_some).await {
            if let Some(outcome) = value.as_ref() {
                return outcome.clone();
            }
        }
        ExitOutcome::Failed("completion signal dropped before exit was recorded".to_string())
    }

    /// Outcome if the process has already been finalized.
    pub fn try_outcome(&self) -> Option<ExitOutcome> {
        self.completion.borrow().clone()
    }
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("id", &self.id)
            .field("pid", &self.pid)
            .field("command", &self.command)
            .field("started_at", &self.started_at)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Detached = (
        ProcessHandle,
        mpsc::Sender<String>,
        watch::Sender<Option<ExitOutcome>>,
    );

    fn detached_handle() -> Detached {
        let (line_tx, line_rx) = mpsc::channel(4);
        let (done_tx, done_rx) = watch::channel(None);
        let handle = ProcessHandle::new(
            HandleId::new(1),
            4242,
            "true",
            line_rx,
            done_rx,
            Arc::new(AtomicU64::new(0)),
        );
        (handle, line_tx, done_tx)
    }

    #[test]
    fn running_flag_transitions_once() {
        let (handle, _tx, _done) = detached_handle();
        assert!(handle.is_running());
        assert!(handle.mark_stopped());
        assert!(!handle.mark_stopped());
        assert!(!handle.is_running());
    }

    #[tokio::test]
    async fn waiters_observe_the_same_outcome() {
        let (handle, _tx, done) = detached_handle();
        let handle = Arc::new(handle);
        assert!(handle.try_outcome().is_none());

        let a = tokio::spawn({
            let h = Arc::clone(&handle);
            async move { h.wait().await }
        });
        let b = tokio::spawn({
            let h = Arc::clone(&handle);
            async move { h.wait().await }
        });

        done.send_replace(Some(ExitOutcome::Failed("exit status 3".into())));

        assert_eq!(a.await.unwrap(), ExitOutcome::Failed("exit status 3".into()));
        assert_eq!(b.await.unwrap(), ExitOutcome::Failed("exit status 3".into()));
        let stored = handle.try_outcome().and_then(|o| o.failure().map(String::from));
        assert_eq!(stored.as_deref(), Some("exit status 3"));
    }

    #[tokio::test]
    async fn stream_ends_after_sender_is_dropped() {
        let (handle, tx, _done) = detached_handle();
        tx.send("one\n".to_string()).await.unwrap();
        drop(tx);
        assert_eq!(handle.next_line().await.as_deref(), Some("one\n"));
        assert_eq!(handle.next_line().await, None);
    }

    #[test]
    fn display_formats() {
        assert_eq!(HandleId::new(7).to_string(), "#7");
        assert_eq!(ExitOutcome::Success.to_string(), "success");
        assert_eq!(
            ExitOutcome::Failed("exit status 1".into()).to_string(),
            "failed: exit status 1"
        );
    }
}
