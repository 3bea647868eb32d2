use std::io;
use std::sync::{Arc, Mutex};

use interactive_feedback::exec::{TermSignal, TreeSignaller, platform_signaller};

/// A signaller that:
/// - records every signal it was asked to send, in order
/// - optionally refuses the graceful signal, to force escalation
/// - otherwise delegates to the platform signaller.
#[derive(Debug)]
pub struct RecordingSignaller {
    inner: Arc<dyn TreeSignaller>,
    refuse_graceful: bool,
    sent: Mutex<Vec<TermSignal>>,
}

impl RecordingSignaller {
    pub fn new() -> Self {
        Self {
            inner: platform_signaller(),
            refuse_graceful: false,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn refusing_graceful() -> Self {
        Self {
            refuse_graceful: true,
            ..Self::new()
        }
    }

    pub fn sent(&self) -> Vec<TermSignal> {
        self.sent.lock().unwrap().clone()
    }

    fn record(&self, signal: TermSignal) -> io::Result<()> {
        self.sent.lock().unwrap().push(signal);
        if self.refuse_graceful && signal == TermSignal::Graceful {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "graceful signal refused"));
        }
        Ok(())
    }
}

impl Default for RecordingSignaller {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeSignaller for RecordingSignaller {
    fn supports_groups(&self) -> bool {
        self.inner.supports_groups()
    }

    fn signal_group(&self, pgid: u32, signal: TermSignal) -> io::Result<()> {
        self.record(signal)?;
        self.inner.signal_group(pgid, signal)
    }

    fn signal_process(&self, pid: u32, signal: TermSignal) -> io::Result<()> {
        self.record(signal)?;
        self.inner.signal_process(pid, signal)
    }

    fn descendants(&self, pid: u32) -> Vec<u32> {
        self.inner.descendants(pid)
    }
}
