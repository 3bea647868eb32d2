// src/exec/output.rs

//! Output multiplexing: stdout and stderr drained concurrently into one
//! bounded line stream.
//!
//! Lines from the two pipes interleave in whatever order the OS delivers
//! them; lines of a single pipe keep their order. Every line is
//! newline-terminated and stderr lines carry [`ERROR_TAG`].
//!
//! Delivery is lossy-but-live: a line offered to a full stream is dropped
//! and counted, so a slow consumer never stalls the child process.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use super::handle::HandleId;

/// Marker prepended to every stderr line.
pub const ERROR_TAG: &str = "[ERROR] ";

/// Longest line delivered in one piece; longer lines are split.
pub const MAX_LINE_BYTES: u64 = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    fn tag(self) -> &'static str {
        match self {
            StreamKind::Stdout => "",
            StreamKind::Stderr => ERROR_TAG,
        }
    }
}

/// Result of offering one line to the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Offer {
    Delivered,
    Dropped,
    Closed,
}

/// Producer side of a handle's output stream.
#[derive(Debug, Clone)]
pub(crate) struct OutputSink {
    tx: mpsc::Sender<String>,
    dropped: Arc<AtomicU64>,
}

impl OutputSink {
    pub(crate) fn new(tx: mpsc::Sender<String>, dropped: Arc<AtomicU64>) -> Self {
        Self { tx, dropped }
    }

    /// Non-blocking offer; never waits for capacity.
    pub(crate) fn offer(&self, line: String) -> Offer {
        match self.tx.try_send(line) {
            Ok(()) => Offer::Delivered,
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                Offer::Dropped
            }
            Err(TrySendError::Closed(_)) => Offer::Closed,
        }
    }
}

/// Turn one raw chunk (with or without its trailing newline) into a tagged,
/// newline-terminated line.
pub(crate) fn format_line(kind: StreamKind, raw: &[u8]) -> String {
    let mut body = raw;
    if let Some(stripped) = body.strip_suffix(b"\n") {
        body = stripped;
    }
    if let Some(stripped) = body.strip_suffix(b"\r") {
        body = stripped;
    }

    let text = String::from_utf8_lossy(body);
    let mut line = String::with_capacity(kind.tag().len() + text.len() + 1);
    line.push_str(kind.tag());
    line.push_str(&text);
    line.push('\n');
    line
}

/// Read `reader` to EOF, offering each line to `sink`.
///
/// Reading continues even if the consumer went away so the pipe never
/// fills up and blocks the child.
pub(crate) async fn drain_stream<R>(reader: R, kind: StreamKind, sink: OutputSink, handle: HandleId)
where
    R: AsyncRead + Unpin,
{
    drain_stream_capped(reader, kind, sink, handle, MAX_LINE_BYTES).await
}

async fn drain_stream_capped<R>(
    reader: R,
    kind: StreamKind,
    sink: OutputSink,
    handle: HandleId,
    max_line: u64,
) where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let (mut delivered, mut dropped) = (0u64, 0u64);

    loop {
        buf.clear();
        match (&mut reader).take(max_line).read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => match sink.offer(format_line(kind, &buf)) {
                Offer::Delivered => delivered += 1,
                Offer::Dropped => {
                    dropped += 1;
                    trace!(%handle, stream = ?kind, "output stream full; line dropped");
                }
                Offer::Closed => {}
            },
            Err(e) => {
                debug!(%handle, stream = ?kind, error = %e, "error reading process output");
                break;
            }
        }
    }

    debug!(%handle, stream = ?kind, delivered, dropped, "output pipe drained");
}

/// Spawn a drain task for one pipe.
pub(crate) fn spawn_drain<R>(
    reader: R,
    kind: StreamKind,
    sink: OutputSink,
    handle: HandleId,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(drain_stream(reader, kind, sink, handle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdout_lines_are_newline_terminated() {
        assert_eq!(format_line(StreamKind::Stdout, b"hello\n"), "hello\n");
        assert_eq!(format_line(StreamKind::Stdout, b"no newline"), "no newline\n");
        assert_eq!(format_line(StreamKind::Stdout, b"crlf\r\n"), "crlf\n");
    }

    #[test]
    fn stderr_lines_are_tagged() {
        assert_eq!(format_line(StreamKind::Stderr, b"boom\n"), "[ERROR] boom\n");
    }

    #[test]
    fn invalid_utf8_is_replaced_not_rejected() {
        let line = format_line(StreamKind::Stdout, b"ok \xff\n");
        assert!(line.starts_with("ok "));
        assert!(line.ends_with('\n'));
    }

    #[tokio::test]
    async fn drain_preserves_order_within_a_stream() {
        let (tx, mut rx) = mpsc::channel(16);
        let sink = OutputSink::new(tx, Arc::new(AtomicU64::new(0)));
        let input: &[u8] = b"a\nb\nc";

        drain_stream(input, StreamKind::Stderr, sink, HandleId::new(1)).await;

        let mut got = Vec::new();
        while let Ok(line) = rx.try_recv() {
            got.push(line);
        }
        assert_eq!(got, vec!["[ERROR] a\n", "[ERROR] b\n", "[ERROR] c\n"]);
    }

    #[tokio::test]
    async fn overlong_lines_are_split_at_the_cap() {
        let (tx, mut rx) = mpsc::channel(16);
        let sink = OutputSink::new(tx, Arc::new(AtomicU64::new(0)));
        let input: &[u8] = b"abcdefghij\nxy\n";

        drain_stream_capped(input, StreamKind::Stdout, sink, HandleId::new(3), 4).await;

        let mut got = Vec::new();
        while let Ok(line) = rx.try_recv() {
            got.push(line);
        }
        assert_eq!(got, vec!["abcd\n", "efgh\n", "ij\n", "xy\n"]);
    }

    #[tokio::test]
    async fn full_stream_drops_lines_instead_of_blocking() {
        let (tx, mut rx) = mpsc::channel(2);
        let dropped = Arc::new(AtomicU64::new(0));
        let sink = OutputSink::new(tx, Arc::clone(&dropped));
        let input: &[u8] = b"1\n2\n3\n4\n5\n";

        drain_stream(input, StreamKind::Stdout, sink, HandleId::new(1)).await;

        assert_eq!(rx.try_recv().ok().as_deref(), Some("1\n"));
        assert_eq!(rx.try_recv().ok().as_deref(), Some("2\n"));
        assert!(rx.try_recv().is_err());
        assert_eq!(dropped.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn closed_consumer_does_not_stop_the_drain() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sink = OutputSink::new(tx, Arc::new(AtomicU64::new(0)));
        assert_eq!(sink.offer("x\n".into()), Offer::Closed);

        let input: &[u8] = b"x\ny\n";
        drain_stream(input, StreamKind::Stdout, sink, HandleId::new(2)).await;
    }
}
