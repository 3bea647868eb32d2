// src/exec/mod.rs

//! Process execution layer.
//!
//! Commands run through the platform shell using `tokio::process::Command`,
//! each in its own process group. Every spawn gets three background tasks:
//! two drains (stdout, stderr) feeding one bounded line stream, and one
//! completion waiter that finalizes the handle.
//!
//! - [`handle`] holds the per-process record and its stream/signal.
//! - [`registry`] is the lock-guarded map of live handles.
//! - [`output`] merges the two pipes into tagged lines.
//! - [`signal`] isolates the per-platform termination primitives.
//! - [`executor`] orchestrates spawn, finalization and tree-kill.
//! - [`backend`] provides the `CommandRunner` trait used by callers.

pub mod backend;
pub mod executor;
pub mod handle;
pub mod output;
pub mod registry;
pub mod signal;

pub use backend::CommandRunner;
pub use executor::{DEFAULT_DRAIN_GRACE, DEFAULT_OUTPUT_CAPACITY, ExecutorOptions, ProcessExecutor};
pub use handle::{ExitOutcome, HandleId, ProcessHandle};
pub use output::{ERROR_TAG, StreamKind};
pub use registry::ProcessRegistry;
pub use signal::{TermSignal, TreeSignaller, platform_signaller};
