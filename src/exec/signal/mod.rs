// src/exec/signal/mod.rs

//! Per-platform termination primitives.
//!
//! The executor only talks to [`TreeSignaller`]. Unix targets signal the
//! whole process group; other targets fall back to walking the process
//! table and terminating each descendant individually.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io;
use std::sync::Arc;

use sysinfo::{ProcessesToUpdate, System};

pub mod fallback;
#[cfg(unix)]
pub mod unix;

pub use fallback::SysinfoSignaller;
#[cfg(unix)]
pub use unix::UnixSignaller;

/// Termination strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermSignal {
    /// SIGTERM or the closest platform equivalent.
    Graceful,
    /// SIGKILL or the closest platform equivalent.
    Forceful,
}

/// Capability interface for tree termination.
pub trait TreeSignaller: Send + Sync + fmt::Debug {
    /// Whether [`TreeSignaller::signal_group`] can be used on this platform.
    fn supports_groups(&self) -> bool;

    /// Signal every process in the group led by `pgid`.
    fn signal_group(&self, pgid: u32, signal: TermSignal) -> io::Result<()>;

    /// Signal a single process.
    fn signal_process(&self, pid: u32, signal: TermSignal) -> io::Result<()>;

    /// Live descendants of `pid`, deepest first. `pid` itself is excluded.
    fn descendants(&self, pid: u32) -> Vec<u32>;
}

/// The signaller for the current build target.
pub fn platform_signaller() -> Arc<dyn TreeSignaller> {
    #[cfg(unix)]
    {
        Arc::new(UnixSignaller)
    }
    #[cfg(not(unix))]
    {
        Arc::new(SysinfoSignaller)
    }
}

/// Snapshot the process table and collect the descendants of `root`.
pub(crate) fn scan_descendants(root: u32) -> Vec<u32> {
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::All, true);

    let edges = system
        .processes()
        .iter()
        .filter_map(|(pid, process)| {
            process
                .parent()
                .map(|parent| (pid.as_u32(), parent.as_u32()))
        });

    collect_descendants(root, edges)
}

/// Breadth-first walk over `(child, parent)` edges; the result is reversed
/// so leaves come before their parents.
pub(crate) fn collect_descendants(
    root: u32,
    edges: impl IntoIterator<Item = (u32, u32)>,
) -> Vec<u32> {
    let mut children: HashMap<u32, Vec<u32>> = HashMap::new();
    for (child, parent) in edges {
        if child != parent {
            children.entry(parent).or_default().push(child);
        }
    }
    for kids in children.values_mut() {
        kids.sort_unstable();
    }

    let mut seen = HashSet::from([root]);
    let mut order = Vec::new();
    let mut frontier = vec![root];

    while !frontier.is_empty() {
        let mut next = Vec::new();
        for pid in frontier {
            for &child in children.get(&pid).into_iter().flatten() {
                if seen.insert(child) {
                    order.push(child);
                    next.push(child);
                }
            }
        }
        frontier = next;
    }

    order.reverse();
    order
}
