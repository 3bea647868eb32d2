// src/exec/signal/unix.rs

//! Process-group signalling via `nix`.

use std::io;

use nix::sys::signal::{Signal, kill, killpg};
use nix::unistd::Pid;

use super::{TermSignal, TreeSignaller, scan_descendants};

/// Signals the process group created for each spawned command.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnixSignaller;

fn to_nix(signal: TermSignal) -> Signal {
    match signal {
        TermSignal::Graceful => Signal::SIGTERM,
        TermSignal::Forceful => Signal::SIGKILL,
    }
}

fn nix_pid(pid: u32) -> io::Result<Pid> {
    // pid 0 would address our own process group.
    match i32::try_from(pid) {
        Ok(raw) if raw > 0 => Ok(Pid::from_raw(raw)),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("refusing to signal pid {pid}"),
        )),
    }
}

impl TreeSignaller for UnixSignaller {
    fn supports_groups(&self) -> bool {
        true
    }

    fn signal_group(&self, pgid: u32, signal: TermSignal) -> io::Result<()> {
        killpg(nix_pid(pgid)?, to_nix(signal)).map_err(io::Error::from)
    }

    fn signal_process(&self, pid: u32, signal: TermSignal) -> io::Result<()> {
        kill(nix_pid(pid)?, to_nix(signal)).map_err(io::Error::from)
    }

    fn descendants(&self, pid: u32) -> Vec<u32> {
        scan_descendants(pid)
    }
}
