// src/exec/signal/fallback.rs

//! Descendant-walk termination for targets without process groups.
//!
//! Built on every platform so the walk can be exercised on Unix as well.

use std::io;

use sysinfo::{Pid, ProcessesToUpdate, Signal, System};

use super::{TermSignal, TreeSignaller, scan_descendants};

#[derive(Debug, Default, Clone, Copy)]
pub struct SysinfoSignaller;

impl TreeSignaller for SysinfoSignaller {
    fn supports_groups(&self) -> bool {
        false
    }

    fn signal_group(&self, pgid: u32, _signal: TermSignal) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("process groups unavailable; cannot signal group {pgid}"),
        ))
    }

    fn signal_process(&self, pid: u32, signal: TermSignal) -> io::Result<()> {
        let target = Pid::from_u32(pid);
        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::Some(&[target]), true);

        let process = system.process(target).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("process {pid} not found"))
        })?;

        // Platforms without SIGTERM report `None` for kill_with.
        let delivered = match signal {
            TermSignal::Graceful => process
                .kill_with(Signal::Term)
                .unwrap_or_else(|| process.kill()),
            TermSignal::Forceful => process.kill(),
        };

        if delivered {
            Ok(())
        } else {
            Err(io::Error::other(format!("signal not delivered to process {pid}")))
        }
    }

    fn descendants(&self, pid: u32) -> Vec<u32> {
        scan_descendants(pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_signalling_is_unsupported() {
        let signaller = SysinfoSignaller;
        assert!(!signaller.supports_groups());
        let err = signaller.signal_group(1234, TermSignal::Graceful).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }

    #[test]
    fn unknown_pid_is_not_found() {
        let err = SysinfoSignaller
            .signal_process(u32::MAX - 1, TermSignal::Forceful)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
