use super::{Presence, ProcessController, StopSignal, Termination};
use crate::error::ProcessError;
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::os::unix::process::CommandExt;
use std::process::Command;

/// POSIX process control: children lead their own process group, and
/// termination signals the whole group.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixController;

impl UnixController {
    pub fn new() -> Self {
        UnixController
    }
}

impl From<StopSignal> for Signal {
    fn from(signal: StopSignal) -> Self {
        match signal {
            StopSignal::Kill => Signal::SIGKILL,
            StopSignal::Term => Signal::SIGTERM,
            StopSignal::Int => Signal::SIGINT,
            StopSignal::Hup => Signal::SIGHUP,
            StopSignal::Quit => Signal::SIGQUIT,
        }
    }
}

impl ProcessController for UnixController {
    fn name(&self) -> &str {
        "unix"
    }

    fn detach(&self, command: &mut Command) {
        // pgid == pid, so the pid in the PID file also names the group.
        command.process_group(0);
    }

    fn lookup(&self, pid: u64) -> Result<Presence, ProcessError> {
        // No process can have a pid outside the kernel's positive i32 range.
        let Ok(raw) = i32::try_from(pid) else {
            return Ok(Presence::Absent);
        };
        if raw <= 0 {
            return Ok(Presence::Absent);
        }

        // Null signal: existence check without delivering anything.
        match signal::kill(Pid::from_raw(raw), None) {
            Ok(()) => {}
            Err(Errno::ESRCH) => return Ok(Presence::Absent),
            // Exists but belongs to someone else.
            Err(Errno::EPERM) => {}
            Err(e) => {
                return Err(ProcessError::Query {
                    pid,
                    source: e.into(),
                })
            }
        }

        classify(raw.unsigned_abs()).map_err(|e| ProcessError::Query { pid, source: e })
    }

    fn terminate(&self, pid: u64, signal: StopSignal) -> Result<Termination, ProcessError> {
        // killpg(0) hits our own group and killpg(1) is undefined, usually
        // meaning "every process we may signal".
        if pid <= 1 {
            return Err(ProcessError::InvalidPid { pid });
        }
        let Ok(raw) = i32::try_from(pid) else {
            tracing::warn!(pid, "pid outside the kernel range, nothing to signal");
            return Ok(Termination::AlreadyGone);
        };

        match signal::killpg(Pid::from_raw(raw), Signal::from(signal)) {
            Ok(()) => {
                tracing::info!(pid, %signal, "signalled process group");
                Ok(Termination::Signalled)
            }
            Err(Errno::ESRCH) => {
                tracing::warn!(pid, "process group already gone");
                Ok(Termination::AlreadyGone)
            }
            Err(e) => Err(ProcessError::Signal {
                pid,
                source: e.into(),
            }),
        }
    }
}

#[cfg(target_os = "linux")]
fn classify(pid: u32) -> std::io::Result<Presence> {
    use super::linux;

    Ok(match linux::read_state(pid)? {
        None => Presence::Absent,
        Some(state) if linux::is_exited_state(state) => Presence::Zombie,
        Some(_) => Presence::Alive,
    })
}

#[cfg(target_os = "macos")]
fn classify(pid: u32) -> std::io::Result<Presence> {
    use super::darwin;

    Ok(match darwin::ps_listing(pid)? {
        None => Presence::Absent,
        Some(line) if darwin::listing_is_defunct(&line) => Presence::Zombie,
        Some(_) => Presence::Alive,
    })
}

/// No typed state field and no known listing format: trust the null signal.
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn classify(_pid: u32) -> std::io::Result<Presence> {
    Ok(Presence::Alive)
}
