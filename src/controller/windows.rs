use super::{Presence, ProcessController, StopSignal, Termination};
use crate::error::ProcessError;
use std::process::Command;
use sysinfo::{Pid, ProcessStatus, ProcessesToUpdate, System};

/// Windows process control. Children are not grouped, so termination
/// force-kills the single tracked process.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsController;

impl WindowsController {
    pub fn new() -> Self {
        WindowsController
    }
}

fn refreshed(pid: Pid) -> System {
    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    sys
}

impl ProcessController for WindowsController {
    fn name(&self) -> &str {
        "windows"
    }

    fn detach(&self, _command: &mut Command) {}

    fn lookup(&self, pid: u64) -> Result<Presence, ProcessError> {
        let Ok(pid) = u32::try_from(pid) else {
            return Ok(Presence::Absent);
        };
        let pid = Pid::from_u32(pid);
        let sys = refreshed(pid);
        Ok(match sys.process(pid) {
            None => Presence::Absent,
            Some(process) if process.status() == ProcessStatus::Zombie => Presence::Zombie,
            Some(_) => Presence::Alive,
        })
    }

    fn terminate(&self, pid: u64, signal: StopSignal) -> Result<Termination, ProcessError> {
        if pid == 0 {
            return Err(ProcessError::InvalidPid { pid });
        }
        let Ok(raw) = u32::try_from(pid) else {
            tracing::warn!(pid, "pid outside the platform range, nothing to kill");
            return Ok(Termination::AlreadyGone);
        };
        let sys = refreshed(Pid::from_u32(raw));
        let Some(process) = sys.process(Pid::from_u32(raw)) else {
            tracing::warn!(pid, "process already gone");
            return Ok(Termination::AlreadyGone);
        };
        if !process.kill() {
            return Err(ProcessError::Signal {
                pid,
                source: std::io::Error::other("TerminateProcess failed"),
            });
        }
        tracing::info!(pid, requested = %signal, "killed process");
        Ok(Termination::Signalled)
    }
}
