//! Platform process control.
//!
//! Everything that differs between operating systems sits behind
//! [`ProcessController`]: how a child is detached into its own group, how a
//! process is looked up (and told apart from a zombie), and how it is
//! terminated. [`PlatformController`] names the implementation compiled for
//! the current target.

#[cfg(any(target_os = "macos", test))]
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
mod darwin;
#[cfg(any(target_os = "linux", test))]
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
mod linux;
#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use unix::UnixController;
#[cfg(windows)]
pub use windows::WindowsController;

#[cfg(unix)]
pub type PlatformController = UnixController;
#[cfg(windows)]
pub type PlatformController = WindowsController;

use crate::error::ProcessError;
use serde::Deserialize;
use std::process::Command;

/// What the process table says about a PID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Absent,
    Alive,
    /// Exited but not yet reaped by its parent.
    Zombie,
}

/// Result of a termination request that reached the process table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Signalled,
    /// Nothing was left to signal. Callers that promised to stop something
    /// decide whether this is a failure.
    AlreadyGone,
}

/// Signal sent to a process group by `stop`. Ignored on Windows, where the
/// process is always force-killed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum StopSignal {
    #[default]
    Kill,
    Term,
    Int,
    Hup,
    Quit,
}

impl StopSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopSignal::Kill => "SIGKILL",
            StopSignal::Term => "SIGTERM",
            StopSignal::Int => "SIGINT",
            StopSignal::Hup => "SIGHUP",
            StopSignal::Quit => "SIGQUIT",
        }
    }
}

impl std::fmt::Display for StopSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StopSignal {
    type Err = String;

    /// Accepts `SIGTERM`, `TERM` or `term`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let name = upper.strip_prefix("SIG").unwrap_or(&upper);
        match name {
            "KILL" => Ok(StopSignal::Kill),
            "TERM" => Ok(StopSignal::Term),
            "INT" => Ok(StopSignal::Int),
            "HUP" => Ok(StopSignal::Hup),
            "QUIT" => Ok(StopSignal::Quit),
            _ => Err(format!("unsupported stop signal: {s}")),
        }
    }
}

impl TryFrom<String> for StopSignal {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// OS-specific process operations used by the launcher, status checker and
/// terminator.
pub trait ProcessController: Send + Sync {
    /// Short platform name, attached to start and stop log events.
    fn name(&self) -> &str;

    /// Configure `command` so the spawned child outlives the caller's
    /// process tree and can later be signalled as a unit.
    fn detach(&self, command: &mut Command);

    /// Look `pid` up in the process table.
    ///
    /// A missing process is `Ok(Presence::Absent)`; `Err` is reserved for
    /// a failed lookup. Identifiers the platform can never assign are
    /// `Absent`.
    fn lookup(&self, pid: u64) -> Result<Presence, ProcessError>;

    /// Terminate the process group led by `pid`, or the single process on
    /// platforms without process groups. Identifiers the platform can never
    /// assign are `AlreadyGone`.
    fn terminate(&self, pid: u64, signal: StopSignal) -> Result<Termination, ProcessError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_signal_parses_common_spellings() {
        assert_eq!("SIGTERM".parse::<StopSignal>().unwrap(), StopSignal::Term);
        assert_eq!("term".parse::<StopSignal>().unwrap(), StopSignal::Term);
        assert_eq!("Kill".parse::<StopSignal>().unwrap(), StopSignal::Kill);
        assert_eq!("sighup".parse::<StopSignal>().unwrap(), StopSignal::Hup);
    }

    #[test]
    fn test_stop_signal_rejects_unknown() {
        let err = "SIGWINCH".parse::<StopSignal>().unwrap_err();
        assert!(err.contains("SIGWINCH"));
    }

    #[test]
    fn test_default_stop_signal_is_kill() {
        assert_eq!(StopSignal::default(), StopSignal::Kill);
    }
}
