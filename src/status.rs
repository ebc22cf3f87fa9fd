/// Outcome of a status query against a PID file.
use crate::error::ProcessError;
use serde::Serialize;

/// Lifecycle states reported for a tracked process.
///
/// Zombie/defunct processes are reported as `Stopped`: they have exited and
/// only wait for their parent to collect the exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Running,
    Stopped,
    /// No PID file, or one that does not hold a process id.
    NotFound,
    /// The query could be attempted but failed.
    Error,
}

impl Status {
    /// Flatten a query result into the four-valued outcome, dropping the
    /// cause of an error.
    pub fn from_result(result: &Result<Status, ProcessError>) -> Self {
        match result {
            Ok(status) => *status,
            Err(_) => Status::Error,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Running => "running",
            Status::Stopped => "stopped",
            Status::NotFound => "not_found",
            Status::Error => "error",
        }
    }

    /// True once there is nothing left running behind the PID file.
    pub fn is_finished(&self) -> bool {
        matches!(self, Status::Stopped | Status::NotFound)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
