use std::path::PathBuf;

/// Errors produced while launching, querying, or stopping a tracked process.
#[derive(Debug)]
pub enum ProcessError {
    /// The caller's current working directory could not be resolved.
    CurrentDir { source: std::io::Error },
    /// Failed to create the log file the child's output is bound to.
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The OS refused to create the process.
    Spawn {
        program: PathBuf,
        source: std::io::Error,
    },
    /// Failed to write the PID file after the process started.
    PidFileWrite {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to read the PID file.
    PidFileRead {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The PID file does not contain a decimal process identifier.
    PidFileParse { path: PathBuf, content: String },
    /// Failed to delete the PID file after signalling.
    PidFileRemove {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The identifier can never name a process we are allowed to signal.
    InvalidPid { pid: u64 },
    /// Nothing is running under the recorded identifier, so there is
    /// nothing to stop.
    NotRunning { pid: u64 },
    /// The process table or process-state facility could not be queried.
    Query { pid: u64, source: std::io::Error },
    /// Signal delivery failed for a reason other than "no such process".
    Signal { pid: u64, source: std::io::Error },
    /// The configuration file is unreadable or malformed.
    Config { path: PathBuf, message: String },
}

impl std::fmt::Display for ProcessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessError::CurrentDir { source } => {
                write!(f, "unable to resolve current directory: {}", source)
            }
            ProcessError::LogFile { path, source } => {
                write!(f, "unable to open log file {}: {}", path.display(), source)
            }
            ProcessError::Spawn { program, source } => {
                write!(f, "failed to start {}: {}", program.display(), source)
            }
            ProcessError::PidFileWrite { path, source } => {
                write!(f, "unable to write pid file {}: {}", path.display(), source)
            }
            ProcessError::PidFileRead { path, source } => {
                write!(f, "error reading pid file {}: {}", path.display(), source)
            }
            ProcessError::PidFileParse { path, content } => {
                write!(
                    f,
                    "pid file {} does not contain a process id: {:?}",
                    path.display(),
                    content
                )
            }
            ProcessError::PidFileRemove { path, source } => {
                write!(f, "unable to remove pid file {}: {}", path.display(), source)
            }
            ProcessError::InvalidPid { pid } => {
                write!(f, "refusing to signal pid {}", pid)
            }
            ProcessError::NotRunning { pid } => {
                write!(f, "no process group {} to stop", pid)
            }
            ProcessError::Query { pid, source } => {
                write!(f, "unable to query status of pid {}: {}", pid, source)
            }
            ProcessError::Signal { pid, source } => {
                write!(f, "unable to signal process group {}: {}", pid, source)
            }
            ProcessError::Config { path, message } => {
                write!(f, "invalid config {}: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for ProcessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProcessError::CurrentDir { source }
            | ProcessError::LogFile { source, .. }
            | ProcessError::Spawn { source, .. }
            | ProcessError::PidFileWrite { source, .. }
            | ProcessError::PidFileRead { source, .. }
            | ProcessError::PidFileRemove { source, .. }
            | ProcessError::Query { source, .. }
            | ProcessError::Signal { source, .. } => Some(source),
            ProcessError::PidFileParse { .. }
            | ProcessError::InvalidPid { .. }
            | ProcessError::NotRunning { .. }
            | ProcessError::Config { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_includes_path() {
        let err = ProcessError::LogFile {
            path: PathBuf::from("/nope/out.log"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/nope/out.log"));
        assert!(msg.contains("missing"));
    }

    #[test]
    fn test_source_is_exposed_for_io_variants() {
        let err = ProcessError::PidFileRemove {
            path: PathBuf::from("x.pid"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());
    }

    #[test]
    fn test_not_running_names_pid() {
        let err = ProcessError::NotRunning { pid: 9_999_999_999 };
        assert!(err.source().is_none());
        assert!(err.to_string().contains("9999999999"));
    }

    #[test]
    fn test_parse_error_has_no_source() {
        let err = ProcessError::PidFileParse {
            path: PathBuf::from("x.pid"),
            content: "abc".to_string(),
        };
        assert!(err.source().is_none());
        assert!(err.to_string().contains("\"abc\""));
    }
}
