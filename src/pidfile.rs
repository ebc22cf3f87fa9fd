//! PID file store.
//!
//! A PID file's entire content is the decimal process identifier, with no
//! trailing newline and no other metadata. Other tooling may read these
//! files, so the format must not grow.

use crate::error::ProcessError;
use std::path::{Path, PathBuf};

/// Default PID file location for `pid` under `root`: `<root>/<pid>.pid`.
pub fn default_path(root: &Path, pid: u32) -> PathBuf {
    root.join(format!("{pid}.pid"))
}

/// Handle to a PID file on disk. Holding one says nothing about whether the
/// file exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create or truncate the file and write `pid` to it.
    pub fn write(&self, pid: u32) -> Result<(), ProcessError> {
        std::fs::write(&self.path, pid.to_string()).map_err(|e| ProcessError::PidFileWrite {
            path: self.path.clone(),
            source: e,
        })?;
        tracing::debug!(pid, pidfile = %self.path.display(), "wrote pid file");
        Ok(())
    }

    /// Read and parse the stored identifier. Any value that fits in 64 bits
    /// is accepted, even one the platform could never hand out.
    pub fn read(&self) -> Result<u64, ProcessError> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| ProcessError::PidFileRead {
                path: self.path.clone(),
                source: e,
            })?;
        parse_pid(&content).ok_or_else(|| ProcessError::PidFileParse {
            path: self.path.clone(),
            content,
        })
    }

    /// Delete the file. A missing file is an error: the caller expected a
    /// tracked reference to be there.
    pub fn remove(&self) -> Result<(), ProcessError> {
        std::fs::remove_file(&self.path).map_err(|e| ProcessError::PidFileRemove {
            path: self.path.clone(),
            source: e,
        })?;
        tracing::debug!(pidfile = %self.path.display(), "removed pid file");
        Ok(())
    }
}

/// Parse PID file content. Surrounding whitespace is tolerated so files
/// written by `echo $! > app.pid` are accepted too.
fn parse_pid(content: &str) -> Option<u64> {
    let trimmed = content.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path_is_keyed_by_pid() {
        let path = default_path(Path::new("/tmp/pids"), 4242);
        assert_eq!(path, PathBuf::from("/tmp/pids/4242.pid"));
    }

    #[test]
    fn test_default_paths_never_collide() {
        let root = Path::new("/tmp");
        assert_ne!(default_path(root, 100), default_path(root, 1000));
    }

    #[test]
    fn test_write_stores_bare_decimal() {
        let dir = tempfile::tempdir().unwrap();
        let pidfile = PidFile::new(dir.path().join("app.pid"));
        pidfile.write(31337).unwrap();

        let content = std::fs::read_to_string(pidfile.path()).unwrap();
        assert_eq!(content, "31337");
    }

    #[test]
    fn test_write_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.pid");
        std::fs::write(&path, "123456789").unwrap();

        let pidfile = PidFile::new(&path);
        pidfile.write(42).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "42");
        assert_eq!(pidfile.read().unwrap(), 42);
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let pidfile = PidFile::new("/nonexistent-dir/impossible/app.pid");
        let err = pidfile.write(42).unwrap_err();
        assert!(matches!(err, ProcessError::PidFileWrite { .. }));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let pidfile = PidFile::new(dir.path().join("missing.pid"));
        let err = pidfile.read().unwrap_err();
        assert!(matches!(err, ProcessError::PidFileRead { .. }));
    }

    #[test]
    fn test_read_garbage_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.pid");
        std::fs::write(&path, "not-a-pid").unwrap();

        let err = PidFile::new(&path).read().unwrap_err();
        match err {
            ProcessError::PidFileParse { content, .. } => assert_eq!(content, "not-a-pid"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_pid_accepts_trailing_newline() {
        assert_eq!(parse_pid("1234\n"), Some(1234));
        assert_eq!(parse_pid("  77 "), Some(77));
    }

    #[test]
    fn test_parse_pid_accepts_values_beyond_u32() {
        assert_eq!(parse_pid("9999999999"), Some(9_999_999_999));
        assert_eq!(parse_pid("18446744073709551615"), Some(u64::MAX));
    }

    #[test]
    fn test_parse_pid_rejects_signs_and_empty() {
        assert_eq!(parse_pid(""), None);
        assert_eq!(parse_pid("-5"), None);
        assert_eq!(parse_pid("+5"), None);
        assert_eq!(parse_pid("12 34"), None);
        assert_eq!(parse_pid("99999999999999999999"), None);
    }

    #[test]
    fn test_remove_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let pidfile = PidFile::new(dir.path().join("app.pid"));
        pidfile.write(7).unwrap();
        pidfile.remove().unwrap();
        assert!(!pidfile.path().exists());
    }

    #[test]
    fn test_remove_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let pidfile = PidFile::new(dir.path().join("gone.pid"));
        let err = pidfile.remove().unwrap_err();
        assert!(matches!(err, ProcessError::PidFileRemove { .. }));
    }
}
