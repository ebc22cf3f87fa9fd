use crate::controller::StopSignal;
use crate::error::ProcessError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level configuration loaded from pidkeep.toml.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub pidfile: PidFileConfig,
    pub stop: StopConfig,
    pub wait: WaitConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct PidFileConfig {
    /// Root for generated PID files. `None` means the system temp dir.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct StopConfig {
    pub signal: StopSignal,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    pub poll_interval_ms: u64,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive used when RUST_LOG is unset.
    pub filter: String,
}

// --- Default implementations ---

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            timeout_secs: 30,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml(path: &Path, contents: &str) -> Result<Self, ProcessError> {
        toml::from_str(contents).map_err(|e| ProcessError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load configuration from `path`. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, ProcessError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(path, &contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(ProcessError::Config {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.pidfile.dir.is_none());
        assert_eq!(config.stop.signal, StopSignal::Kill);
        assert_eq!(config.wait.poll_interval_ms, 1000);
        assert_eq!(config.wait.timeout_secs, 30);
        assert_eq!(config.log.filter, "warn");
    }

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config = Config::from_toml(Path::new("pidkeep.toml"), "").unwrap();
        assert_eq!(config.stop.signal, StopSignal::Kill);
        assert_eq!(config.wait.timeout_secs, 30);
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
[pidfile]
dir = "/var/run/myapp"

[stop]
signal = "SIGTERM"

[wait]
poll_interval_ms = 250
timeout_secs = 5

[log]
filter = "pidkeep=debug"
"#;
        let config = Config::from_toml(Path::new("pidkeep.toml"), toml).unwrap();
        assert_eq!(config.pidfile.dir, Some(PathBuf::from("/var/run/myapp")));
        assert_eq!(config.stop.signal, StopSignal::Term);
        assert_eq!(config.wait.poll_interval_ms, 250);
        assert_eq!(config.wait.timeout_secs, 5);
        assert_eq!(config.log.filter, "pidkeep=debug");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let toml = "[wait]\ntimeout_secs = 90\n";
        let config = Config::from_toml(Path::new("pidkeep.toml"), toml).unwrap();
        assert_eq!(config.wait.timeout_secs, 90);
        assert_eq!(config.wait.poll_interval_ms, 1000);
    }

    #[test]
    fn test_unknown_signal_is_config_error() {
        let err = Config::from_toml(Path::new("bad.toml"), "[stop]\nsignal = \"SIGFOO\"\n")
            .unwrap_err();
        assert!(matches!(err, ProcessError::Config { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("pidkeep.toml")).unwrap();
        assert_eq!(config.log.filter, "warn");
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pidkeep.toml");
        std::fs::write(&path, "[stop]\nsignal = \"INT\"\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.stop.signal, StopSignal::Int);
    }
}
