use std::ffi::OsString;
use std::path::PathBuf;

/// Everything needed to launch a detached process.
///
/// Only `path` is required. Unset fields fall back to:
/// - `dir`: the caller's current directory
/// - `pidfile`: `<pid dir>/<pid>.pid`
/// - `logfile`: output discarded
/// - `env`: the parent's environment is inherited. A non-empty list replaces
///   it entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub path: PathBuf,
    pub args: Vec<OsString>,
    pub env: Vec<(OsString, OsString)>,
    pub dir: Option<PathBuf>,
    pub pidfile: Option<PathBuf>,
    pub logfile: Option<PathBuf>,
}

impl Options {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn pidfile(mut self, pidfile: impl Into<PathBuf>) -> Self {
        self.pidfile = Some(pidfile.into());
        self
    }

    pub fn logfile(mut self, logfile: impl Into<PathBuf>) -> Self {
        self.logfile = Some(logfile.into());
        self
    }
}

/// Split a `KEY=VALUE` pair. The value may itself contain `=`.
pub fn parse_env_pair(pair: &str) -> Result<(String, String), String> {
    match pair.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got {pair:?}")),
    }
}
