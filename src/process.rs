//! Launch, query and stop detached processes tracked by PID files.
//!
//! The three operations share no in-memory state: the PID file is the only
//! hand-off, so each may run in a different invocation of the caller.
use crate::config::Config;
use crate::controller::{PlatformController, Presence, ProcessController, StopSignal, Termination};
use crate::error::ProcessError;
use crate::options::Options;
use crate::pidfile::{self, PidFile};
use crate::status::Status;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// A successfully launched process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Started {
    /// OS identifier of the child, also the id of its process group on Unix.
    pub pid: u32,
    /// Where the pid was persisted; pass this to `query_status` and `stop`.
    pub pidfile: PathBuf,
}

/// Manage the lifecycle of background processes.
pub trait ProcessManager {
    /// Start a process in the background and persist its pid.
    ///
    /// Returns once the OS has created the process. If the PID file cannot
    /// be written the process keeps running untracked and the error is
    /// returned.
    fn start(&self, options: &Options) -> Result<Started, ProcessError>;

    /// Stop the process group referenced by `pidfile` with the default
    /// signal, then delete the file.
    fn stop(&self, pidfile: &Path) -> Result<(), ProcessError>;

    /// Like [`stop`](Self::stop) with an explicit signal.
    fn stop_with(&self, pidfile: &Path, signal: StopSignal) -> Result<(), ProcessError>;

    /// Report the status of the process referenced by `pidfile`.
    ///
    /// A missing or unparsable PID file is `Ok(Status::NotFound)`. `Err`
    /// means the process table could not be queried.
    fn query_status(&self, pidfile: &Path) -> Result<Status, ProcessError>;
}

/// [`ProcessManager`] for processes on the local machine.
#[derive(Debug, Clone)]
pub struct LocalProcess<C = PlatformController> {
    controller: C,
    pid_dir: PathBuf,
    signal: StopSignal,
}

impl LocalProcess<PlatformController> {
    /// Platform controller, generated PID files in the system temp dir,
    /// SIGKILL on stop.
    pub fn new() -> Self {
        Self::with_controller(PlatformController::new())
    }

    pub fn from_config(config: &Config) -> Self {
        let mut local = Self::new().with_signal(config.stop.signal);
        if let Some(dir) = &config.pidfile.dir {
            local = local.with_pid_dir(dir);
        }
        local
    }
}

impl Default for LocalProcess<PlatformController> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ProcessController> LocalProcess<C> {
    pub fn with_controller(controller: C) -> Self {
        Self {
            controller,
            pid_dir: std::env::temp_dir(),
            signal: StopSignal::default(),
        }
    }

    /// Root for PID files generated when `Options::pidfile` is unset.
    pub fn with_pid_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.pid_dir = dir.into();
        self
    }

    /// Signal used by [`ProcessManager::stop`].
    pub fn with_signal(mut self, signal: StopSignal) -> Self {
        self.signal = signal;
        self
    }

    pub fn pid_dir(&self) -> &Path {
        &self.pid_dir
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    fn build_command(&self, options: &Options, dir: &Path) -> Result<Command, ProcessError> {
        let mut command = Command::new(&options.path);
        command.args(&options.args).current_dir(dir).stdin(Stdio::null());

        if !options.env.is_empty() {
            command
                .env_clear()
                .envs(options.env.iter().map(|(key, value)| (key, value)));
        }

        self.controller.detach(&mut command);

        match &options.logfile {
            Some(path) => {
                let log = File::create(path).map_err(|e| ProcessError::LogFile {
                    path: path.clone(),
                    source: e,
                })?;
                // Second handle for stderr since File doesn't impl Clone
                let log_stderr = log.try_clone().map_err(|e| ProcessError::LogFile {
                    path: path.clone(),
                    source: e,
                })?;
                command
                    .stdout(Stdio::from(log))
                    .stderr(Stdio::from(log_stderr));
            }
            None => {
                command.stdout(Stdio::null()).stderr(Stdio::null());
            }
        }

        Ok(command)
    }
}

impl<C: ProcessController> ProcessManager for LocalProcess<C> {
    fn start(&self, options: &Options) -> Result<Started, ProcessError> {
        let dir = match &options.dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().map_err(|e| ProcessError::CurrentDir { source: e })?,
        };

        let mut command = self.build_command(options, &dir)?;
        tracing::info!(
            program = %options.path.display(),
            args = ?options.args,
            dir = %dir.display(),
            controller = self.controller.name(),
            "starting background process"
        );

        let child = command.spawn().map_err(|e| ProcessError::Spawn {
            program: options.path.clone(),
            source: e,
        })?;
        let pid = child.id();
        // Dropping a std Child neither waits on nor kills the process.
        drop(child);

        let path = options
            .pidfile
            .clone()
            .unwrap_or_else(|| pidfile::default_path(&self.pid_dir, pid));
        PidFile::new(&path).write(pid)?;

        tracing::info!(pid, pidfile = %path.display(), "background process started");
        Ok(Started { pid, pidfile: path })
    }

    fn stop(&self, pidfile: &Path) -> Result<(), ProcessError> {
        self.stop_with(pidfile, self.signal)
    }

    fn stop_with(&self, pidfile: &Path, signal: StopSignal) -> Result<(), ProcessError> {
        let pidfile = PidFile::new(pidfile);
        let pid = pidfile.read()?;

        tracing::info!(
            pid,
            %signal,
            controller = self.controller.name(),
            "stopping process group"
        );
        match self.controller.terminate(pid, signal)? {
            Termination::Signalled => pidfile.remove(),
            // The file is kept so the caller can inspect the stale reference.
            Termination::AlreadyGone => Err(ProcessError::NotRunning { pid }),
        }
    }

    fn query_status(&self, pidfile: &Path) -> Result<Status, ProcessError> {
        let pid = match PidFile::new(pidfile).read() {
            Ok(pid) => pid,
            Err(e) => {
                tracing::debug!(error = %e, "nothing to track");
                return Ok(Status::NotFound);
            }
        };

        let status = match self.controller.lookup(pid)? {
            Presence::Alive => Status::Running,
            Presence::Absent | Presence::Zombie => Status::Stopped,
        };
        tracing::debug!(pid, %status, "queried process status");
        Ok(status)
    }
}
