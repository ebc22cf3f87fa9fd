/// Poll a PID file until the process behind it is no longer running.
use crate::error::ProcessError;
use crate::process::ProcessManager;
use crate::status::Status;
use std::path::Path;
use std::time::Duration;

/// How a wait ended.
#[derive(Debug)]
pub enum WaitOutcome {
    /// The process exited (`Stopped`) or its PID file went away (`NotFound`).
    Finished(Status),
    /// Still running when the timeout elapsed.
    TimedOut,
}

/// Query `pidfile` every `interval` until the status is finished or
/// `timeout` elapses. A failed query ends the wait with that error.
pub async fn wait_for_exit<M: ProcessManager>(
    manager: &M,
    pidfile: &Path,
    interval: Duration,
    timeout: Duration,
) -> Result<WaitOutcome, ProcessError> {
    let poll = async {
        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
        loop {
            ticker.tick().await;
            let status = manager.query_status(pidfile)?;
            tracing::debug!(%status, pidfile = %pidfile.display(), "polled status");
            if status.is_finished() {
                return Ok::<_, ProcessError>(WaitOutcome::Finished(status));
            }
        }
    };

    match tokio::time::timeout(timeout, poll).await {
        Ok(result) => result,
        Err(_) => Ok(WaitOutcome::TimedOut),
    }
}
