use clap::{Parser, Subcommand};
use pidkeep::options::parse_env_pair;
use pidkeep::wait::{wait_for_exit, WaitOutcome};
use pidkeep::{Config, LocalProcess, Options, ProcessError, ProcessManager, Status, StopSignal};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Launch programs in the background, track them with PID files, and
/// query or stop them later from any shell.
#[derive(Parser, Debug)]
#[command(name = "pidkeep", version, about)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "pidkeep.toml", global = true)]
    config: PathBuf,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a program detached from this shell
    Start {
        /// PID file to write (default: <pidfile.dir>/<pid>.pid)
        #[arg(short, long)]
        pidfile: Option<PathBuf>,

        /// Send stdout and stderr to this file instead of discarding them
        #[arg(short, long)]
        log: Option<PathBuf>,

        /// Working directory (default: current directory)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Environment variable for the child; repeatable. When given, the
        /// child gets only these variables.
        #[arg(short, long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
        env: Vec<(String, String)>,

        /// Program to run
        program: PathBuf,

        /// Arguments passed to the program
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Print the status of the process referenced by a PID file
    Status {
        pidfile: PathBuf,

        /// Print JSON instead of a bare word
        #[arg(long)]
        json: bool,
    },

    /// Stop the process group referenced by a PID file and delete the file
    Stop {
        pidfile: PathBuf,

        /// Signal to send (default: [stop] signal from config)
        #[arg(short, long)]
        signal: Option<StopSignal>,
    },

    /// Block until the process referenced by a PID file is no longer running
    Wait {
        pidfile: PathBuf,

        /// Give up after this many seconds (default: [wait] timeout_secs)
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Poll interval in milliseconds (default: [wait] poll_interval_ms)
        #[arg(short, long)]
        interval: Option<u64>,
    },
}

fn init_tracing(config: &Config, verbose: bool) {
    let fallback = if verbose {
        "debug"
    } else {
        config.log.filter.as_str()
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config, cli.verbose);
    tracing::debug!(?cli, "parsed CLI arguments");

    match run(cli.command, &config).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: &Config) -> Result<ExitCode, ProcessError> {
    let lp = LocalProcess::from_config(config);

    match command {
        Command::Start {
            pidfile,
            log,
            dir,
            env,
            program,
            args,
        } => {
            let options = Options {
                path: program,
                args: args.into_iter().map(Into::into).collect(),
                env: env
                    .into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
                dir,
                pidfile,
                logfile: log,
            };
            let started = lp.start(&options)?;
            println!(
                "Started PID: {}, PID file: {}",
                started.pid,
                started.pidfile.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::Status { pidfile, json } => {
            let result = lp.query_status(&pidfile);
            let status = Status::from_result(&result);
            if json {
                let mut body = serde_json::json!({
                    "pidfile": pidfile.display().to_string(),
                    "status": status,
                });
                if let Err(e) = &result {
                    body["error"] = serde_json::Value::String(e.to_string());
                }
                println!("{body}");
            } else {
                println!("{status}");
                if let Err(e) = &result {
                    eprintln!("error: {e}");
                }
            }
            Ok(if status == Status::Error {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Command::Stop { pidfile, signal } => {
            match signal {
                Some(signal) => lp.stop_with(&pidfile, signal)?,
                None => lp.stop(&pidfile)?,
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Wait {
            pidfile,
            timeout,
            interval,
        } => {
            let interval =
                Duration::from_millis(interval.unwrap_or(config.wait.poll_interval_ms).max(1));
            let timeout = Duration::from_secs(timeout.unwrap_or(config.wait.timeout_secs));

            tokio::select! {
                outcome = wait_for_exit(&lp, &pidfile, interval, timeout) => match outcome? {
                    WaitOutcome::Finished(status) => {
                        println!("{status}");
                        Ok(ExitCode::SUCCESS)
                    }
                    WaitOutcome::TimedOut => {
                        eprintln!("timed out after {}s; process still running", timeout.as_secs());
                        Ok(ExitCode::from(2))
                    }
                },
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("interrupted; tracked process left running");
                    Ok(ExitCode::from(130))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_start_with_trailing_args() {
        let cli = Cli::parse_from([
            "pidkeep", "start", "--log", "out.log", "-e", "A=1", "tail", "--", "-f", "/dev/null",
        ]);
        match cli.command {
            Command::Start {
                program,
                args,
                env,
                log,
                ..
            } => {
                assert_eq!(program, PathBuf::from("tail"));
                assert_eq!(args, vec!["-f", "/dev/null"]);
                assert_eq!(env, vec![("A".to_string(), "1".to_string())]);
                assert_eq!(log, Some(PathBuf::from("out.log")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_stop_signal() {
        let cli = Cli::parse_from(["pidkeep", "stop", "app.pid", "--signal", "SIGTERM"]);
        match cli.command {
            Command::Stop { pidfile, signal } => {
                assert_eq!(pidfile, PathBuf::from("app.pid"));
                assert_eq!(signal, Some(StopSignal::Term));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_bad_env() {
        let result = Cli::try_parse_from(["pidkeep", "start", "-e", "NOEQUALS", "true"]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_status_of_missing_pidfile_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let result = run(
            Command::Status {
                pidfile: dir.path().join("none.pid"),
                json: true,
            },
            &Config::default(),
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_stop_of_missing_pidfile_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(
            Command::Stop {
                pidfile: dir.path().join("none.pid"),
                signal: None,
            },
            &Config::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ProcessError::PidFileRead { .. }));
    }
}
