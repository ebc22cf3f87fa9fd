//! Launch programs detached from the caller, track them with PID files, and
//! later query or stop them from any invocation of the managing program.
//!
//! ```no_run
//! use pidkeep::{LocalProcess, Options, ProcessManager, Status};
//!
//! let lp = LocalProcess::new();
//! let started = lp.start(&Options::new("sleep").arg("60"))?;
//! assert_eq!(lp.query_status(&started.pidfile)?, Status::Running);
//! lp.stop(&started.pidfile)?;
//! # Ok::<(), pidkeep::ProcessError>(())
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod options;
pub mod pidfile;
pub mod process;
pub mod status;
pub mod wait;

pub use config::Config;
pub use controller::{PlatformController, ProcessController, StopSignal};
pub use error::ProcessError;
pub use options::Options;
pub use process::{LocalProcess, ProcessManager, Started};
pub use status::Status;
