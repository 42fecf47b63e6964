//! Remote command execution.
//!
//! The heart of this module is [`RemoteExecutor`]: given a live channel with
//! a command already dispatched, it drains stdout and stderr concurrently
//! until the remote process has truly finished, then returns the captured
//! output and exit status. [`CommandRunner`] sequences multiple commands over
//! fresh channels.
//!
//! # Example
//!
//! ```no_run
//! use remote_relay::{CommandRunner, RemoteConfig, RemoteExecutor, RemoteSession};
//!
//! fn main() -> remote_relay::Result<()> {
//!     let config = RemoteConfig::new("build01", "deploy");
//!     let mut session = RemoteSession::connect(&config)?;
//!
//!     let runner = CommandRunner::new(RemoteExecutor::new());
//!     let results = runner.run_all(&mut session, ["uname -a", "uptime"])?;
//!     for result in results {
//!         println!("{}", result.stdout);
//!     }
//!     Ok(())
//! }
//! ```

mod executor;
mod result;
mod runner;

pub use executor::{OutputObserver, RemoteExecutor, DEFAULT_WAIT_TIMEOUT};
pub use result::{ExecutionResult, OutputChunk, OutputSource};
pub use runner::{CommandRunner, Dispatch};
