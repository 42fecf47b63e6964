//! # remote-relay
//!
//! Lightweight remote command execution and file transfer over SSH.
//!
//! This crate runs commands on a remote host and reliably captures their
//! output and exit status, coping with asynchronous, buffered, bidirectional
//! byte streams multiplexed over a single logical channel. It also moves
//! files and directories to and from the remote host over SFTP.
//!
//! ## Features
//!
//! - **Reliable output capture**: drains stdout and stderr concurrently and
//!   detects true completion, never trusting the exit status alone
//! - **Session management**: key or password authentication, with
//!   `~/.ssh/config` host resolution
//! - **File transfer**: recursive upload/download with optional timestamp
//!   preservation
//! - **Lightweight**: minimal dependencies, small binary size
//!
//! ## Quick Start
//!
//! ```no_run
//! use remote_relay::{CommandRunner, RemoteConfig, RemoteExecutor, RemoteSession};
//!
//! fn main() -> remote_relay::Result<()> {
//!     // Initialize logging
//!     remote_relay::logging::try_init().ok();
//!
//!     // Connect with key authentication
//!     let config = RemoteConfig::new("lab04", "tai");
//!     let mut session = RemoteSession::connect(&config)?;
//!
//!     // Run commands in order, collecting output and exit codes
//!     let runner = CommandRunner::new(RemoteExecutor::new());
//!     for result in runner.run_all(&mut session, ["uname -a", "uptime"])? {
//!         println!("{}", result.stdout);
//!     }
//!
//!     session.disconnect()
//! }
//! ```

pub mod channel;
pub mod cli;
pub mod config;
pub mod error;
pub mod execution;
pub mod logging;
pub mod session;

// Re-export commonly used types
pub use channel::{Channel, SshChannel};
pub use config::Config;
pub use error::{RemoteRelayError, Result};
pub use execution::{
    CommandRunner, Dispatch, ExecutionResult, OutputChunk, OutputObserver, OutputSource,
    RemoteExecutor, DEFAULT_WAIT_TIMEOUT,
};
pub use session::{RemoteConfig, RemoteSession, TransferOptions};
