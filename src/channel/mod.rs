//! Channel abstraction for one remote command invocation.
//!
//! A [`Channel`] multiplexes the stdout and stderr sub-streams and the exit
//! status of a single remote process over one logical transport channel. It is
//! exclusively owned by the execution call that consumes it and must not be
//! reused afterwards.

mod ssh;

pub use ssh::SshChannel;

use std::time::Duration;

use crate::Result;

/// Bidirectional byte-stream handle bound to one remote process invocation.
///
/// Implementations must satisfy:
/// - the buffered-byte queries and drains never block;
/// - [`Channel::wait_readable`] blocks for at most the given timeout;
/// - [`Channel::exit_status`] is idempotent once the status is available;
/// - [`Channel::close`] is safe to call more than once.
pub trait Channel {
    /// Whether stdout currently has buffered bytes ready to read.
    fn stdout_ready(&mut self) -> Result<bool>;

    /// Whether stderr currently has buffered bytes ready to read.
    fn stderr_ready(&mut self) -> Result<bool>;

    /// Read and return all currently buffered stdout bytes without blocking.
    ///
    /// Returns an empty vector when nothing is buffered.
    fn drain_stdout(&mut self) -> Result<Vec<u8>>;

    /// Read and return all currently buffered stderr bytes without blocking.
    fn drain_stderr(&mut self) -> Result<Vec<u8>>;

    /// Block until the channel has readable data on either stream, the remote
    /// side closes, or the timeout elapses.
    ///
    /// Returns `true` if data or a close event is pending, `false` on timeout.
    fn wait_readable(&mut self, timeout: Duration) -> Result<bool>;

    /// Whether the remote side has finished sending (channel closed).
    ///
    /// Buffered bytes may still be pending locally when this returns `true`;
    /// callers must drain both streams before treating the channel as done.
    fn is_closed(&self) -> bool;

    /// Whether the remote process exit status has been received.
    fn exit_status_ready(&self) -> bool;

    /// Retrieve the remote process exit status.
    ///
    /// Fails with [`crate::RemoteRelayError::ExitStatusUnavailable`] if called
    /// before the status was delivered.
    fn exit_status(&mut self) -> Result<i32>;

    /// Half-close the write direction (no further stdin will be sent).
    fn shutdown_write(&mut self) -> Result<()>;

    /// Half-close the read direction (no further reads will be issued).
    fn shutdown_read(&mut self) -> Result<()>;

    /// Close the channel. Idempotent.
    fn close(&mut self) -> Result<()>;
}
