//! SSH-backed channel implementation.
//!
//! Wraps an [`ssh2::Channel`] carrying one `exec` invocation. Stream 0 is
//! stdout; extended stream 1 is stderr. Readiness probes flip the session into
//! non-blocking mode, pull whatever bytes libssh2 has already decrypted, and
//! park them in local buffers.

use std::io::Read;
use std::time::{Duration, Instant};

use ssh2::Session;

use super::Channel;
use crate::error::RemoteRelayError;
use crate::Result;

/// Extended data stream id for stderr in the SSH connection protocol.
const SSH_EXTENDED_DATA_STDERR: i32 = 1;

/// Sleep between readiness probes inside a bounded wait.
const PROBE_INTERVAL: Duration = Duration::from_millis(10);

/// Scratch buffer size for draining stream data.
const READ_BUFFER_SIZE: usize = 4096;

/// Channel bound to one remote command invocation over SSH.
///
/// Created by [`crate::session::RemoteSession::dispatch`]; consumed by
/// [`crate::execution::RemoteExecutor::execute`]. Dropping the channel closes
/// it best-effort so an aborted execution never leaks a half-open channel.
pub struct SshChannel {
    session: Session,
    channel: ssh2::Channel,
    stdout_buf: Vec<u8>,
    stderr_buf: Vec<u8>,
    read_shut: bool,
    closed: bool,
}

impl SshChannel {
    /// Wrap a channel that already has the command dispatched on it.
    pub fn new(session: Session, channel: ssh2::Channel) -> Self {
        Self {
            session,
            channel,
            stdout_buf: Vec::new(),
            stderr_buf: Vec::new(),
            read_shut: false,
            closed: false,
        }
    }

    /// Pull all bytes libssh2 has buffered for the given stream without
    /// blocking, appending them to the local buffer.
    fn probe_stream(&mut self, stream_id: i32) -> Result<()> {
        if self.read_shut {
            return Ok(());
        }

        self.session.set_blocking(false);
        let result = Self::read_available(&mut self.channel, stream_id, match stream_id {
            0 => &mut self.stdout_buf,
            _ => &mut self.stderr_buf,
        });
        self.session.set_blocking(true);
        result
    }

    fn read_available(
        channel: &mut ssh2::Channel,
        stream_id: i32,
        buf: &mut Vec<u8>,
    ) -> Result<()> {
        let mut scratch = [0u8; READ_BUFFER_SIZE];
        loop {
            match channel.stream(stream_id).read(&mut scratch) {
                Ok(0) => return Ok(()),
                Ok(n) => buf.extend_from_slice(&scratch[..n]),
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => return Ok(()),
                Err(e) => {
                    return Err(RemoteRelayError::Transport(format!(
                        "channel read failed: {}",
                        e
                    )))
                }
            }
        }
    }
}

impl Channel for SshChannel {
    fn stdout_ready(&mut self) -> Result<bool> {
        if self.stdout_buf.is_empty() {
            self.probe_stream(0)?;
        }
        Ok(!self.stdout_buf.is_empty())
    }

    fn stderr_ready(&mut self) -> Result<bool> {
        if self.stderr_buf.is_empty() {
            self.probe_stream(SSH_EXTENDED_DATA_STDERR)?;
        }
        Ok(!self.stderr_buf.is_empty())
    }

    fn drain_stdout(&mut self) -> Result<Vec<u8>> {
        self.probe_stream(0)?;
        Ok(std::mem::take(&mut self.stdout_buf))
    }

    fn drain_stderr(&mut self) -> Result<Vec<u8>> {
        self.probe_stream(SSH_EXTENDED_DATA_STDERR)?;
        Ok(std::mem::take(&mut self.stderr_buf))
    }

    fn wait_readable(&mut self, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.stdout_ready()? || self.stderr_ready()? || self.is_closed() {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            std::thread::sleep(PROBE_INTERVAL);
        }
    }

    fn is_closed(&self) -> bool {
        self.closed || self.channel.eof()
    }

    fn exit_status_ready(&self) -> bool {
        // The exit-status request precedes the close packet, so once libssh2
        // has seen remote EOF the status has been recorded.
        self.channel.eof()
    }

    fn exit_status(&mut self) -> Result<i32> {
        if !self.exit_status_ready() {
            return Err(RemoteRelayError::ExitStatusUnavailable);
        }

        self.session.set_blocking(true);
        if !self.closed {
            self.channel.close()?;
            self.closed = true;
        }
        self.channel.wait_close()?;
        Ok(self.channel.exit_status()?)
    }

    fn shutdown_write(&mut self) -> Result<()> {
        self.session.set_blocking(true);
        self.channel.send_eof()?;
        Ok(())
    }

    fn shutdown_read(&mut self) -> Result<()> {
        // libssh2 has no read half-close; recording it locally stops all
        // further probes, which is the visible contract.
        self.read_shut = true;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.session.set_blocking(true);
        self.channel.close()?;
        self.closed = true;
        Ok(())
    }
}

impl Drop for SshChannel {
    fn drop(&mut self) {
        if !self.closed {
            self.session.set_blocking(true);
            let _ = self.channel.close();
        }
    }
}
