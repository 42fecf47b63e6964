//! Remote command execution engine.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::debug;

use super::result::{ExecutionResult, OutputChunk};
use crate::channel::Channel;
use crate::Result;

/// Default per-iteration wait timeout for the drain loop.
///
/// Bounds each readiness wait so the loop stays responsive; it is not an
/// overall deadline for the command.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Observer invoked with each output chunk as it is drained.
///
/// Passed explicitly rather than routed through process-global state, so
/// embedding applications can wire progress reporting per invocation.
pub type OutputObserver = Arc<dyn Fn(&OutputChunk) + Send + Sync>;

/// Executor that drains one remote command invocation to completion.
///
/// Given a live [`Channel`] with the command already dispatched, drains
/// stdout and stderr until the remote process has truly finished and every
/// buffered byte has been retrieved, then returns the captured output and the
/// process exit status. The channel is consumed; it cannot be reused.
#[derive(Clone)]
pub struct RemoteExecutor {
    wait_timeout: Duration,
    capture_stderr: bool,
    observer: Option<OutputObserver>,
}

impl RemoteExecutor {
    /// Create an executor with default settings.
    pub fn new() -> Self {
        Self {
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            capture_stderr: true,
            observer: None,
        }
    }

    /// Set the per-iteration wait timeout.
    pub fn wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    /// Set whether stderr bytes are kept in the result.
    ///
    /// When `false`, stderr is still drained every iteration (a full stderr
    /// buffer would stall the remote process) but its content is discarded,
    /// matching the classic drain-and-discard behavior.
    pub fn capture_stderr(mut self, capture: bool) -> Self {
        self.capture_stderr = capture;
        self
    }

    /// Attach an output observer.
    pub fn observer(mut self, observer: OutputObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Execute the drain loop on a dispatched channel.
    ///
    /// Blocks the calling thread until the channel reaches its terminal state
    /// (closed with both stream buffers empty) or a transport error occurs.
    /// On success the channel has been fully closed; on error it is dropped,
    /// which closes it defensively.
    pub fn execute<C: Channel>(&self, mut channel: C) -> Result<ExecutionResult> {
        let start = Instant::now();

        // No stdin will ever be sent; signalling EOF up front lets remote
        // commands that read stdin proceed instead of waiting forever.
        channel.shutdown_write()?;

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        // Eager drain: a fast command can finish before the first wait, and
        // its output must not be missed.
        let primed = channel.drain_stdout()?;
        self.emit_stdout(&primed, &mut stdout);

        loop {
            // Terminal state: remote closed and both stream buffers empty.
            if channel.is_closed() && !channel.stdout_ready()? && !channel.stderr_ready()? {
                break;
            }

            let mut got_chunk = false;
            let _ = channel.wait_readable(self.wait_timeout)?;

            if channel.stdout_ready()? {
                let bytes = channel.drain_stdout()?;
                if !bytes.is_empty() {
                    self.emit_stdout(&bytes, &mut stdout);
                    got_chunk = true;
                }
            }

            // stderr must be drained every iteration even when discarded:
            // a full stderr buffer stalls the remote process.
            if channel.stderr_ready()? {
                let bytes = channel.drain_stderr()?;
                if !bytes.is_empty() {
                    self.emit_stderr(&bytes, &mut stderr);
                    got_chunk = true;
                }
            }

            // Completion needs three facts at once: nothing arrived this
            // tick, the exit status has been delivered, and both buffers are
            // empty. Exit status alone is not enough -- bytes can still sit
            // between the transport and this process at the moment the remote
            // reports the exit.
            if !got_chunk
                && channel.exit_status_ready()
                && !channel.stderr_ready()?
                && !channel.stdout_ready()?
            {
                break;
            }
        }

        channel.shutdown_read()?;
        channel.close()?;

        // The loop only exits once the remote side finished; a missing exit
        // status here is a defect to surface, not to default away.
        let exit_code = channel.exit_status()?;

        let stdout_len = stdout.len();
        let stdout = String::from_utf8(stdout)?;
        let stderr = self
            .capture_stderr
            .then(|| String::from_utf8_lossy(&stderr).into_owned());

        debug!(
            exit_code,
            stdout_len,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "remote command drained"
        );

        Ok(ExecutionResult::new(
            stdout,
            stderr,
            exit_code,
            start.elapsed(),
        ))
    }

    /// Execute on a blocking worker thread, streaming output chunks.
    ///
    /// Returns a receiver of [`OutputChunk`]s and a join handle resolving to
    /// the final [`ExecutionResult`].
    pub async fn execute_async<C>(
        &self,
        channel: C,
    ) -> (
        mpsc::Receiver<OutputChunk>,
        tokio::task::JoinHandle<Result<ExecutionResult>>,
    )
    where
        C: Channel + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<OutputChunk>(64);

        let mut executor = self.clone();
        let inner = executor.observer.take();
        executor.observer = Some(Arc::new(move |chunk: &OutputChunk| {
            if let Some(ref obs) = inner {
                obs(chunk);
            }
            // Ignore if the receiver was dropped.
            let _ = tx.blocking_send(chunk.clone());
        }));

        let handle = tokio::task::spawn_blocking(move || executor.execute(channel));
        (rx, handle)
    }

    fn emit_stdout(&self, bytes: &[u8], accumulation: &mut Vec<u8>) {
        if bytes.is_empty() {
            return;
        }
        if let Some(ref observer) = self.observer {
            observer(&OutputChunk::stdout(bytes.to_vec()));
        }
        accumulation.extend_from_slice(bytes);
    }

    fn emit_stderr(&self, bytes: &[u8], accumulation: &mut Vec<u8>) {
        if let Some(ref observer) = self.observer {
            observer(&OutputChunk::stderr(bytes.to_vec()));
        }
        if self.capture_stderr {
            accumulation.extend_from_slice(bytes);
        }
    }
}

impl Default for RemoteExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteRelayError;

    /// Channel whose remote side already closed with nothing buffered.
    struct FinishedChannel {
        exit_code: Option<i32>,
        wait_calls: usize,
    }

    impl Channel for FinishedChannel {
        fn stdout_ready(&mut self) -> Result<bool> {
            Ok(false)
        }
        fn stderr_ready(&mut self) -> Result<bool> {
            Ok(false)
        }
        fn drain_stdout(&mut self) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }
        fn drain_stderr(&mut self) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }
        fn wait_readable(&mut self, _timeout: Duration) -> Result<bool> {
            self.wait_calls += 1;
            Ok(true)
        }
        fn is_closed(&self) -> bool {
            true
        }
        fn exit_status_ready(&self) -> bool {
            self.exit_code.is_some()
        }
        fn exit_status(&mut self) -> Result<i32> {
            self.exit_code.ok_or(RemoteRelayError::ExitStatusUnavailable)
        }
        fn shutdown_write(&mut self) -> Result<()> {
            Ok(())
        }
        fn shutdown_read(&mut self) -> Result<()> {
            Ok(())
        }
        fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_fast_command_no_blocking_wait() {
        let channel = FinishedChannel {
            exit_code: Some(0),
            wait_calls: 0,
        };
        let result = RemoteExecutor::new().execute(channel).unwrap();
        assert_eq!(result.stdout, "");
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn test_missing_exit_status_is_error() {
        let channel = FinishedChannel {
            exit_code: None,
            wait_calls: 0,
        };
        let err = RemoteExecutor::new().execute(channel).unwrap_err();
        assert!(matches!(err, RemoteRelayError::ExitStatusUnavailable));
    }

    #[test]
    fn test_default_wait_timeout() {
        assert_eq!(DEFAULT_WAIT_TIMEOUT, Duration::from_secs(5));
    }

    #[test]
    fn test_builder_settings() {
        let executor = RemoteExecutor::new()
            .wait_timeout(Duration::from_millis(250))
            .capture_stderr(false);
        assert_eq!(executor.wait_timeout, Duration::from_millis(250));
        assert!(!executor.capture_stderr);
    }
}
