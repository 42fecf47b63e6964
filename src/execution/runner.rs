//! Sequential command runner.

use tracing::info;

use super::executor::RemoteExecutor;
use super::result::ExecutionResult;
use crate::channel::Channel;
use crate::Result;

/// Source of freshly dispatched channels, one per command.
///
/// Implemented by [`crate::session::RemoteSession`] for live SSH connections
/// and by scripted mocks in tests, so sequencing logic is testable without a
/// reachable server.
pub trait Dispatch {
    /// Concrete channel type handed out per command.
    type Channel: Channel;

    /// Dispatch a command on a fresh channel.
    ///
    /// The command string is passed to the remote side verbatim; no quoting
    /// or escaping is applied.
    fn dispatch(&mut self, command: &str) -> Result<Self::Channel>;
}

/// Runs an ordered sequence of commands, one channel each.
///
/// Commands are dispatched and awaited strictly in sequence; results come
/// back in input order. The first failure aborts the run and surfaces
/// unchanged -- no partial-failure aggregation, no retry.
pub struct CommandRunner {
    executor: RemoteExecutor,
}

impl CommandRunner {
    /// Create a runner around the given executor.
    pub fn new(executor: RemoteExecutor) -> Self {
        Self { executor }
    }

    /// Run a single command on a fresh channel.
    pub fn run<D: Dispatch>(&self, dispatcher: &mut D, command: &str) -> Result<ExecutionResult> {
        let channel = dispatcher.dispatch(command)?;
        let result = self.executor.execute(channel)?;
        info!(
            command,
            exit_code = result.exit_code,
            stdout_len = result.stdout.len(),
            "command finished"
        );
        Ok(result)
    }

    /// Run all commands in order, collecting results in input order.
    pub fn run_all<D, I, S>(&self, dispatcher: &mut D, commands: I) -> Result<Vec<ExecutionResult>>
    where
        D: Dispatch,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut results = Vec::new();
        for command in commands {
            results.push(self.run(dispatcher, command.as_ref())?);
        }
        Ok(results)
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new(RemoteExecutor::new())
    }
}
