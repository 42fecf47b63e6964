//! Execution result types.

use std::time::Duration;

/// Result of one remote command execution.
///
/// Produced once per invocation and returned to the caller; nothing is
/// persisted. `stdout` contains every byte the remote process wrote to stdout
/// before it exited, decoded as UTF-8.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Captured stdout, decoded as UTF-8.
    pub stdout: String,
    /// Captured stderr, if the executor was configured to keep it.
    pub stderr: Option<String>,
    /// Remote process exit code.
    pub exit_code: i32,
    /// Wall-clock duration of the drain loop.
    pub duration: Duration,
}

impl ExecutionResult {
    /// Create a new execution result.
    pub fn new(stdout: String, stderr: Option<String>, exit_code: i32, duration: Duration) -> Self {
        Self {
            stdout,
            stderr,
            exit_code,
            duration,
        }
    }

    /// Check if the command succeeded (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Check if the command failed (non-zero exit code).
    pub fn failed(&self) -> bool {
        self.exit_code != 0
    }

    /// Get stdout as string, trimmed.
    pub fn output_trimmed(&self) -> &str {
        self.stdout.trim()
    }

    /// Get stdout lines.
    pub fn output_lines(&self) -> impl Iterator<Item = &str> {
        self.stdout.lines()
    }
}

/// Streaming output chunk handed to observers during execution.
#[derive(Debug, Clone)]
pub struct OutputChunk {
    /// Raw bytes.
    pub raw: Vec<u8>,
    /// Decoded text (best effort).
    pub text: String,
    /// Stream source.
    pub source: OutputSource,
}

/// Source of output data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSource {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
}

impl OutputChunk {
    /// Create a new output chunk.
    pub fn new(raw: Vec<u8>, source: OutputSource) -> Self {
        let text = String::from_utf8_lossy(&raw).into_owned();
        Self { raw, text, source }
    }

    /// Create a stdout chunk.
    pub fn stdout(raw: Vec<u8>) -> Self {
        Self::new(raw, OutputSource::Stdout)
    }

    /// Create a stderr chunk.
    pub fn stderr(raw: Vec<u8>) -> Self {
        Self::new(raw, OutputSource::Stderr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_result_new() {
        let result = ExecutionResult::new(
            "hello\n".to_string(),
            None,
            0,
            Duration::from_millis(100),
        );

        assert_eq!(result.stdout, "hello\n");
        assert!(result.stderr.is_none());
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.duration, Duration::from_millis(100));
    }

    #[test]
    fn test_execution_result_success() {
        let result = ExecutionResult::new(String::new(), None, 0, Duration::ZERO);
        assert!(result.success());
        assert!(!result.failed());
    }

    #[test]
    fn test_execution_result_failed() {
        let result = ExecutionResult::new(String::new(), None, 2, Duration::ZERO);
        assert!(!result.success());
        assert!(result.failed());
    }

    #[test]
    fn test_output_trimmed() {
        let result = ExecutionResult::new(
            "  hello world  \n".to_string(),
            None,
            0,
            Duration::ZERO,
        );
        assert_eq!(result.output_trimmed(), "hello world");
    }

    #[test]
    fn test_output_lines() {
        let result = ExecutionResult::new(
            "line1\nline2\nline3".to_string(),
            None,
            0,
            Duration::ZERO,
        );
        let lines: Vec<_> = result.output_lines().collect();
        assert_eq!(lines, vec!["line1", "line2", "line3"]);
    }

    #[test]
    fn test_output_chunk_stdout() {
        let chunk = OutputChunk::stdout(b"test output".to_vec());
        assert_eq!(chunk.source, OutputSource::Stdout);
        assert_eq!(chunk.text, "test output");
    }

    #[test]
    fn test_output_chunk_stderr() {
        let chunk = OutputChunk::stderr(b"warning: thing".to_vec());
        assert_eq!(chunk.source, OutputSource::Stderr);
        assert_eq!(chunk.text, "warning: thing");
    }
}
