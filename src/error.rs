//! Error types for remote-relay.

use thiserror::Error;

/// Main error type for remote-relay operations.
#[derive(Error, Debug)]
pub enum RemoteRelayError {
    /// The channel or the underlying transport is unusable.
    #[error("transport error: {0}")]
    Transport(String),

    /// SSH protocol error from the transport layer.
    #[error("SSH error: {0}")]
    Ssh(#[from] ssh2::Error),

    /// Captured output is not valid UTF-8.
    ///
    /// The raw byte accumulation is recoverable from the wrapped error via
    /// [`std::string::FromUtf8Error::into_bytes`], so no data is lost.
    #[error("output is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// The drain loop terminated but the remote exit status was never
    /// delivered. Always a defect in the channel or the remote side, never
    /// mapped to a default exit code.
    #[error("exit status unavailable after channel drain")]
    ExitStatusUnavailable,

    /// Authentication against the remote host failed.
    #[error("authentication failed for {user}@{host}")]
    Authentication { user: String, host: String },

    /// File transfer failure.
    #[error("transfer error: {0}")]
    Transfer(String),

    /// Operation attempted on a session that is not connected.
    #[error("session not connected")]
    NotConnected,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience Result type for remote-relay operations.
pub type Result<T> = std::result::Result<T, RemoteRelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_display() {
        let err = RemoteRelayError::Transport("channel already closed".into());
        assert!(err.to_string().contains("transport error"));
        assert!(err.to_string().contains("channel already closed"));
    }

    #[test]
    fn test_encoding_preserves_bytes() {
        let bad = vec![0x66, 0x6f, 0xff, 0x6f];
        let err = String::from_utf8(bad.clone()).unwrap_err();
        let relay_err: RemoteRelayError = err.into();

        match relay_err {
            RemoteRelayError::Encoding(e) => assert_eq!(e.into_bytes(), bad),
            other => panic!("expected Encoding, got {:?}", other),
        }
    }

    #[test]
    fn test_exit_status_unavailable_display() {
        let err = RemoteRelayError::ExitStatusUnavailable;
        assert!(err.to_string().contains("exit status unavailable"));
    }

    #[test]
    fn test_authentication_display() {
        let err = RemoteRelayError::Authentication {
            user: "deploy".into(),
            host: "build01".into(),
        };
        assert!(err.to_string().contains("deploy@build01"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let relay_err: RemoteRelayError = io_err.into();
        assert!(matches!(relay_err, RemoteRelayError::Io(_)));
        assert!(relay_err.to_string().contains("I/O error"));
    }
}
