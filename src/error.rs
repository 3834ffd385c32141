use crate::config::ConfigError;
use crate::port::PortError;
use crate::protocol::ProtocolError;
use thiserror::Error;

/// Failures inside the poll loop.
///
/// None of these stop the process; the supervisor logs them and backs off.
#[derive(Debug, Error)]
pub enum PollError {
    /// Discovery found no device node.
    #[error("no serial port available matching '{pattern}'")]
    NoPortAvailable { pattern: String },

    /// A device path was known but could not be opened.
    #[error("could not open port '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: PortError,
    },

    /// An exchange failed; the connection is abandoned.
    #[error("exchange failed: {0}")]
    Protocol(#[from] ProtocolError),

    /// The blocking I/O task died before handing the port back.
    #[error("serial I/O task aborted: {0}")]
    TaskAborted(String),
}

/// Startup and serving errors for the binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid listen address '{0}'")]
    InvalidAddress(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the binary's top-level operations.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_error_display() {
        let err = PollError::NoPortAvailable {
            pattern: "/dev/tty.usbserial-*".into(),
        };
        assert_eq!(
            err.to_string(),
            "no serial port available matching '/dev/tty.usbserial-*'"
        );

        let err = PollError::Open {
            path: "/dev/tty.usbserial-1410".into(),
            source: PortError::not_found("/dev/tty.usbserial-1410"),
        };
        assert!(err.to_string().contains("could not open port"));
    }

    #[test]
    fn test_protocol_error_converts() {
        let err: PollError = ProtocolError::ShortRead { got: 3, expected: 4 }.into();
        assert!(matches!(err, PollError::Protocol(ProtocolError::ShortRead { got: 3, .. })));
        assert_eq!(err.to_string(), "exchange failed: wrong response: got 3 of 4 bytes");
    }
}
