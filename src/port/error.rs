//! Port-specific error types.
//!
//! Kept separate from the polling taxonomy so the adapter layer can be reused
//! by anything that talks to the detector.

use thiserror::Error;

/// Errors that can occur during serial port operations.
#[derive(Debug, Error)]
pub enum PortError {
    /// The specified serial port was not found on the system.
    #[error("Serial port not found: {0}")]
    NotFound(String),

    /// An I/O error occurred during port operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Port configuration failed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The read timeout elapsed before any byte arrived.
    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// A serialport-specific error occurred.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

impl PortError {
    /// Create a NotFound error from a port name.
    pub fn not_found(port_name: impl Into<String>) -> Self {
        Self::NotFound(port_name.into())
    }

    /// Create a Config error from a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a Timeout error from a duration.
    pub fn timeout(duration: std::time::Duration) -> Self {
        Self::Timeout(duration)
    }

    /// Map an `io::Error` coming off the wire, folding `TimedOut` into [`PortError::Timeout`].
    pub fn from_io(err: std::io::Error, timeout: std::time::Duration) -> Self {
        if err.kind() == std::io::ErrorKind::TimedOut {
            Self::Timeout(timeout)
        } else {
            Self::Io(err)
        }
    }
}
