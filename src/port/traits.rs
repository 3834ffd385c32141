//! Core traits for serial port abstraction.
//!
//! `SerialPortAdapter` is the handle the supervisor owns while a connection is
//! up; `PortOpener` is how it gets one. Both have a real `serialport` backed
//! implementation and a mock for tests.

use super::error::PortError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Baud rate the GMC family speaks out of the box.
pub const DETECTOR_BAUD_RATE: u32 = 115_200;

/// Read timeout for one reply.
pub const DETECTOR_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Link parameters for opening the detector port.
///
/// Framing is always 8N1 without flow control; only the rate and the read
/// timeout are tunable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortConfiguration {
    /// Baud rate (bits per second).
    pub baud_rate: u32,

    /// Read timeout.
    pub timeout: Duration,
}

impl Default for PortConfiguration {
    fn default() -> Self {
        Self {
            baud_rate: DETECTOR_BAUD_RATE,
            timeout: DETECTOR_READ_TIMEOUT,
        }
    }
}

/// Trait for serial port I/O operations.
///
/// Implementations are blocking; callers in async context run them on the
/// blocking pool.
pub trait SerialPortAdapter: Send + std::fmt::Debug {
    /// Write bytes to the serial port.
    ///
    /// Returns the number of bytes actually written.
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError>;

    /// Read bytes from the serial port into the provided buffer.
    ///
    /// Returns the number of bytes actually read. Fails with
    /// [`PortError::Timeout`] if nothing arrived within the read timeout.
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError>;

    /// Get the name/path of this serial port.
    fn name(&self) -> &str;
}

/// Opens serial ports by path.
pub trait PortOpener: Send + Sync + std::fmt::Debug {
    /// Open `path` with the given link parameters.
    fn open(
        &self,
        path: &str,
        config: &PortConfiguration,
    ) -> Result<Box<dyn SerialPortAdapter>, PortError>;
}
