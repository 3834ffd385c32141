//! Port abstraction layer for serial communication.
//!
//! Provides the adapter and opener traits, the `serialport` backed
//! implementation, and mocks used by the test suite.

pub mod error;
pub mod mock;
pub mod sync_port;
pub mod traits;

pub use error::PortError;
pub use mock::{MockPortOpener, MockSerialPort, OpenAttempt};
pub use sync_port::{SerialPortOpener, SyncSerialPort};
pub use traits::*;
