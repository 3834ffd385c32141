//! Radiation monitor agent library.
//!
//! Polls a GQ GMC Geiger counter over serial and keeps the latest
//! counts-per-minute reading available to HTTP clients.
//!
//! # Modules
//!
//! - `config`: Configuration management with TOML support
//! - `error`: Poll loop and top-level error types
//! - `locator`: Device node discovery by glob pattern
//! - `port`: Port abstraction layer for serial communication
//! - `protocol`: The `<GETCPM>>` request/response exchange
//! - `store`: Shared latest reading
//! - `supervisor`: Connection lifecycle and poll loop
//! - `thermal`: Host temperature readout
//! - `rest_api`: HTTP handlers

pub mod config;
pub mod error;
pub mod locator;
pub mod port;
pub mod protocol;
pub mod rest_api;
pub mod store;
pub mod supervisor;
pub mod thermal;

// Re-export commonly used types for convenience
pub use error::{AppError, AppResult, PollError};
pub use locator::{LocateError, PortLocator};
pub use port::{
    MockPortOpener, MockSerialPort, PortConfiguration, PortError, PortOpener, SerialPortAdapter,
    SerialPortOpener, SyncSerialPort,
};
pub use protocol::{exchange, ProtocolError};
pub use rest_api::{build_router, RestContext};
pub use store::{Reading, ReadingStore, Status};
pub use supervisor::{PollSettings, PollSupervisor, PortSource};
pub use thermal::ThermalProbe;

// Re-export config types
pub use config::{Config, ConfigError, ConfigLoader, ConfigResult};
