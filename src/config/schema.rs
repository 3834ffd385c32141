//! Configuration schema definitions.
//!
//! All sections default sensibly, so an empty file (or no file) is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::locator::{PortLocator, DEFAULT_PORT_PATTERN};
use crate::port::{PortConfiguration, DETECTOR_BAUD_RATE};
use crate::supervisor::{PollSettings, PortSource};
use crate::thermal::{ThermalProbe, DEFAULT_THERMAL_ROOT};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Detector serial link
    pub serial: SerialConfig,
    /// Poll loop timing
    pub poll: PollConfig,
    /// Host temperature source
    pub thermal: ThermalConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Supervisor timing plus link parameters.
    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            poll_interval: self.poll.interval(),
            no_port_backoff: self.poll.no_port_backoff(),
            pinned_backoff: self.poll.pinned_backoff(),
            discovered_backoff: self.poll.discovered_backoff(),
            port: self.serial.port_configuration(),
        }
    }
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port number for HTTP server
    pub port: u16,
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
        }
    }
}

/// Serial link section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Fixed device path; disables discovery when set
    pub port: Option<String>,
    /// Glob used for discovery
    pub pattern: String,
    /// Link baud rate
    pub baud_rate: u32,
    /// Read timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            pattern: DEFAULT_PORT_PATTERN.to_string(),
            baud_rate: DETECTOR_BAUD_RATE,
            timeout_ms: 1000,
        }
    }
}

impl SerialConfig {
    /// Get the read timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn port_configuration(&self) -> PortConfiguration {
        PortConfiguration {
            baud_rate: self.baud_rate,
            timeout: self.timeout(),
        }
    }

    /// Pinned path if configured, otherwise discovery by pattern.
    pub fn port_source(&self) -> PortSource {
        match self.port.as_deref() {
            Some(path) if !path.is_empty() => PortSource::Pinned(path.to_string()),
            _ => PortSource::Discover(PortLocator::new(self.pattern.clone())),
        }
    }
}

/// Poll loop timing section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Delay between exchanges in milliseconds
    pub interval_ms: u64,
    /// Wait after discovery found nothing
    pub no_port_backoff_ms: u64,
    /// Wait before reopening a pinned port
    pub pinned_backoff_ms: u64,
    /// Wait before rediscovering after a discovered port failed
    pub discovered_backoff_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            no_port_backoff_ms: 3000,
            pinned_backoff_ms: 3000,
            discovered_backoff_ms: 1000,
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn no_port_backoff(&self) -> Duration {
        Duration::from_millis(self.no_port_backoff_ms)
    }

    pub fn pinned_backoff(&self) -> Duration {
        Duration::from_millis(self.pinned_backoff_ms)
    }

    pub fn discovered_backoff(&self) -> Duration {
        Duration::from_millis(self.discovered_backoff_ms)
    }
}

/// Host temperature section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermalConfig {
    /// Directory holding `thermal_zone*` entries
    pub sysfs_root: PathBuf,
}

impl Default for ThermalConfig {
    fn default() -> Self {
        Self {
            sysfs_root: PathBuf::from(DEFAULT_THERMAL_ROOT),
        }
    }
}

impl ThermalConfig {
    pub fn probe(&self) -> ThermalProbe {
        ThermalProbe::new(self.sysfs_root.clone())
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log format: "json", "pretty", "compact"
    pub format: LogFormat,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format
    Json,
    /// Pretty format with colors
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}
