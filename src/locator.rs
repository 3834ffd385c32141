//! Finds the detector's device node by glob pattern.

use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// USB-serial bridge name used by the GMC cable on macOS.
pub const DEFAULT_PORT_PATTERN: &str = "/dev/tty.usbserial-*";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocateError {
    /// Nothing matched, or the pattern could not be enumerated.
    #[error("no serial port matching '{pattern}'")]
    NotFound { pattern: String },
}

/// Discovers a candidate device path.
#[derive(Debug, Clone)]
pub struct PortLocator {
    pattern: String,
}

impl Default for PortLocator {
    fn default() -> Self {
        Self::new(DEFAULT_PORT_PATTERN)
    }
}

impl PortLocator {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Return the lexicographically last path matching the pattern.
    pub fn locate(&self) -> Result<PathBuf, LocateError> {
        let not_found = || LocateError::NotFound {
            pattern: self.pattern.clone(),
        };

        let paths = glob::glob(&self.pattern).map_err(|e| {
            debug!(pattern = %self.pattern, error = %e, "invalid port pattern");
            not_found()
        })?;

        let mut matches = paths
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                debug!(pattern = %self.pattern, error = %e, "port enumeration failed");
                not_found()
            })?;
        matches.sort();

        matches.pop().ok_or_else(not_found)
    }
}
