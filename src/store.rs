//! Latest detector reading, shared between the poll supervisor and HTTP handlers.
//!
//! The supervisor is the only writer. Handlers take snapshots. The lock is
//! held for a field assignment or a copy, never across I/O.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name of the metric the detector reports.
pub const METRIC_NAME: &str = "cpm";

/// CPM at which the reading stops being `ok`.
pub const WARN_THRESHOLD: u32 = 50;

/// CPM at which the reading becomes `critical`.
pub const CRITICAL_THRESHOLD: u32 = 100;

/// Classification derived from a CPM value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    None,
    Ok,
    Warn,
    Critical,
}

impl Status {
    /// Classify a CPM value.
    pub fn from_cpm(value: u32) -> Self {
        match value {
            0 => Self::None,
            v if v < WARN_THRESHOLD => Self::Ok,
            v if v < CRITICAL_THRESHOLD => Self::Warn,
            _ => Self::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The current measurement: CPM plus its status.
///
/// Only constructible through [`Reading::new`], so `status` always matches `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct Reading {
    value: u32,
    status: Status,
}

impl Reading {
    pub fn new(value: u32) -> Self {
        Self {
            value,
            status: Status::from_cpm(value),
        }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn status(&self) -> Status {
        self.status
    }
}

/// Handle to the shared reading. Clones refer to the same record.
#[derive(Debug, Clone, Default)]
pub struct ReadingStore {
    inner: Arc<RwLock<Reading>>,
}

impl ReadingStore {
    /// Create a store holding `{value: 0, status: none}`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the reading with `value` and its derived status.
    pub fn update(&self, value: u32) {
        let reading = Reading::new(value);
        *self.inner.write() = reading;
    }

    /// Copy out the current reading.
    pub fn snapshot(&self) -> Reading {
        *self.inner.read()
    }
}
