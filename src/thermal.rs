//! Host temperatures via `/sys/class/thermal/`.
//!
//! Each `thermal_zone*` directory holds a `temp` file in millidegrees Celsius
//! and a `type` file naming the sensor. Readings outside `(0, 100)` °C are
//! dropped as bogus.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Default sysfs directory holding the thermal zones.
pub const DEFAULT_THERMAL_ROOT: &str = "/sys/class/thermal";

/// Key reported when no zone could be enumerated.
pub const ERROR_KEY: &str = "error";

const ZONE_PREFIX: &str = "thermal_zone";

#[derive(Debug, Error)]
pub enum ThermalError {
    #[error("failed to read '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{path}': {detail}")]
    ParseError { path: String, detail: String },
}

/// Sensor name → temperature in °C.
pub type Temperatures = BTreeMap<String, f64>;

/// Reads host temperatures from a sysfs thermal root.
#[derive(Debug, Clone)]
pub struct ThermalProbe {
    root: PathBuf,
}

impl Default for ThermalProbe {
    fn default() -> Self {
        Self::new(DEFAULT_THERMAL_ROOT)
    }
}

impl ThermalProbe {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Temperatures for the JSON payload. Falls back to `{"error": -1}` when
    /// the thermal root cannot be enumerated.
    pub fn temperatures(&self) -> Temperatures {
        match self.read_all() {
            Ok(temps) => temps,
            Err(e) => {
                debug!(error = %e, "host temperatures unavailable");
                BTreeMap::from([(ERROR_KEY.to_string(), -1.0)])
            }
        }
    }

    /// Read every plausible zone. A zone that cannot be read is skipped.
    pub fn read_all(&self) -> Result<Temperatures, ThermalError> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| ThermalError::ReadError {
            path: self.root.display().to_string(),
            source: e,
        })?;

        let mut zones: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(ZONE_PREFIX))
            .map(|entry| entry.path())
            .collect();
        zones.sort();

        let mut temps = Temperatures::new();
        for zone in zones {
            let celsius = match read_zone_celsius(&zone) {
                Ok(c) => c,
                Err(e) => {
                    debug!(error = %e, "skipping thermal zone");
                    continue;
                }
            };
            if celsius <= 0.0 || celsius >= 100.0 {
                continue;
            }

            let zone_name = zone
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let key = match read_sysfs_file(&zone.join("type")) {
                Ok(kind) if !temps.contains_key(&kind) => kind,
                Ok(kind) => format!("{kind}_{zone_name}"),
                Err(_) => zone_name,
            };
            temps.insert(key, celsius);
        }

        Ok(temps)
    }
}

fn read_zone_celsius(zone: &Path) -> Result<f64, ThermalError> {
    let path = zone.join("temp");
    let content = read_sysfs_file(&path)?;
    let millidegrees: i64 = content.parse().map_err(|_| ThermalError::ParseError {
        path: path.display().to_string(),
        detail: format!("expected integer millidegrees, got '{content}'"),
    })?;
    Ok(millidegrees as f64 / 1000.0)
}

fn read_sysfs_file(path: &Path) -> Result<String, ThermalError> {
    std::fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|e| ThermalError::ReadError {
            path: path.display().to_string(),
            source: e,
        })
}
