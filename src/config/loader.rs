//! Configuration loader with file resolution and environment override support.

use super::error::{ConfigError, ConfigResult};
use super::schema::{Config, LogFormat};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "RADMON";

/// Config file name
const CONFIG_FILE_NAME: &str = "radmon.toml";

/// Environment variable for explicit config path
const CONFIG_PATH_ENV: &str = "RADMON_CONFIG";

/// Configuration loader with resolution and override logic.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Resolved config file path (if any)
    pub config_path: Option<PathBuf>,
    /// The loaded configuration
    pub config: Config,
}

impl ConfigLoader {
    /// Load configuration using standard resolution order.
    ///
    /// Resolution priority (highest to lowest):
    /// 1. `RADMON_CONFIG` environment variable (explicit path)
    /// 2. `./radmon.toml` (current directory)
    /// 3. `$XDG_CONFIG_HOME/radmon/radmon.toml` (or `~/.config/...`)
    /// 4. Built-in defaults (no file required)
    ///
    /// Environment variables override file values, then the result is validated.
    pub fn load() -> ConfigResult<Self> {
        let config_path = resolve_config_path();

        let mut config = match config_path {
            Some(ref path) => load_from_file(path)?,
            None => Config::default(),
        };

        apply_env_overrides(&mut config)?;
        validate(&config)?;

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut config = load_from_file(&path)?;
        apply_env_overrides(&mut config)?;
        validate(&config)?;

        Ok(Self {
            config_path: Some(path),
            config,
        })
    }

    /// Create a loader with default configuration (no file).
    pub fn with_defaults() -> Self {
        let mut config = Config::default();
        // Still apply env overrides even with defaults
        if apply_env_overrides(&mut config).is_err() || validate(&config).is_err() {
            config = Config::default();
        }

        Self {
            config_path: None,
            config,
        }
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

}

/// Resolve the configuration file path using standard locations.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let cwd_config = PathBuf::from(CONFIG_FILE_NAME);
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    get_default_config_path().filter(|p| p.exists())
}

/// Get the default config file path, whether or not it exists.
pub fn get_default_config_path() -> Option<PathBuf> {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })
        .map(|dir| dir.join("radmon").join(CONFIG_FILE_NAME))
}

fn load_from_file(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(ConfigError::ParseError)
}

/// Read `RADMON_<suffix>` and parse it, if set.
fn env_value<T: FromStr>(suffix: &str, what: &str) -> ConfigResult<Option<T>> {
    let var = format!("{ENV_PREFIX}_{suffix}");
    match std::env::var(&var) {
        Ok(val) => val
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::env_parse(var, format!("Invalid {what}"))),
        Err(_) => Ok(None),
    }
}

/// Apply environment variable overrides to the configuration.
///
/// Environment variables follow the pattern `RADMON_<SECTION>_<KEY>`, e.g.
/// `RADMON_SERVER_PORT=9090` or `RADMON_SERIAL_PORT=/dev/ttyUSB0`.
fn apply_env_overrides(config: &mut Config) -> ConfigResult<()> {
    if let Some(val) = env_value::<String>("SERVER_HOST", "host")? {
        config.server.host = val;
    }
    if let Some(val) = env_value("SERVER_PORT", "port number")? {
        config.server.port = val;
    }
    if let Some(val) = env_value::<String>("SERVER_LOG_LEVEL", "log level")? {
        config.server.log_level = val;
    }

    if let Some(val) = env_value::<String>("SERIAL_PORT", "port path")? {
        config.serial.port = Some(val);
    }
    if let Some(val) = env_value::<String>("SERIAL_PATTERN", "port pattern")? {
        config.serial.pattern = val;
    }
    if let Some(val) = env_value("SERIAL_BAUD_RATE", "baud rate")? {
        config.serial.baud_rate = val;
    }
    if let Some(val) = env_value("SERIAL_TIMEOUT_MS", "timeout")? {
        config.serial.timeout_ms = val;
    }

    if let Some(val) = env_value("POLL_INTERVAL_MS", "interval")? {
        config.poll.interval_ms = val;
    }
    if let Some(val) = env_value("POLL_NO_PORT_BACKOFF_MS", "backoff")? {
        config.poll.no_port_backoff_ms = val;
    }
    if let Some(val) = env_value("POLL_PINNED_BACKOFF_MS", "backoff")? {
        config.poll.pinned_backoff_ms = val;
    }
    if let Some(val) = env_value("POLL_DISCOVERED_BACKOFF_MS", "backoff")? {
        config.poll.discovered_backoff_ms = val;
    }

    if let Some(val) = env_value::<PathBuf>("THERMAL_SYSFS_ROOT", "path")? {
        config.thermal.sysfs_root = val;
    }

    if let Some(val) = env_value::<String>("LOGGING_FORMAT", "log format")? {
        config.logging.format = match val.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            "compact" => LogFormat::Compact,
            _ => {
                return Err(ConfigError::env_parse(
                    format!("{ENV_PREFIX}_LOGGING_FORMAT"),
                    "Expected json, pretty or compact",
                ))
            }
        };
    }

    Ok(())
}

/// Reject values that would make the poll loop spin or never time out.
pub fn validate(config: &Config) -> ConfigResult<()> {
    if config.serial.baud_rate == 0 {
        return Err(ConfigError::validation("serial.baud_rate", "must be non-zero"));
    }
    if config.serial.timeout_ms == 0 {
        return Err(ConfigError::validation("serial.timeout_ms", "must be non-zero"));
    }
    let poll = &config.poll;
    for (key, value) in [
        ("poll.interval_ms", poll.interval_ms),
        ("poll.no_port_backoff_ms", poll.no_port_backoff_ms),
        ("poll.pinned_backoff_ms", poll.pinned_backoff_ms),
        ("poll.discovered_backoff_ms", poll.discovered_backoff_ms),
    ] {
        if value == 0 {
            return Err(ConfigError::validation(key, "must be non-zero"));
        }
    }
    if config.serial.port.is_none() && config.serial.pattern.trim().is_empty() {
        return Err(ConfigError::validation(
            "serial.pattern",
            "must be set when no fixed port is configured",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    #[serial]
    fn test_default_loader() {
        let loader = ConfigLoader::with_defaults();
        assert_eq!(loader.config().server.port, 8080);
        assert!(loader.config_path.is_none());
    }

    #[test]
    #[serial]
    fn test_env_override() {
        env::set_var("RADMON_SERVER_PORT", "9999");
        env::set_var("RADMON_SERIAL_PORT", "/dev/ttyUSB3");
        env::set_var("RADMON_LOGGING_FORMAT", "JSON");

        let loader = ConfigLoader::with_defaults();
        assert_eq!(loader.config().server.port, 9999);
        assert_eq!(loader.config().serial.port.as_deref(), Some("/dev/ttyUSB3"));
        assert_eq!(loader.config().logging.format, LogFormat::Json);

        env::remove_var("RADMON_SERVER_PORT");
        env::remove_var("RADMON_SERIAL_PORT");
        env::remove_var("RADMON_LOGGING_FORMAT");
    }

    #[test]
    #[serial]
    fn test_bad_env_value_is_reported() {
        env::set_var("RADMON_POLL_INTERVAL_MS", "soon");

        let mut config = Config::default();
        let err = apply_env_overrides(&mut config).unwrap_err();
        assert!(matches!(err, ConfigError::EnvParseError { ref var, .. } if var == "RADMON_POLL_INTERVAL_MS"));

        env::remove_var("RADMON_POLL_INTERVAL_MS");
    }

    #[test]
    #[serial]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("radmon.toml");
        std::fs::write(
            &path,
            "[serial]\nport = \"/dev/ttyACM0\"\n\n[poll]\ninterval_ms = 2000\n",
        )
        .unwrap();

        let loader = ConfigLoader::load_from(&path).unwrap();
        assert_eq!(loader.config_path.as_deref(), Some(path.as_path()));
        assert_eq!(loader.config().serial.port.as_deref(), Some("/dev/ttyACM0"));
        assert_eq!(loader.config().poll.interval_ms, 2000);
    }

    #[test]
    #[serial]
    fn test_load_from_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("radmon.toml");
        std::fs::write(&path, "[poll]\ninterval_ms = 0\n").unwrap();

        let err = ConfigLoader::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { ref key, .. } if key == "poll.interval_ms"));
    }

    #[test]
    fn test_zero_backoffs_are_rejected() {
        for key in [
            "poll.no_port_backoff_ms",
            "poll.pinned_backoff_ms",
            "poll.discovered_backoff_ms",
        ] {
            let mut config = Config::default();
            match key {
                "poll.no_port_backoff_ms" => config.poll.no_port_backoff_ms = 0,
                "poll.pinned_backoff_ms" => config.poll.pinned_backoff_ms = 0,
                _ => config.poll.discovered_backoff_ms = 0,
            }

            let err = validate(&config).unwrap_err();
            assert!(
                matches!(err, ConfigError::ValidationError { key: ref k, .. } if k == key),
                "{key} = 0 was accepted"
            );
        }
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    #[serial]
    fn test_load_from_missing_file() {
        let err = ConfigLoader::load_from("/nonexistent/radmon.toml").unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }
}
