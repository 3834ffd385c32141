//! Configuration module for radmon_agent.
//!
//! TOML-based configuration with environment variable overrides.
//!
//! # Configuration Resolution
//!
//! 1. `RADMON_CONFIG` environment variable (explicit path)
//! 2. `./radmon.toml` (current directory)
//! 3. `$XDG_CONFIG_HOME/radmon/radmon.toml`, falling back to `~/.config/radmon/radmon.toml`
//! 4. Built-in defaults (no file required)
//!
//! # Environment Overrides
//!
//! The pattern is `RADMON_<SECTION>_<KEY>`:
//! - `RADMON_SERVER_PORT=9090`
//! - `RADMON_SERIAL_PORT=/dev/ttyUSB0`
//! - `RADMON_POLL_INTERVAL_MS=1000`
//!
//! # Example
//!
//! ```rust,no_run
//! use radmon_agent::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load()?;
//! let config = loader.config();
//! println!("Polling every {:?}", config.poll.interval());
//! # Ok::<(), radmon_agent::config::ConfigError>(())
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{get_default_config_path, resolve_config_path, validate, ConfigLoader};
pub use schema::{
    Config, LogFormat, LoggingConfig, PollConfig, SerialConfig, ServerConfig, ThermalConfig,
};
