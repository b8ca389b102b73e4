//! Configuration loading

use config::{Config, Environment, File};
use std::env;

use gas_core::TrackerConfig;

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "GAS_TRACKER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "gas-tracker.toml";
/// Prefix for overrides such as `GAS_TRACKER__FETCH_TIMEOUT_MS=3000`
pub const ENV_PREFIX: &str = "GAS_TRACKER";

/// Resolve the config file path: explicit argument, then env, then default
pub fn config_path(explicit: Option<String>) -> String {
    explicit
        .or_else(|| env::var(CONFIG_PATH_ENV).ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

/// Load the tracker config from an optional file layered under environment
/// overrides. Missing keys fall back to the built-in defaults.
pub fn load_config(path: &str) -> anyhow::Result<TrackerConfig> {
    let settings = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    let config: TrackerConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
