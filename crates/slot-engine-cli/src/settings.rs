//! Layered settings: built-in defaults, an optional TOML file, then `SLOTS_*`
//! environment variables (`SLOTS_ENGINE__MAX_WINDOW_DAYS=90`).

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use slot_engine::finder::DEFAULT_MAX_WINDOW_DAYS;
use slot_engine::{DstPolicy, EngineConfig};

/// File looked up in the working directory when `--config` is not given.
const DEFAULT_CONFIG_NAME: &str = "slots";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG`.
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// IANA zone used to add UTC instants to `find` output.
    #[serde(default)]
    pub timezone: Option<String>,
    pub dst_policy: DstPolicy,
}

impl Settings {
    /// Load settings, reading `path` if given (it must then exist).
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or a value has the wrong type.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let file = match path {
            Some(path) => File::with_name(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        Config::builder()
            .set_default("engine.max_window_days", i64::from(DEFAULT_MAX_WINDOW_DAYS))?
            .set_default("engine.validation", "strict")?
            .set_default("logging.level", "warn")?
            .set_default("output.dst_policy", "wall_clock")?
            .add_source(file)
            .add_source(
                Environment::with_prefix("SLOTS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read settings")?
            .try_deserialize::<Settings>()
            .context("Invalid settings")
    }
}
