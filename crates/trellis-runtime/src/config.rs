//! Configuration loading.
//!
//! Configuration is layered with figment. Priority, lowest to highest:
//!
//! 1. Built-in defaults
//! 2. `trellis.toml` in the working directory
//! 3. Environment variables with the `TRELLIS_` prefix
//!
//! Environment variables use `__` as the section separator:
//! `TRELLIS_BOT__PREFIX="$"` sets `bot.prefix`, `TRELLIS_BOT__INTENTS=true`
//! sets `bot.intents`, `TRELLIS_LOGGING__LEVEL=debug` sets `logging.level`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default configuration file name.
pub const CONFIG_FILE: &str = "trellis.toml";

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The layered sources could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),

    /// The loaded values are structurally valid but semantically wrong.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrellisConfig {
    /// Bot behavior settings.
    #[serde(default)]
    pub bot: BotSection,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Bot behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotSection {
    /// Command prefix.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Whether reply-wait intents are enabled.
    #[serde(default)]
    pub intents: bool,
}

impl Default for BotSection {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            intents: false,
        }
    }
}

fn default_prefix() -> String {
    "!".to_string()
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Base log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Optional log file. Unset means stdout.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Per-module level overrides, e.g. `trellis_framework = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_path: None,
            filters: HashMap::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TrellisConfig {
    /// Loads configuration from the default file and the environment.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(CONFIG_FILE)
    }

    /// Loads configuration from a specific TOML file and the environment.
    /// A missing file is not an error; the other layers still apply.
    pub fn load_from<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("TRELLIS_").split("__"))
            .extract()?;
        config.validate()?;

        debug!(
            prefix = %config.bot.prefix,
            intents = config.bot.intents,
            level = %config.logging.level,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Validates semantic constraints the schema cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.bot.prefix.is_empty() {
            return Err(ConfigError::Validation(
                "bot.prefix must not be empty".into(),
            ));
        }
        if !VALID_LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::Validation(format!(
                "invalid log level '{}', expected one of {:?}",
                self.logging.level, VALID_LOG_LEVELS
            )));
        }
        Ok(())
    }
}
