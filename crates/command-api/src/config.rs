//! Service configuration via `command_api.toml`
//!
//! Every key has a default, so an empty file (or no file at all) gives a working in-memory
//! service. The binary takes the file path from `COMMAND_API_CONFIG`.

use crate::validation::FieldLimits;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Conventional config file name.
pub const CONFIG_FILE_NAME: &str = "command_api.toml";

/// Environment variable holding the config file path.
pub const CONFIG_ENV_VAR: &str = "COMMAND_API_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Where committed commands are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON file holding the table. Absent means an in-memory table that is lost on exit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Configuration loaded from `command_api.toml`.
///
/// # Example
///
/// ```toml
/// channel_capacity = 32
///
/// [limits]
/// how_to = 250
/// platform = 250
/// command_line = 250
///
/// [storage]
/// path = "commands.json"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandApiConfig {
    /// Capacity of the store actor's request channel.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Maximum field lengths, in characters.
    #[serde(default)]
    pub limits: FieldLimits,
    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_channel_capacity() -> usize {
    32
}

impl Default for CommandApiConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            limits: FieldLimits::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl CommandApiConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Command API configuration

# Capacity of the store actor's request channel (default: 32).
channel_capacity = 32

# Maximum field lengths in characters (default: 250 each).
[limits]
how_to = 250
platform = 250
command_line = 250

# Committed commands are written to this JSON file.
# Leave unset to keep them in memory only.
[storage]
# path = "commands.json"
"#
    }

    /// Parses config from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or holds invalid values.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file named by `COMMAND_API_CONFIG`, or the defaults when it is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    /// Rejects values the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "channel_capacity must be greater than 0".to_string(),
            ));
        }
        let limits = &self.limits;
        if limits.how_to == 0 || limits.platform == 0 || limits.command_line == 0 {
            return Err(ConfigError::Invalid(
                "field limits must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
