//! Runtime configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty document is a valid config:
//!
//! ```toml
//! [read]
//! default_timeout_ms = 100
//!
//! [descriptors]
//! policy = "device"      # or "placeholder"
//! max_chars = 255
//!
//! [log]
//! filter = "mjc3=info"
//! ```
//!
//! The device identity is not configurable; it is fixed at [`DeviceIdentity::MJC3`](crate::DeviceIdentity::MJC3).

use crate::poll::DEFAULT_TIMEOUT_MS;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub read: ReadConfig,
    pub descriptors: DescriptorConfig,
    pub log: LogConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadConfig {
    /// Used by `read` when the caller passes no timeout.
    pub default_timeout_ms: u32,
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Where `info` takes its manufacturer/product/serial strings from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorPolicy {
    /// Query the device; fall back per field when the query fails.
    #[default]
    Device,
    /// Always report the fixed placeholder strings.
    Placeholder,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescriptorConfig {
    pub policy: DescriptorPolicy,
    /// Longest descriptor string accepted, in characters. USB caps these at 126 UTF-16 units.
    pub max_chars: usize,
}

impl Default for DescriptorConfig {
    fn default() -> Self {
        Self {
            policy: DescriptorPolicy::Device,
            max_chars: 255,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "mjc3=info".into(),
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.descriptors.max_chars == 0 {
            return Err(ConfigError::Invalid(
                "descriptors.max_chars must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
