//! Configuration for the swap desk

use matching_core::MatchingConfig;
use serde::{Deserialize, Serialize};

/// Swap desk configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Matching limits
    pub matching: MatchingConfig,

    /// Store configuration
    pub store: StoreConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "swap-matcher".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            matching: MatchingConfig::default(),
            store: StoreConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Largest candidate pool handed to the cycle search (0 = unbounded)
    pub max_pool_size: usize,

    /// Narrow the pool to organizationally compatible requests first
    pub prefilter_pool: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_pool_size: 5000,
            prefilter_pool: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Emit JSON log lines
    pub json: bool,
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.matching.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields from `SWAP_*` environment variables
    pub fn apply_env(&mut self) -> crate::Result<()> {
        self.matching.apply_env()?;

        if let Ok(size) = std::env::var("SWAP_MAX_POOL_SIZE") {
            self.store.max_pool_size = size
                .parse()
                .map_err(|e| crate::Error::Config(format!("SWAP_MAX_POOL_SIZE: {}", e)))?;
        }

        if let Ok(json) = std::env::var("SWAP_LOG_JSON") {
            self.logging.json = matches!(json.as_str(), "1" | "true" | "yes");
        }

        Ok(())
    }
}
