//! Configuration for the matching engine

use serde::{Deserialize, Serialize};

/// Matching configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Longest swap chain to search for
    /// None = bounded only by the pool size
    pub max_cycle_length: Option<usize>,

    /// Maximum chains returned per search (0 = unlimited)
    pub max_cycles: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            max_cycle_length: Some(6),
            max_cycles: 50,
        }
    }
}

impl MatchingConfig {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MatchingConfig = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = MatchingConfig::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields from `SWAP_*` environment variables
    pub fn apply_env(&mut self) -> crate::Result<()> {
        if let Ok(len) = std::env::var("SWAP_MAX_CYCLE_LENGTH") {
            self.max_cycle_length = match len.as_str() {
                "" | "none" => None,
                value => Some(value.parse().map_err(|e| {
                    crate::Error::Config(format!("SWAP_MAX_CYCLE_LENGTH: {}", e))
                })?),
            };
        }

        if let Ok(max) = std::env::var("SWAP_MAX_CYCLES") {
            self.max_cycles = max
                .parse()
                .map_err(|e| crate::Error::Config(format!("SWAP_MAX_CYCLES: {}", e)))?;
        }

        self.validate()
    }

    /// Reject limits that could never produce a chain
    pub fn validate(&self) -> crate::Result<()> {
        if let Some(len) = self.max_cycle_length {
            if len < crate::cycles::MIN_CYCLE_LENGTH {
                return Err(crate::Error::Config(format!(
                    "max_cycle_length {} is below the minimum chain length {}",
                    len,
                    crate::cycles::MIN_CYCLE_LENGTH
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_cycle_length = 4\nmax_cycles = 10").unwrap();

        let config = MatchingConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_cycle_length, Some(4));
        assert_eq!(config.max_cycles, 10);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_cycles = 3").unwrap();

        let config = MatchingConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_cycle_length, MatchingConfig::default().max_cycle_length);
        assert_eq!(config.max_cycles, 3);
    }

    #[test]
    fn test_rejects_short_cycle_limit() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_cycle_length = 2").unwrap();

        assert!(matches!(
            MatchingConfig::from_file(file.path()),
            Err(crate::Error::Config(_))
        ));
    }
}
