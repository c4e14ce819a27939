//! Runtime settings of a [`LendingSystem`](crate::lifecycle::LendingSystem).

use ledger_framework::DEFAULT_MAX_RETRIES;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming a JSON settings file.
pub const CONFIG_ENV: &str = "CAR_LEDGER_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Settings with defaults for every field, so a file only names what it changes.
///
/// ```json
/// { "max_commit_retries": 10, "seed_on_start": false }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LendingConfig {
    /// Capacity of the ledger actor's request channel.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Re-executions of a call whose commit hit a read conflict.
    #[serde(default = "default_max_commit_retries")]
    pub max_commit_retries: u32,
    /// Events buffered for each subscriber before the slowest one lags.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
    #[serde(default = "default_seed_on_start")]
    pub seed_on_start: bool,
}

fn default_channel_capacity() -> usize {
    32
}

fn default_max_commit_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_event_capacity() -> usize {
    64
}

fn default_seed_on_start() -> bool {
    true
}

impl Default for LendingConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            max_commit_retries: default_max_commit_retries(),
            event_capacity: default_event_capacity(),
            seed_on_start: default_seed_on_start(),
        }
    }
}

impl LendingConfig {
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn with_max_commit_retries(mut self, retries: u32) -> Self {
        self.max_commit_retries = retries;
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn with_seed_on_start(mut self, seed: bool) -> Self {
        self.seed_on_start = seed;
        self
    }

    /// Reads the file named by `CAR_LEDGER_CONFIG`, or returns the defaults when unset.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Zero capacities would make the tokio channels panic on construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid("channel_capacity must be positive".into()));
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::Invalid("event_capacity must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LendingConfig::default();
        assert_eq!(config.channel_capacity, 32);
        assert_eq!(config.max_commit_retries, 3);
        assert_eq!(config.event_capacity, 64);
        assert!(config.seed_on_start);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: LendingConfig =
            serde_json::from_str(r#"{"max_commit_retries":10,"seed_on_start":false}"#).unwrap();
        assert_eq!(
            config,
            LendingConfig::default()
                .with_max_commit_retries(10)
                .with_seed_on_start(false)
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(serde_json::from_str::<LendingConfig>(r#"{"retries":1}"#).is_err());
    }

    #[test]
    fn test_zero_capacity_invalid() {
        let config = LendingConfig::default().with_channel_capacity(0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        assert!(LendingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("car-ledger-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"event_capacity":8}"#).unwrap();
        let config = LendingConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.event_capacity, 8);
        assert_eq!(config.channel_capacity, 32);

        let missing = LendingConfig::from_file(Path::new("/nonexistent/car-ledger.json"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }
}
