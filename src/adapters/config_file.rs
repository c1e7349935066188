//! JSON configuration file adapter.
//!
//! Implements [`ConfigPort`] over a JSON document on the log volume
//! (`/sd/logger.json` by default), so a deployment can be retuned by
//! editing the card.  Every field is optional; missing ones take their
//! defaults.  Content is validated on load and before save.

use std::io;
use std::path::PathBuf;

use log::info;

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::LoggerConfig;

pub const DEFAULT_CONFIG_PATH: &str = "/sd/logger.json";

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Parse and validate a configuration document.
pub fn parse(bytes: &[u8]) -> Result<LoggerConfig, ConfigError> {
    let config: LoggerConfig = serde_json::from_slice(bytes).map_err(|_| ConfigError::Corrupted)?;
    config.validate()?;
    Ok(config)
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<LoggerConfig, ConfigError> {
        let bytes = std::fs::read(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::IoError,
        })?;
        let config = parse(&bytes)?;
        info!("Config: loaded {}", self.path.display());
        Ok(config)
    }

    fn save(&self, config: &LoggerConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let json = serde_json::to_vec_pretty(config).map_err(|_| ConfigError::Corrupted)?;
        std::fs::write(&self.path, json).map_err(|_| ConfigError::IoError)?;
        info!("Config: saved {}", self.path.display());
        Ok(())
    }
}
