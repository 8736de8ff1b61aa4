//! JSON file configuration adapter.
//!
//! Implements [`ConfigPort`] over a JSON document.  Missing fields keep
//! their defaults; the merged result is validated before it is returned.

use std::io::ErrorKind;
use std::path::PathBuf;

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::ServoConfig;

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the file, or the defaults if it does not exist.
    pub fn load_or_default(&self) -> Result<ServoConfig, ConfigError> {
        match self.load() {
            Err(ConfigError::NotFound) => {
                info!("No config at {}, using defaults", self.path.display());
                Ok(ServoConfig::default())
            }
            other => other,
        }
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<ServoConfig, ConfigError> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                ConfigError::NotFound
            } else {
                warn!("Cannot read {}: {}", self.path.display(), e);
                ConfigError::IoError
            }
        })?;

        let config: ServoConfig = serde_json::from_str(&text).map_err(|e| {
            warn!("Config {} is corrupted: {}", self.path.display(), e);
            ConfigError::Corrupted
        })?;

        config.validate()?;
        info!("Loaded config from {}", self.path.display());
        Ok(config)
    }
}
