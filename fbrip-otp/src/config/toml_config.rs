//! TOML configuration file I/O
//!
//! Client settings live under a `[client]` table:
//!
//! ```toml
//! [client]
//! base_url = "https://2fa.fb.rip/api/otp/"
//! timeout_ms = 10000
//! ```

use crate::config::ClientConfig;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Complete TOML configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(rename = "client", default)]
    pub client: ClientConfig,
}

impl TomlConfig {
    pub fn new(client: ClientConfig) -> Self {
        Self { client }
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: TomlConfig = toml::from_str(contents)?;
        config.client.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config = Self::from_toml_str(&contents)?;
        debug!(
            path = %path.display(),
            base_url = %config.client.base_url,
            timeout_ms = ?config.client.timeout_ms,
            "Loaded client configuration"
        );
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError {
                message: format!("Failed to create config directory: {}", e),
            })?;
        }

        std::fs::write(path, contents).map_err(|e| ConfigError::IoError {
            message: format!("Failed to write config file: {}", e),
        })?;

        Ok(())
    }

    pub fn client_config(&self) -> &ClientConfig {
        &self.client
    }
}

impl ClientConfig {
    /// Load a client configuration from a TOML file with a `[client]` table
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        TomlConfig::from_file(path).map(|config| config.client)
    }
}
