//! Configuration loading from files.
//!
//! This module handles reading and parsing configuration files.

use std::path::Path;

use super::{Config, ConfigError, format_config_error};

/// Default config file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "landfall.yaml";

/// Prefix for environment overrides, e.g. `LANDFALL__SITE__DOMAIN`.
const ENV_PREFIX: &str = "LANDFALL";

impl Config {
    /// Load the config from a file path, applying environment overrides.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let path_str = path
            .as_os_str()
            .to_str()
            .ok_or_else(|| ConfigError::EncodePath(path.to_path_buf()))?;

        let config = config::Config::builder()
            .add_source(config::File::new(path_str, config::FileFormat::Yaml))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let config = config
            .try_deserialize::<Config>()
            .map_err(|e| ConfigError::Validation(format_config_error(&e.to_string())))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from a YAML string (no environment overrides).
    #[cfg(test)]
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| ConfigError::Validation(format_config_error(&e.to_string())))?;
        config.validate()?;
        Ok(config)
    }
}
