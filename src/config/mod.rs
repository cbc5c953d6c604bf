//! Configuration loading and types for landfall.
//!
//! This module handles all aspects of configuration:
//! - Type definitions for config structures (`types`)
//! - Loading configs from files and the environment (`load`)
//!
//! The loaded [`Config`] is an explicit value: commands construct it once
//! and pass it by reference into the builder.

mod load;
mod types;

use std::path::PathBuf;

pub use load::DEFAULT_CONFIG_FILE;
pub use types::{Config, LinksConfig, MarkdownConfig, ResolvedPaths, WatchConfig};

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to encode config file path as a unicode string: {0}")]
    EncodePath(PathBuf),

    #[error("failed to load config: {0}")]
    Load(#[from] config::ConfigError),

    #[error("{0}")]
    Validation(String),
}

impl Config {
    /// Check invariants serde cannot express.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.site.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "invalid config: 'site.name' must not be empty".to_string(),
            ));
        }
        if self.site.domain.trim().is_empty() {
            return Err(ConfigError::Validation(
                "invalid config: 'site.domain' must not be empty (it is written to CNAME)"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Turn a deserialization error into a message with actionable guidance.
fn format_config_error(msg: &str) -> String {
    if msg.contains("missing field `site`") {
        return "invalid config: 'site' section is required\n\nExample:\n  site:\n    name: Summarum\n    domain: summarum.app".to_string();
    }
    if msg.contains("missing field `name`") {
        return "invalid config: 'site.name' is required".to_string();
    }
    if msg.contains("missing field `domain`") {
        return "invalid config: 'site.domain' is required (it is written to CNAME)".to_string();
    }

    format!("invalid config: {msg}")
}
