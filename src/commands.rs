use std::path::{Path, PathBuf};

use crate::build::base_path_from_config;
use crate::config::{Config, DEFAULT_CONFIG_FILE};

pub mod build;
pub mod check;
pub mod clean;
pub mod serve;

/// Resolve the `--config-file` argument to an absolute path.
fn config_path(arg: Option<&Path>) -> Result<PathBuf, anyhow::Error> {
    let config_path = arg
        .map(Path::to_path_buf)
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.into());
    Ok(if config_path.is_relative() {
        std::env::current_dir()?.join(&config_path)
    } else {
        config_path
    })
}

/// Load the config and the base path that relative paths resolve against.
fn load_config(arg: Option<&Path>) -> Result<(Config, PathBuf, PathBuf), anyhow::Error> {
    let config_path = config_path(arg)?;
    let config = Config::load_from_file(&config_path)?;
    let base_path = base_path_from_config(&config_path);
    Ok((config, base_path, config_path))
}
