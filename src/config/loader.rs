/// Configuration loader
use std::fs;
use std::path::{Path, PathBuf};

use super::schema::Config;
use crate::error::ConfigError;

/// Path of the adjacent config file for the running executable
/// Named: <executable>.config (e.g., "license-verify.config")
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let exe_path = std::env::current_exe().map_err(|source| ConfigError::Io {
        path: PathBuf::from("<current executable>"),
        source,
    })?;

    let mut config_path = exe_path.into_os_string();
    config_path.push(".config");
    Ok(PathBuf::from(config_path))
}

/// Load configuration from the adjacent .config file
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&default_config_path()?)
}

/// Load and validate configuration from an explicit JSON file
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config_content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config: Config = serde_json::from_str(&config_content)?;
    config.validate()?;

    Ok(config)
}
