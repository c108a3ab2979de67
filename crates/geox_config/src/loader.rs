//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{input_text, ProjectConfig};
use std::path::Path;

/// File name looked up in the project directory.
pub const CONFIG_FILE_NAME: &str = "geox.toml";

/// Loads and validates a `geox.toml` configuration from a project directory.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE_NAME);
    let content = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
        path: config_path.clone(),
        source,
    })?;
    load_config_from_str(&content)
}

/// Parses and validates a `geox.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig = toml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates the cache location and that every input has a parameter form.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.cache.enabled && config.cache.path.trim().is_empty() {
        return Err(ConfigError::EmptyCachePath);
    }
    for (name, value) in &config.inputs {
        if input_text(value).is_none() {
            return Err(ConfigError::UnsupportedInput { name: name.clone() });
        }
    }
    Ok(())
}
