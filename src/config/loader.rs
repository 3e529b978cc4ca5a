//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml::Table;

use crate::config::app::AppConfig;
use crate::config::schema::RunnerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Runner settings plus the raw file for application lookups.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub runner: RunnerConfig,
    pub app: AppConfig,
}

/// Parse TOML text without touching the filesystem.
pub fn parse_config(content: &str) -> Result<LoadedConfig, ConfigError> {
    let table: Table = content.parse()?;
    let runner: RunnerConfig = toml::Value::Table(table.clone()).try_into()?;
    Ok(LoadedConfig {
        runner,
        app: AppConfig::new(table),
    })
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&content)?;

    validate_config(&config.runner).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Like [`load_config`], but a missing file yields validated defaults.
pub fn load_or_default(path: &Path) -> Result<LoadedConfig, ConfigError> {
    if path.exists() {
        return load_config(path);
    }
    tracing::warn!(path = %path.display(), "Config file not found, using defaults");
    let config = LoadedConfig::default();
    validate_config(&config.runner).map_err(ConfigError::Validation)?;
    Ok(config)
}
