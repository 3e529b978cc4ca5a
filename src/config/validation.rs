//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that template and writable folders exist
//! - Check that the writable folder accepts writes
//! - Validate the bind address and log level
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Runs before config is accepted into the system

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::RunnerConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address `{0}`")]
    InvalidBindAddress(String),

    #[error("template directory {} does not exist", .0.display())]
    MissingTemplateDir(PathBuf),

    #[error("folder {} does not exist", .0.display())]
    MissingWritableDir(PathBuf),

    #[error("folder {} is not writable", .0.display())]
    FolderNotWritable(PathBuf),

    #[error("unknown log level `{0}`")]
    UnknownLogLevel(String),

    #[error("invalid metrics address `{0}`")]
    InvalidMetricsAddress(String),
}

pub fn validate_config(config: &RunnerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if !config.templates.dir.is_dir() {
        errors.push(ValidationError::MissingTemplateDir(config.templates.dir.clone()));
    }

    let writable = &config.templates.writable_dir;
    if !writable.is_dir() {
        errors.push(ValidationError::MissingWritableDir(writable.clone()));
    } else if !is_writable(writable) {
        errors.push(ValidationError::FolderNotWritable(writable.clone()));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Probe by creating and removing a file.
fn is_writable(dir: &Path) -> bool {
    let probe = dir.join(format!(".write-probe-{}", std::process::id()));
    match fs::write(&probe, b"") {
        Ok(()) => {
            let _ = fs::remove_file(&probe);
            true
        }
        Err(_) => false,
    }
}
