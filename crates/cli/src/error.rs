//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Some endpoints failed to start in strict mode
    #[error("{failed} of {total} endpoints failed to start")]
    PartialStart { failed: usize, total: usize },

    /// Configuration validation failed
    #[error("Configuration validation failed: {path}")]
    InvalidConfig { path: String },
}

impl CliError {
    pub fn config_not_found(path: &std::path::Path) -> Self {
        Self::ConfigNotFound {
            path: path.display().to_string(),
        }
    }

    pub fn partial_start(failed: usize, total: usize) -> Self {
        Self::PartialStart { failed, total }
    }

    pub fn invalid_config(path: &std::path::Path) -> Self {
        Self::InvalidConfig {
            path: path.display().to_string(),
        }
    }
}
