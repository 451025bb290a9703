//! Layered error definitions
//!
//! Categorized by source: config / reporter / transport

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// Predicate pattern failed to compile
    #[error("invalid predicate pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    // ===== Reporter Errors =====
    /// Reporter construction error
    #[error("failed to build reporter for '{target}': {message}")]
    ReporterBuild { target: String, message: String },

    /// Reporter start error
    #[error("failed to start reporter for '{target}': {message}")]
    ReporterStart { target: String, message: String },

    // ===== Transport Errors =====
    /// Transport connection error
    #[error("transport '{transport}' connection error: {message}")]
    TransportConnection { transport: String, message: String },

    /// Transport send error
    #[error("transport '{transport}' send error: {message}")]
    TransportSend { transport: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create invalid pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create reporter build error
    pub fn reporter_build(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ReporterBuild {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Create reporter start error
    pub fn reporter_start(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ReporterStart {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Create transport connection error
    pub fn transport_connection(
        transport: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::TransportConnection {
            transport: transport.into(),
            message: message.into(),
        }
    }

    /// Create transport send error
    pub fn transport_send(transport: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportSend {
            transport: transport.into(),
            message: message.into(),
        }
    }
}
