//! Dispatcher error types

use contracts::{ContractError, EndpointTarget};
use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// A reporter failed to build, start, report or stop
    #[error("reporter for '{target}' failed: {source}")]
    Reporter {
        target: String,
        #[source]
        source: ContractError,
    },

    /// Target already has an active reporter
    #[error("reporter for '{target}' is already active")]
    DuplicateTarget { target: String },

    /// Other contract error
    #[error("dispatcher error: {0}")]
    Contract(#[from] ContractError),
}

impl DispatcherError {
    /// Attach target context to a reporter error
    pub fn reporter(target: &EndpointTarget, source: ContractError) -> Self {
        Self::Reporter {
            target: target.to_string(),
            source,
        }
    }

    /// Create a duplicate target error
    pub fn duplicate_target(target: &EndpointTarget) -> Self {
        Self::DuplicateTarget {
            target: target.to_string(),
        }
    }
}
