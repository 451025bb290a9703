//! MetricsTransport trait - reporter output interface
//!
//! Defines the abstract interface for sending data points to one endpoint.

use crate::{ContractError, DataPoint};

/// Data point output trait
///
/// The wire format is entirely up to the implementation.
#[trait_variant::make(MetricsTransport: Send)]
pub trait LocalMetricsTransport {
    /// Transport name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Send one batch of data points
    ///
    /// # Errors
    /// Returns send error (should include context)
    async fn send(&mut self, points: &[DataPoint]) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close transport
    async fn close(&mut self) -> Result<(), ContractError>;
}
