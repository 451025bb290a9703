//! LogTransport - logs data points via tracing

use contracts::{ContractError, DataPoint, MetricsTransport};
use tracing::{debug, info, instrument};

/// Transport that logs batches for debugging
pub struct LogTransport {
    name: String,
}

impl LogTransport {
    /// Create a new LogTransport with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_batch(&self, points: &[DataPoint]) {
        info!(
            transport = %self.name,
            points = points.len(),
            timestamp = points.first().map(|p| p.timestamp),
            "Metrics batch"
        );
        for point in points {
            debug!(
                transport = %self.name,
                metric = %point.metric,
                value = point.value,
                "Data point"
            );
        }
    }
}

impl MetricsTransport for LogTransport {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_transport_send",
        skip(self, points),
        fields(transport = %self.name, points = points.len())
    )]
    async fn send(&mut self, points: &[DataPoint]) -> Result<(), ContractError> {
        self.log_batch(points);
        Ok(())
    }

    #[instrument(name = "log_transport_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // Nothing to flush for log transport
        Ok(())
    }

    #[instrument(name = "log_transport_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(transport = %self.name, "LogTransport closed");
        Ok(())
    }
}
