//! MetricsReporter trait and the options every reporter is built with

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::{AllowAll, ContractError, EndpointTarget, MetricFilter, TimeUnit};

/// One live reporter bound to exactly one endpoint.
///
/// Owns its own periodic schedule once started.
#[trait_variant::make(MetricsReporter: Send)]
pub trait LocalMetricsReporter {
    /// Endpoint this reporter sends to
    fn target(&self) -> &EndpointTarget;

    /// Start periodic reporting
    ///
    /// # Errors
    /// Already started, or the period is zero
    fn start(&mut self, period: Duration) -> Result<(), ContractError>;

    /// Report immediately, outside the periodic cadence
    async fn report(&self) -> Result<(), ContractError>;

    /// Stop periodic reporting and release the transport
    ///
    /// Stopping an already stopped reporter is a no-op.
    async fn stop(&mut self) -> Result<(), ContractError>;
}

/// Formatting and scheduling options shared by every reporter of a dispatcher
#[derive(Clone)]
pub struct ReporterOptions {
    /// Unit rates are converted to (events per unit)
    pub rate_unit: TimeUnit,
    /// Unit durations are converted to
    pub duration_unit: TimeUnit,
    /// Metric name prefix (already resolved)
    pub prefix: String,
    /// Compiled inclusion filter
    pub filter: Arc<dyn MetricFilter>,
    /// Reporting period, in `time_unit`
    pub period: u64,
    pub time_unit: TimeUnit,
    /// Static tags attached to every data point
    pub tags: BTreeMap<String, String>,
}

impl ReporterOptions {
    /// Reporting period as a `Duration`
    pub fn period(&self) -> Duration {
        self.time_unit.to_duration(self.period)
    }
}

impl Default for ReporterOptions {
    fn default() -> Self {
        Self {
            rate_unit: TimeUnit::Seconds,
            duration_unit: TimeUnit::Milliseconds,
            prefix: String::new(),
            filter: Arc::new(AllowAll),
            period: 60,
            time_unit: TimeUnit::Seconds,
            tags: BTreeMap::new(),
        }
    }
}

impl fmt::Debug for ReporterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReporterOptions")
            .field("rate_unit", &self.rate_unit)
            .field("duration_unit", &self.duration_unit)
            .field("prefix", &self.prefix)
            .field("period", &self.period)
            .field("time_unit", &self.time_unit)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}
