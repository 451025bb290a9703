//! ReporterDispatcher - fan-out of one metric source to many endpoints

use std::sync::Arc;

use contracts::{EndpointTarget, MetricSource, MetricsReporter, ReporterConfig, ReporterOptions};
use tracing::{debug, error, info, instrument, warn};

use crate::error::DispatcherError;
use crate::factory::{ReporterFactory, TransportFactory};
use crate::handle::ReporterHandle;
use crate::metrics::MetricsSnapshot;
use crate::transports::ConfiguredTransport;

/// Lifecycle of a dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    /// `enable` not called yet
    Unconfigured,
    /// At least one `enable` ran (possibly with zero reporters started)
    Active,
    /// `stop` ran; all reporters released
    Stopped,
}

/// Owns one reporter per endpoint target
///
/// `enable`, `report` and `stop` are meant to be driven from a single control
/// task. Dropping the dispatcher drops its reporters, which ends their workers.
pub struct ReporterDispatcher<F: ReporterFactory = TransportFactory> {
    factory: F,
    reporters: Vec<F::Reporter>,
    state: DispatcherState,
}

impl<F: ReporterFactory> ReporterDispatcher<F> {
    /// Create a dispatcher building reporters with `factory`
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            reporters: Vec::new(),
            state: DispatcherState::Unconfigured,
        }
    }

    pub fn state(&self) -> DispatcherState {
        self.state
    }

    /// Active reporters, in the order they were started
    pub fn reporters(&self) -> &[F::Reporter] {
        &self.reporters
    }

    /// Targets with an active reporter
    pub fn active_targets(&self) -> Vec<&EndpointTarget> {
        self.reporters.iter().map(|r| r.target()).collect()
    }

    pub fn len(&self) -> usize {
        self.reporters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reporters.is_empty()
    }

    /// Build and start one reporter per target
    ///
    /// Every target is attempted; a target that fails is logged and skipped.
    /// Returns true only if all targets started.
    #[instrument(
        name = "dispatcher_enable",
        skip(self, source, targets, options),
        fields(targets = targets.len())
    )]
    pub async fn enable(
        &mut self,
        source: Arc<dyn MetricSource>,
        targets: &[EndpointTarget],
        options: &ReporterOptions,
    ) -> bool {
        if self.state == DispatcherState::Stopped {
            error!("Dispatcher already stopped, not enabling reporters");
            return false;
        }
        self.state = DispatcherState::Active;

        if targets.is_empty() {
            error!("No endpoint targets configured");
            return false;
        }

        let mut failures = 0usize;
        for target in targets {
            match self.start_reporter(&source, target, options).await {
                Ok(reporter) => {
                    info!(target = %target, period = ?options.period(), "Reporter enabled");
                    self.reporters.push(reporter);
                }
                Err(DispatcherError::DuplicateTarget { .. }) => {
                    warn!(target = %target, "Target already has a reporter, skipping");
                    failures += 1;
                }
                Err(e) => {
                    error!(target = %target, error = %e, "Failed to enable reporter");
                    failures += 1;
                }
            }
        }

        debug!(
            active = self.reporters.len(),
            failures, "Dispatcher enable finished"
        );
        failures == 0
    }

    async fn start_reporter(
        &self,
        source: &Arc<dyn MetricSource>,
        target: &EndpointTarget,
        options: &ReporterOptions,
    ) -> Result<F::Reporter, DispatcherError> {
        if self.reporters.iter().any(|r| r.target() == target) {
            return Err(DispatcherError::duplicate_target(target));
        }

        let base_url = target.base_url();
        debug!(target = %target, base_url = %base_url, "Enabling reporter");

        let mut reporter = self
            .factory
            .build(target, &base_url, Arc::clone(source), options)
            .await
            .map_err(|e| DispatcherError::reporter(target, e))?;

        if let Err(e) = reporter.start(options.period()) {
            // Release whatever the factory acquired
            if let Err(stop_err) = reporter.stop().await {
                debug!(target = %target, error = %stop_err, "Cleanup after failed start");
            }
            return Err(DispatcherError::reporter(target, e));
        }

        Ok(reporter)
    }

    /// Report immediately on every active reporter, in start order
    ///
    /// The first failing reporter aborts the loop and its error is returned.
    #[instrument(name = "dispatcher_report", skip(self), fields(reporters = self.reporters.len()))]
    pub async fn report(&self) -> Result<(), DispatcherError> {
        for reporter in &self.reporters {
            reporter
                .report()
                .await
                .map_err(|e| DispatcherError::reporter(reporter.target(), e))?;
        }
        Ok(())
    }

    /// Stop and release every reporter, in start order
    ///
    /// Best effort: a reporter that fails to stop is logged and skipped.
    /// Calling `stop` again is a no-op.
    #[instrument(name = "dispatcher_stop", skip(self), fields(reporters = self.reporters.len()))]
    pub async fn stop(&mut self) {
        for mut reporter in self.reporters.drain(..) {
            if let Err(e) = reporter.stop().await {
                warn!(target = %reporter.target(), error = %e, "Reporter stop failed");
            }
        }
        if self.state != DispatcherState::Stopped {
            info!("Dispatcher stopped");
        }
        self.state = DispatcherState::Stopped;
    }
}

impl ReporterDispatcher<TransportFactory> {
    /// Get metrics for all reporters
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.reporters
            .iter()
            .map(|r| (r.target().to_string(), r.metrics().snapshot()))
            .collect()
    }
}

/// Convenience function to create a dispatcher using the configured transport
pub fn create_dispatcher(config: &ReporterConfig) -> ReporterDispatcher<TransportFactory> {
    ReporterDispatcher::new(TransportFactory::new(config.transport.clone()))
}

/// Active reporter type of the default dispatcher
pub type DefaultReporter = ReporterHandle<ConfiguredTransport>;
