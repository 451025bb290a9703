//! ReporterHandle - one endpoint reporter with its own periodic worker task

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use contracts::{
    ContractError, EndpointTarget, MetricSource, MetricsReporter, MetricsTransport,
    ReporterOptions,
};
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, instrument};

use crate::format::PointFormatter;
use crate::metrics::ReporterMetrics;

/// State shared by the worker task and manual reports
struct ReporterCore<T> {
    name: String,
    source: Arc<dyn MetricSource>,
    formatter: PointFormatter,
    transport: Mutex<T>,
    metrics: Arc<ReporterMetrics>,
}

impl<T: MetricsTransport> ReporterCore<T> {
    /// Snapshot, format and send once; returns the number of points sent
    async fn report_once(&self) -> Result<usize, ContractError> {
        let samples = self.source.snapshot();
        let points = self.formatter.format(&samples, Utc::now().timestamp());

        if points.is_empty() {
            debug!(reporter = %self.name, "Nothing to report");
            self.metrics.inc_report_count();
            return Ok(0);
        }

        let mut transport = self.transport.lock().await;
        match transport.send(&points).await {
            Ok(()) => {
                self.metrics.inc_report_count();
                self.metrics.add_points_sent(points.len() as u64);
                debug!(reporter = %self.name, points = points.len(), "Reported");
                Ok(points.len())
            }
            Err(e) => {
                self.metrics.inc_failure_count();
                Err(e)
            }
        }
    }
}

struct Worker {
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Handle to a running reporter
///
/// Dropping the handle without `stop` ends the worker at its next wakeup.
pub struct ReporterHandle<T> {
    target: EndpointTarget,
    core: Arc<ReporterCore<T>>,
    worker: Option<Worker>,
    stopped: bool,
}

impl<T: MetricsTransport + 'static> ReporterHandle<T> {
    /// Create a reporter bound to `target`; nothing runs until `start`
    pub fn new(
        target: EndpointTarget,
        source: Arc<dyn MetricSource>,
        options: &ReporterOptions,
        transport: T,
    ) -> Self {
        let core = ReporterCore {
            name: target.to_string(),
            source,
            formatter: PointFormatter::new(options),
            transport: Mutex::new(transport),
            metrics: Arc::new(ReporterMetrics::new()),
        };

        Self {
            target,
            core: Arc::new(core),
            worker: None,
            stopped: false,
        }
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<ReporterMetrics> {
        &self.core.metrics
    }

    /// Whether the periodic worker is running
    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }
}

impl<T: MetricsTransport + 'static> MetricsReporter for ReporterHandle<T> {
    fn target(&self) -> &EndpointTarget {
        &self.target
    }

    fn start(&mut self, period: Duration) -> Result<(), ContractError> {
        let name = &self.core.name;
        if self.stopped {
            return Err(ContractError::reporter_start(name, "reporter was stopped"));
        }
        if self.worker.is_some() {
            return Err(ContractError::reporter_start(name, "reporter already started"));
        }
        if period.is_zero() {
            return Err(ContractError::reporter_start(name, "period must be > 0"));
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ContractError::reporter_start(name, e.to_string()))?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let core = Arc::clone(&self.core);
        let handle = runtime.spawn(async move {
            reporter_worker(core, period, shutdown_rx).await;
        });

        self.worker = Some(Worker {
            shutdown_tx,
            handle,
        });
        Ok(())
    }

    async fn report(&self) -> Result<(), ContractError> {
        self.core.report_once().await.map(|_| ())
    }

    #[instrument(name = "reporter_handle_stop", skip(self), fields(reporter = %self.target))]
    async fn stop(&mut self) -> Result<(), ContractError> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;

        if let Some(worker) = self.worker.take() {
            // Worker may already be gone if it panicked
            let _ = worker.shutdown_tx.send(());
            if let Err(e) = worker.handle.await {
                error!(reporter = %self.target, error = ?e, "Worker task panicked");
            }
        }

        let mut transport = self.core.transport.lock().await;
        let flushed = transport.flush().await;
        let closed = transport.close().await;
        debug!(reporter = %self.target, "ReporterHandle stopped");
        flushed.and(closed)
    }
}

/// Worker task that reports on every tick until shut down
#[instrument(
    name = "reporter_worker_loop",
    skip(core, shutdown_rx),
    fields(reporter = %core.name)
)]
async fn reporter_worker<T: MetricsTransport>(
    core: Arc<ReporterCore<T>>,
    period: Duration,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    debug!(reporter = %core.name, ?period, "Reporter worker started");

    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            // Fires on explicit stop and when the handle is dropped
            _ = &mut shutdown_rx => break,
            _ = ticker.tick() => {
                if let Err(e) = core.report_once().await {
                    error!(reporter = %core.name, error = %e, "Scheduled report failed");
                    // Continue - the next tick may succeed
                }
            }
        }
    }

    debug!(reporter = %core.name, "Reporter worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{DataPoint, MetricSnapshot};
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::time::sleep;

    /// Mock transport for testing
    struct MockTransport {
        sent: Arc<AtomicU64>,
        closed: Arc<AtomicU64>,
        should_fail: bool,
    }

    impl MetricsTransport for MockTransport {
        fn name(&self) -> &str {
            "mock"
        }

        async fn send(&mut self, _points: &[DataPoint]) -> Result<(), ContractError> {
            if self.should_fail {
                return Err(ContractError::transport_send("mock", "mock failure"));
            }
            self.sent.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), ContractError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), ContractError> {
            self.closed.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    struct StaticSource;

    impl MetricSource for StaticSource {
        fn snapshot(&self) -> Vec<(String, MetricSnapshot)> {
            vec![("jobs".to_string(), MetricSnapshot::Counter(1))]
        }
    }

    type Counters = (Arc<AtomicU64>, Arc<AtomicU64>);

    fn make_handle(should_fail: bool) -> (ReporterHandle<MockTransport>, Counters) {
        let sent = Arc::new(AtomicU64::new(0));
        let closed = Arc::new(AtomicU64::new(0));
        let transport = MockTransport {
            sent: Arc::clone(&sent),
            closed: Arc::clone(&closed),
            should_fail,
        };
        let handle = ReporterHandle::new(
            EndpointTarget::new("tsdb1.internal", 4242),
            Arc::new(StaticSource),
            &ReporterOptions::default(),
            transport,
        );
        (handle, (sent, closed))
    }

    #[tokio::test]
    async fn test_manual_report() {
        let (handle, (sent, _)) = make_handle(false);

        handle.report().await.unwrap();
        handle.report().await.unwrap();

        assert_eq!(sent.load(Ordering::Relaxed), 2);
        assert_eq!(handle.metrics().report_count(), 2);
        assert_eq!(handle.metrics().points_sent(), 2);
    }

    #[tokio::test]
    async fn test_report_failure_propagates() {
        let (handle, _) = make_handle(true);

        let result = handle.report().await;
        assert!(matches!(result, Err(ContractError::TransportSend { .. })));
        assert_eq!(handle.metrics().failure_count(), 1);
    }

    #[tokio::test]
    async fn test_periodic_reports() {
        let (mut handle, (sent, _)) = make_handle(false);

        handle.start(Duration::from_millis(10)).unwrap();
        assert!(handle.is_running());
        sleep(Duration::from_millis(100)).await;
        handle.stop().await.unwrap();

        assert!(sent.load(Ordering::Relaxed) >= 2);
    }

    #[tokio::test]
    async fn test_periodic_failure_isolation() {
        let (mut handle, _) = make_handle(true);

        handle.start(Duration::from_millis(10)).unwrap();
        sleep(Duration::from_millis(60)).await;

        // Worker keeps running after failed ticks
        assert!(handle.metrics().failure_count() >= 2);
        handle.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_start_twice_fails() {
        let (mut handle, _) = make_handle(false);

        handle.start(Duration::from_secs(60)).unwrap();
        let result = handle.start(Duration::from_secs(60));
        assert!(matches!(result, Err(ContractError::ReporterStart { .. })));

        handle.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_zero_period_rejected() {
        let (mut handle, _) = make_handle(false);
        assert!(handle.start(Duration::ZERO).is_err());
        assert!(!handle.is_running());
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let (mut handle, (_, closed)) = make_handle(false);

        handle.start(Duration::from_secs(60)).unwrap();
        handle.stop().await.unwrap();
        handle.stop().await.unwrap();

        assert!(!handle.is_running());
        assert_eq!(closed.load(Ordering::Relaxed), 1);
        assert!(handle.start(Duration::from_secs(60)).is_err());
    }

    #[test]
    fn test_start_outside_runtime_fails() {
        let (mut handle, _) = make_handle(false);
        let result = handle.start(Duration::from_secs(1));
        assert!(matches!(result, Err(ContractError::ReporterStart { .. })));
    }
}
