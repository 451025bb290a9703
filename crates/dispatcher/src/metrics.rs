//! Reporter metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for a single reporter
#[derive(Debug, Default)]
pub struct ReporterMetrics {
    /// Total successful reports
    report_count: AtomicU64,
    /// Total failed reports
    failure_count: AtomicU64,
    /// Total data points handed to the transport
    points_sent: AtomicU64,
}

impl ReporterMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total report count
    pub fn report_count(&self) -> u64 {
        self.report_count.load(Ordering::Relaxed)
    }

    /// Increment report count
    pub fn inc_report_count(&self) {
        self.report_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get failure count
    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    /// Increment failure count
    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get points sent
    pub fn points_sent(&self) -> u64 {
        self.points_sent.load(Ordering::Relaxed)
    }

    /// Add to points sent
    pub fn add_points_sent(&self, n: u64) {
        self.points_sent.fetch_add(n, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            report_count: self.report_count(),
            failure_count: self.failure_count(),
            points_sent: self.points_sent(),
        }
    }
}

/// Snapshot of reporter metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub report_count: u64,
    pub failure_count: u64,
    pub points_sent: u64,
}
