//! Reporter self-metrics
//!
//! Exported through the `metrics` facade; a no-op until a recorder is
//! installed (see `init_metrics_only`).

use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};

/// Register metric descriptions with the installed recorder
pub fn describe_metrics() {
    describe_counter!(
        "tsdb_fanout_reporter_enable_total",
        "Reporter enable attempts per target and status"
    );
    describe_gauge!("tsdb_fanout_active_reporters", "Reporters currently running");
    describe_counter!("tsdb_fanout_reports_total", "Manual reports per status");
    describe_histogram!(
        "tsdb_fanout_report_latency_ms",
        Unit::Milliseconds,
        "Latency of manual reports across all targets"
    );
    describe_gauge!(
        "tsdb_fanout_reporter_reports",
        "Successful reports of one reporter"
    );
    describe_gauge!(
        "tsdb_fanout_reporter_failures",
        "Failed reports of one reporter"
    );
    describe_gauge!(
        "tsdb_fanout_reporter_points_sent",
        "Data points handed to the transport by one reporter"
    );
}

fn status(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

/// 记录单个 target 的 enable 结果
pub fn record_reporter_enabled(target: &str, success: bool) {
    counter!(
        "tsdb_fanout_reporter_enable_total",
        "target" => target.to_string(),
        "status" => status(success)
    )
    .increment(1);
}

/// 记录当前运行中的 reporter 数量
pub fn record_active_reporters(count: usize) {
    gauge!("tsdb_fanout_active_reporters").set(count as f64);
}

/// 记录一次手动上报
pub fn record_report(success: bool, latency: Duration) {
    counter!("tsdb_fanout_reports_total", "status" => status(success)).increment(1);
    histogram!("tsdb_fanout_report_latency_ms").record(latency.as_secs_f64() * 1000.0);
}

/// 记录单个 reporter 的累计计数
pub fn record_reporter_counters(target: &str, reports: u64, failures: u64, points_sent: u64) {
    let target = target.to_string();
    gauge!("tsdb_fanout_reporter_reports", "target" => target.clone()).set(reports as f64);
    gauge!("tsdb_fanout_reporter_failures", "target" => target.clone()).set(failures as f64);
    gauge!("tsdb_fanout_reporter_points_sent", "target" => target).set(points_sent as f64);
}

/// 手动上报统计聚合器
///
/// 在内存中聚合，进程退出时输出摘要。
#[derive(Debug, Clone, Default)]
pub struct ReportStatsAggregator {
    total_reports: u64,
    failed_reports: u64,
    latency_ms: RunningStats,
}

impl ReportStatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次上报 (同时写入 metrics facade)
    pub fn update(&mut self, success: bool, latency: Duration) {
        self.total_reports += 1;
        if !success {
            self.failed_reports += 1;
        }
        self.latency_ms.push(latency.as_secs_f64() * 1000.0);
        record_report(success, latency);
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            total_reports: self.total_reports,
            failed_reports: self.failed_reports,
            failure_rate: if self.total_reports > 0 {
                self.failed_reports as f64 / self.total_reports as f64 * 100.0
            } else {
                0.0
            },
            latency_ms: StatsSummary::from(&self.latency_ms),
        }
    }
}

/// 上报摘要
#[derive(Debug, Clone, Default)]
pub struct ReportSummary {
    pub total_reports: u64,
    pub failed_reports: u64,
    pub failure_rate: f64,
    pub latency_ms: StatsSummary,
}

impl std::fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Manual reports: {}", self.total_reports)?;
        writeln!(
            f,
            "Failed: {} ({:.2}%)",
            self.failed_reports, self.failure_rate
        )?;
        write!(f, "Latency (ms): {}", self.latency_ms)
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            return;
        }

        self.min = self.min.min(value);
        self.max = self.max.max(value);
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        match self.count {
            0 | 1 => 0.0,
            n => self.m2 / (n - 1) as f64,
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
