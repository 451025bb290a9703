//! PointFormatter - registry snapshot to data points
//!
//! Applies the inclusion filter, the name prefix, and rate/duration unit
//! conversion, then expands each metric into one point per statistic.

use std::collections::BTreeMap;
use std::sync::Arc;

use contracts::{
    DataPoint, HistogramSnapshot, MeterSnapshot, MetricFilter, MetricSnapshot, ReporterOptions,
    TimeUnit,
};

/// Formats snapshots for one reporter
#[derive(Clone)]
pub struct PointFormatter {
    prefix: String,
    rate_unit: TimeUnit,
    duration_unit: TimeUnit,
    filter: Arc<dyn MetricFilter>,
    tags: BTreeMap<String, String>,
}

impl PointFormatter {
    pub fn new(options: &ReporterOptions) -> Self {
        Self {
            prefix: options.prefix.clone(),
            rate_unit: options.rate_unit,
            duration_unit: options.duration_unit,
            filter: Arc::clone(&options.filter),
            tags: options.tags.clone(),
        }
    }

    /// Name with the prefix applied (`prefix.name`)
    pub fn full_name(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.prefix, name)
        }
    }

    /// Convert every metric that passes the filter into data points
    pub fn format(&self, samples: &[(String, MetricSnapshot)], timestamp: i64) -> Vec<DataPoint> {
        let mut points = Vec::new();
        for (name, snapshot) in samples {
            if !self.filter.matches(name, snapshot.kind()) {
                continue;
            }
            let mut out = PointSink {
                base: self.full_name(name),
                timestamp,
                tags: &self.tags,
                points: &mut points,
            };
            match snapshot {
                MetricSnapshot::Counter(count) => out.push("count", *count as f64),
                MetricSnapshot::Gauge(value) => out.push("value", *value),
                MetricSnapshot::Histogram(hist) => push_histogram(&mut out, hist, true, |v| v),
                MetricSnapshot::Meter(meter) => self.push_meter(&mut out, meter),
                MetricSnapshot::Timer(timer) => {
                    self.push_meter(&mut out, &timer.rates);
                    let unit = self.duration_unit;
                    // count already emitted from the meter
                    push_histogram(&mut out, &timer.durations, false, |nanos| {
                        unit.convert_duration(nanos)
                    });
                }
            }
        }
        points
    }

    fn push_meter(&self, out: &mut PointSink<'_>, meter: &MeterSnapshot) {
        out.push("count", meter.count as f64);
        out.push("mean_rate", self.rate_unit.convert_rate(meter.mean_rate));
        out.push("m1_rate", self.rate_unit.convert_rate(meter.m1_rate));
        out.push("m5_rate", self.rate_unit.convert_rate(meter.m5_rate));
        out.push("m15_rate", self.rate_unit.convert_rate(meter.m15_rate));
    }
}

/// Histogram statistics; `convert` applies to values, not the count
fn push_histogram(
    out: &mut PointSink<'_>,
    hist: &HistogramSnapshot,
    with_count: bool,
    convert: impl Fn(f64) -> f64,
) {
    if with_count {
        out.push("count", hist.count as f64);
    }
    out.push("min", convert(hist.min));
    out.push("max", convert(hist.max));
    out.push("mean", convert(hist.mean));
    out.push("stddev", convert(hist.std_dev));
    out.push("p50", convert(hist.p50));
    out.push("p75", convert(hist.p75));
    out.push("p95", convert(hist.p95));
    out.push("p98", convert(hist.p98));
    out.push("p99", convert(hist.p99));
    out.push("p999", convert(hist.p999));
}

struct PointSink<'a> {
    base: String,
    timestamp: i64,
    tags: &'a BTreeMap<String, String>,
    points: &'a mut Vec<DataPoint>,
}

impl PointSink<'_> {
    fn metric_name(&self, suffix: &str) -> String {
        format!("{}.{}", self.base, suffix)
    }

    fn push(&mut self, suffix: &str, value: f64) {
        self.points.push(DataPoint {
            metric: self.metric_name(suffix),
            timestamp: self.timestamp,
            value,
            tags: self.tags.clone(),
        });
    }
}
