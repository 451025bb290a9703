//! MetricRegistry - named metrics, snapshotted by reporters

use std::sync::Arc;

use contracts::{MetricSnapshot, MetricSource};
use dashmap::DashMap;

use crate::metrics::{Counter, Gauge, Histogram, Meter, Timer};

/// Thread-safe registry of named metrics
#[derive(Default)]
pub struct MetricRegistry {
    counters: DashMap<String, Arc<Counter>>,
    gauges: DashMap<String, Arc<Gauge>>,
    histograms: DashMap<String, Arc<Histogram>>,
    meters: DashMap<String, Arc<Meter>>,
    timers: DashMap<String, Arc<Timer>>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the counter `name`
    pub fn counter(&self, name: &str) -> Arc<Counter> {
        get_or_insert(&self.counters, name)
    }

    /// Get or create the gauge `name`
    pub fn gauge(&self, name: &str) -> Arc<Gauge> {
        get_or_insert(&self.gauges, name)
    }

    /// Get or create the histogram `name`
    pub fn histogram(&self, name: &str) -> Arc<Histogram> {
        get_or_insert(&self.histograms, name)
    }

    /// Get or create the meter `name`
    pub fn meter(&self, name: &str) -> Arc<Meter> {
        get_or_insert(&self.meters, name)
    }

    /// Get or create the timer `name`
    pub fn timer(&self, name: &str) -> Arc<Timer> {
        get_or_insert(&self.timers, name)
    }

    /// Number of registered metrics across all kinds
    pub fn len(&self) -> usize {
        self.counters.len()
            + self.gauges.len()
            + self.histograms.len()
            + self.meters.len()
            + self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn get_or_insert<T: Default>(map: &DashMap<String, Arc<T>>, name: &str) -> Arc<T> {
    if let Some(existing) = map.get(name) {
        return Arc::clone(existing.value());
    }
    map.entry(name.to_string())
        .or_insert_with(|| Arc::new(T::default()))
        .value()
        .clone()
}

impl MetricSource for MetricRegistry {
    /// All metrics, sorted by name
    fn snapshot(&self) -> Vec<(String, MetricSnapshot)> {
        let mut samples = Vec::with_capacity(self.len());

        for entry in self.counters.iter() {
            samples.push((entry.key().clone(), MetricSnapshot::Counter(entry.value().get())));
        }
        for entry in self.gauges.iter() {
            samples.push((entry.key().clone(), MetricSnapshot::Gauge(entry.value().get())));
        }
        for entry in self.histograms.iter() {
            samples.push((
                entry.key().clone(),
                MetricSnapshot::Histogram(entry.value().snapshot()),
            ));
        }
        for entry in self.meters.iter() {
            samples.push((entry.key().clone(), MetricSnapshot::Meter(entry.value().snapshot())));
        }
        for entry in self.timers.iter() {
            samples.push((entry.key().clone(), MetricSnapshot::Timer(entry.value().snapshot())));
        }

        samples.sort_by(|a, b| a.0.cmp(&b.0));
        samples
    }
}
