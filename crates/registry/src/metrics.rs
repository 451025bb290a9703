//! Metric primitives: counter, gauge, histogram, meter, timer

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use contracts::{HistogramSnapshot, MeterSnapshot, TimerSnapshot};
use parking_lot::Mutex;

use crate::ewma::{Ewma, TICK_INTERVAL};

/// Number of most recent values a histogram keeps
pub const RESERVOIR_SIZE: usize = 1028;

/// Monotonic-ish signed counter
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicI64,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self, n: i64) {
        self.value.fetch_add(n, Ordering::Relaxed);
    }

    pub fn dec(&self, n: i64) {
        self.value.fetch_sub(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Last-value gauge
#[derive(Debug, Default)]
pub struct Gauge {
    // f64 bits
    value: AtomicU64,
}

impl Gauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, value: f64) {
        self.value.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.value.load(Ordering::Relaxed))
    }
}

/// Distribution over a sliding window of the most recent values
#[derive(Debug)]
pub struct Histogram {
    values: Mutex<VecDeque<f64>>,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self {
            values: Mutex::new(VecDeque::with_capacity(RESERVOIR_SIZE)),
            count: AtomicU64::new(0),
        }
    }
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, value: f64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        let mut values = self.values.lock();
        if values.len() == RESERVOIR_SIZE {
            values.pop_front();
        }
        values.push_back(value);
    }

    /// Total number of recorded values (not just the retained window)
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> HistogramSnapshot {
        let mut values: Vec<f64> = self.values.lock().iter().copied().collect();
        let count = self.count();
        if values.is_empty() {
            return HistogramSnapshot {
                count,
                ..Default::default()
            };
        }

        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std_dev = if values.len() < 2 {
            0.0
        } else {
            let sq: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
            (sq / (n - 1.0)).sqrt()
        };

        HistogramSnapshot {
            count,
            min: values[0],
            max: values[values.len() - 1],
            mean,
            std_dev,
            p50: percentile(&values, 50.0),
            p75: percentile(&values, 75.0),
            p95: percentile(&values, 95.0),
            p98: percentile(&values, 98.0),
            p99: percentile(&values, 99.0),
            p999: percentile(&values, 99.9),
        }
    }
}

fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = (pct / 100.0 * (sorted.len() - 1) as f64).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

#[derive(Debug)]
struct MeterRates {
    m1: Ewma,
    m5: Ewma,
    m15: Ewma,
    last_tick: Instant,
}

impl MeterRates {
    fn tick_if_necessary(&mut self, now: Instant) {
        let age = now.saturating_duration_since(self.last_tick);
        let ticks = (age.as_nanos() / TICK_INTERVAL.as_nanos()) as u32;
        if ticks == 0 {
            return;
        }
        self.last_tick += TICK_INTERVAL * ticks;
        for _ in 0..ticks {
            self.m1.tick();
            self.m5.tick();
            self.m15.tick();
        }
    }
}

/// Event rate: total count, mean rate and 1/5/15 minute moving averages
#[derive(Debug)]
pub struct Meter {
    count: AtomicU64,
    start: Instant,
    rates: Mutex<MeterRates>,
}

impl Default for Meter {
    fn default() -> Self {
        let now = Instant::now();
        Self {
            count: AtomicU64::new(0),
            start: now,
            rates: Mutex::new(MeterRates {
                m1: Ewma::one_minute(),
                m5: Ewma::five_minutes(),
                m15: Ewma::fifteen_minutes(),
                last_tick: now,
            }),
        }
    }
}

impl Meter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&self, n: u64) {
        let mut rates = self.rates.lock();
        rates.tick_if_necessary(Instant::now());
        self.count.fetch_add(n, Ordering::Relaxed);
        rates.m1.update(n);
        rates.m5.update(n);
        rates.m15.update(n);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MeterSnapshot {
        let mut rates = self.rates.lock();
        let now = Instant::now();
        rates.tick_if_necessary(now);

        let count = self.count();
        let elapsed = now.duration_since(self.start).as_secs_f64();
        let mean_rate = if count == 0 || elapsed <= 0.0 {
            0.0
        } else {
            count as f64 / elapsed
        };

        MeterSnapshot {
            count,
            mean_rate,
            m1_rate: rates.m1.rate(),
            m5_rate: rates.m5.rate(),
            m15_rate: rates.m15.rate(),
        }
    }
}

/// Meter of events plus a histogram of their durations (nanoseconds)
#[derive(Debug, Default)]
pub struct Timer {
    meter: Meter,
    durations: Histogram,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, elapsed: Duration) {
        self.durations.update(elapsed.as_nanos() as f64);
        self.meter.mark(1);
    }

    /// Start timing a scope; the duration is recorded when the guard drops
    pub fn time(&self) -> TimerGuard<'_> {
        TimerGuard {
            timer: self,
            started: Instant::now(),
        }
    }

    pub fn count(&self) -> u64 {
        self.meter.count()
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            rates: self.meter.snapshot(),
            durations: self.durations.snapshot(),
        }
    }
}

/// Records elapsed time into its `Timer` on drop
pub struct TimerGuard<'a> {
    timer: &'a Timer,
    started: Instant,
}

impl Drop for TimerGuard<'_> {
    fn drop(&mut self) {
        self.timer.update(self.started.elapsed());
    }
}
