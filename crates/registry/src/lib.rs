//! # Registry
//!
//! In-process metric registry backing the reporters.
//!
//! Metrics are created on first use by name and shared as `Arc`s, so hot paths
//! keep a handle instead of looking the name up on every update.
//!
//! ```
//! use contracts::{MetricSnapshot, MetricSource};
//! use registry::MetricRegistry;
//!
//! let registry = MetricRegistry::new();
//! registry.counter("jobs.completed").inc(3);
//!
//! let snapshot = registry.snapshot();
//! assert_eq!(snapshot[0], ("jobs.completed".to_string(), MetricSnapshot::Counter(3)));
//! ```

mod ewma;
mod metrics;
mod registry;

pub use ewma::Ewma;
pub use metrics::{Counter, Gauge, Histogram, Meter, Timer, TimerGuard};
pub use registry::MetricRegistry;
