//! # Metric Filter
//!
//! Compiles a configuration `PredicateConfig` into a `MetricFilter`.
//!
//! - `white`: a metric is reported iff some pattern matches its whole name
//! - `black`: a metric is reported iff no pattern matches its whole name
//! - `kinds`: when set, the metric kind must also be listed
//!
//! # Example
//!
//! ```
//! use contracts::{FilterColor, MetricFilter, MetricKind, PredicateConfig};
//!
//! let predicate = PredicateConfig {
//!     color: FilterColor::White,
//!     patterns: vec!["jvm\\..*".to_string()],
//!     kinds: None,
//! };
//! let filter = metric_filter::compile(&predicate).unwrap();
//! assert!(filter.matches("jvm.heap.used", MetricKind::Gauge));
//! assert!(!filter.matches("http.requests", MetricKind::Counter));
//! ```

use std::sync::Arc;

use contracts::{AllowAll, ContractError, FilterColor, MetricFilter, MetricKind, PredicateConfig};
use regex::Regex;
use tracing::debug;

/// Filter compiled from a `PredicateConfig`
#[derive(Debug, Clone)]
pub struct PredicateFilter {
    color: FilterColor,
    patterns: Vec<Regex>,
    kinds: Option<Vec<MetricKind>>,
}

impl PredicateFilter {
    fn name_allowed(&self, name: &str) -> bool {
        let matched = self.patterns.iter().any(|re| re.is_match(name));
        match self.color {
            FilterColor::White => matched,
            FilterColor::Black => !matched,
        }
    }

    fn kind_allowed(&self, kind: MetricKind) -> bool {
        self.kinds
            .as_ref()
            .is_none_or(|kinds| kinds.contains(&kind))
    }
}

impl MetricFilter for PredicateFilter {
    fn matches(&self, name: &str, kind: MetricKind) -> bool {
        self.kind_allowed(kind) && self.name_allowed(name)
    }
}

/// Compile a predicate into a filter
///
/// Patterns are anchored so they must match the whole metric name.
///
/// # Errors
/// A pattern that is not a valid regular expression
pub fn compile(predicate: &PredicateConfig) -> Result<PredicateFilter, ContractError> {
    let patterns = predicate
        .patterns
        .iter()
        .map(|p| compile_pattern(p))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        color = ?predicate.color,
        patterns = patterns.len(),
        kinds = ?predicate.kinds,
        "Predicate compiled"
    );

    Ok(PredicateFilter {
        color: predicate.color,
        patterns,
        kinds: predicate.kinds.clone(),
    })
}

/// Build the filter a reporter uses; no predicate lets everything through
pub fn generate_filter(
    predicate: Option<&PredicateConfig>,
) -> Result<Arc<dyn MetricFilter>, ContractError> {
    match predicate {
        Some(predicate) => Ok(Arc::new(compile(predicate)?)),
        None => Ok(Arc::new(AllowAll)),
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex, ContractError> {
    Regex::new(&format!("^(?:{pattern})$"))
        .map_err(|e| ContractError::invalid_pattern(pattern, e.to_string()))
}
