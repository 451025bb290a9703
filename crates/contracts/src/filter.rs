//! MetricFilter trait - decides which metrics are reported

use crate::MetricKind;

/// Compiled inclusion rule, evaluated per metric before formatting.
pub trait MetricFilter: Send + Sync {
    fn matches(&self, name: &str, kind: MetricKind) -> bool;
}

/// Filter that lets every metric through
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl MetricFilter for AllowAll {
    fn matches(&self, _name: &str, _kind: MetricKind) -> bool {
        true
    }
}

impl<F> MetricFilter for F
where
    F: Fn(&str, MetricKind) -> bool + Send + Sync,
{
    fn matches(&self, name: &str, kind: MetricKind) -> bool {
        self(name, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_filter() {
        let only_counters = |_: &str, kind: MetricKind| kind == MetricKind::Counter;
        assert!(only_counters.matches("requests", MetricKind::Counter));
        assert!(!only_counters.matches("requests", MetricKind::Gauge));
        assert!(AllowAll.matches("anything", MetricKind::Timer));
    }
}
