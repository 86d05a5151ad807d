//! Decision and mutation counters
//!
//! Counters are atomics so decisions, which only borrow the engine, can still
//! be recorded.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of the engine counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AclMetrics {
    /// Total number of resolved requests
    pub total_decisions: u64,

    /// Number of allowed decisions
    pub allowed_decisions: u64,

    /// Number of denied decisions
    pub denied_decisions: u64,

    /// Decisions made by the root rule because nothing else matched
    pub default_decisions: u64,

    /// Rule entries written by allow/deny
    pub rules_written: u64,

    /// Rule entries deleted by remove_allow/remove_deny and purges
    pub rules_removed: u64,
}

impl AclMetrics {
    /// Calculate allow rate
    pub fn allow_rate(&self) -> f64 {
        let total = self.allowed_decisions + self.denied_decisions;
        if total == 0 {
            0.0
        } else {
            self.allowed_decisions as f64 / total as f64
        }
    }
}

/// Metrics collector
#[derive(Debug, Default)]
pub struct MetricsCollector {
    total_decisions: AtomicU64,
    allowed_decisions: AtomicU64,
    denied_decisions: AtomicU64,
    default_decisions: AtomicU64,
    rules_written: AtomicU64,
    rules_removed: AtomicU64,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resolved request
    pub fn record_decision(&self, allowed: bool, by_default: bool) {
        self.total_decisions.fetch_add(1, Ordering::Relaxed);

        if allowed {
            self.allowed_decisions.fetch_add(1, Ordering::Relaxed);
        } else {
            self.denied_decisions.fetch_add(1, Ordering::Relaxed);
        }

        if by_default {
            self.default_decisions.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_written(&self, count: usize) {
        self.rules_written.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_removed(&self, count: usize) {
        self.rules_removed.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> AclMetrics {
        AclMetrics {
            total_decisions: self.total_decisions.load(Ordering::Relaxed),
            allowed_decisions: self.allowed_decisions.load(Ordering::Relaxed),
            denied_decisions: self.denied_decisions.load(Ordering::Relaxed),
            default_decisions: self.default_decisions.load(Ordering::Relaxed),
            rules_written: self.rules_written.load(Ordering::Relaxed),
            rules_removed: self.rules_removed.load(Ordering::Relaxed),
        }
    }

    /// Reset all metrics
    pub fn reset(&self) {
        for counter in [
            &self.total_decisions,
            &self.allowed_decisions,
            &self.denied_decisions,
            &self.default_decisions,
            &self.rules_written,
            &self.rules_removed,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// Export metrics in Prometheus format
    pub fn export_prometheus(&self) -> String {
        let metrics = self.snapshot();

        format!(
            r#"# HELP acl_decisions_total Total number of resolved requests
# TYPE acl_decisions_total counter
acl_decisions_total {}

# HELP acl_allowed_total Number of allowed decisions
# TYPE acl_allowed_total counter
acl_allowed_total {}

# HELP acl_denied_total Number of denied decisions
# TYPE acl_denied_total counter
acl_denied_total {}

# HELP acl_default_decisions_total Decisions made by the root rule
# TYPE acl_default_decisions_total counter
acl_default_decisions_total {}

# HELP acl_rules_written_total Rule entries written
# TYPE acl_rules_written_total counter
acl_rules_written_total {}

# HELP acl_rules_removed_total Rule entries removed
# TYPE acl_rules_removed_total counter
acl_rules_removed_total {}
"#,
            metrics.total_decisions,
            metrics.allowed_decisions,
            metrics.denied_decisions,
            metrics.default_decisions,
            metrics.rules_written,
            metrics.rules_removed,
        )
    }
}
