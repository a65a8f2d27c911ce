//! # Metrics
//!
//! Prometheus metrics for monitoring the operator.
//!
//! ## Metrics Exposed
//!
//! - `mcp_operator_reconciliations_total` - Total number of reconciliations
//! - `mcp_operator_reconciliation_errors_total` - Total number of reconciliation errors
//! - `mcp_operator_reconciliation_duration_seconds` - Duration of reconciliation passes
//! - `mcp_operator_requeues_total{reason}` - Requeues by reason
//! - `mcp_operator_validation_failures_total` - Servers rejected by validation
//! - `mcp_operator_resource_operations_total{kind,operation}` - Creates and updates of owned objects
//! - `mcp_operator_status_updates_total{result}` - Status writes (written, skipped, error)

use anyhow::Result;
use prometheus::{Histogram, IntCounter, IntCounterVec, Registry};
use std::sync::LazyLock;

// Metrics
pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static RECONCILIATIONS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "mcp_operator_reconciliations_total",
        "Total number of reconciliations",
    )
    .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static RECONCILIATION_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "mcp_operator_reconciliation_errors_total",
        "Total number of reconciliation errors",
    )
    .expect("Failed to create RECONCILIATION_ERRORS_TOTAL metric - this should never happen")
});

static RECONCILIATION_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "mcp_operator_reconciliation_duration_seconds",
            "Duration of reconciliation in seconds",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0]),
    )
    .expect("Failed to create RECONCILIATION_DURATION metric - this should never happen")
});

static REQUEUES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "mcp_operator_requeues_total",
            "Total number of requeues by reason",
        ),
        &["reason"],
    )
    .expect("Failed to create REQUEUES_TOTAL metric - this should never happen")
});

static VALIDATION_FAILURES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "mcp_operator_validation_failures_total",
        "Total number of MCPServers rejected by validation",
    )
    .expect("Failed to create VALIDATION_FAILURES_TOTAL metric - this should never happen")
});

static RESOURCE_OPERATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "mcp_operator_resource_operations_total",
            "Total number of create/update operations on owned resources",
        ),
        &["kind", "operation"],
    )
    .expect("Failed to create RESOURCE_OPERATIONS_TOTAL metric - this should never happen")
});

static STATUS_UPDATES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "mcp_operator_status_updates_total",
            "Total number of status updates by result",
        ),
        &["result"],
    )
    .expect("Failed to create STATUS_UPDATES_TOTAL metric - this should never happen")
});

/// Register every metric with the shared registry
///
/// # Errors
///
/// Fails when called twice, since Prometheus rejects duplicate collectors.
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(RECONCILIATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(REQUEUES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(VALIDATION_FAILURES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RESOURCE_OPERATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(STATUS_UPDATES_TOTAL.clone()))?;

    Ok(())
}

pub fn increment_reconciliations() {
    RECONCILIATIONS_TOTAL.inc();
}

pub fn increment_reconciliation_errors() {
    RECONCILIATION_ERRORS_TOTAL.inc();
}

pub fn observe_reconciliation_duration(duration: f64) {
    RECONCILIATION_DURATION.observe(duration);
}

pub fn increment_requeue(reason: &str) {
    REQUEUES_TOTAL.with_label_values(&[reason]).inc();
}

pub fn increment_validation_failures() {
    VALIDATION_FAILURES_TOTAL.inc();
}

/// `kind` is the lower-case resource name, `operation` is `create` or `update`
pub fn increment_resource_operation(kind: &str, operation: &str) {
    RESOURCE_OPERATIONS_TOTAL
        .with_label_values(&[kind, operation])
        .inc();
}

pub fn increment_status_update(result: &str) {
    STATUS_UPDATES_TOTAL.with_label_values(&[result]).inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labelled_counters_track_each_label_set() {
        let before = RESOURCE_OPERATIONS_TOTAL
            .with_label_values(&["deployment", "create"])
            .get();
        increment_resource_operation("deployment", "create");
        increment_resource_operation("service", "create");

        assert_eq!(
            RESOURCE_OPERATIONS_TOTAL
                .with_label_values(&["deployment", "create"])
                .get(),
            before + 1
        );
    }

    #[test]
    fn test_requeue_reasons_are_separate_series() {
        let before = REQUEUES_TOTAL.with_label_values(&["error-backoff"]).get();
        increment_requeue("error-backoff");
        increment_requeue("resync");
        assert_eq!(
            REQUEUES_TOTAL.with_label_values(&["error-backoff"]).get(),
            before + 1
        );
    }
}
