//! Prometheus metrics for settlement-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec, TextEncoder,
};

/// Workflow operation counter by operation and outcome.
pub static WORKFLOW_OPS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "settlement_workflow_operations_total",
        "Total number of workflow operations",
        &["operation", "outcome"]
    )
    .expect("Failed to register workflow_operations_total")
});

/// Status transition counter by entity type and target status.
pub static TRANSITIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "settlement_transitions_total",
        "Total number of committed status transitions",
        &["entity_type", "to_status"]
    )
    .expect("Failed to register transitions_total")
});

/// Error counter for alerting.
pub static ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "settlement_errors_total",
        "Total number of errors by type",
        &["error_type"]
    )
    .expect("Failed to register errors_total")
});

/// Database query duration histogram.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "settlement_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register db_query_duration")
});

/// Generated invoice counter.
pub static INVOICES_GENERATED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "settlement_invoices_generated_total",
        "Total number of invoices generated from annexures",
        &["outcome"] // generated, validation_failed
    )
    .expect("Failed to register invoices_generated_total")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&WORKFLOW_OPS_TOTAL);
    Lazy::force(&TRANSITIONS_TOTAL);
    Lazy::force(&ERRORS_TOTAL);
    Lazy::force(&DB_QUERY_DURATION);
    Lazy::force(&INVOICES_GENERATED_TOTAL);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}
