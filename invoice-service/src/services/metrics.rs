//! Prometheus metrics for invoice-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec, TextEncoder,
};

/// Database query duration histogram.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "invoice_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register db_query_duration")
});

/// Sequence numbers reserved, by scope.
pub static COUNTER_INCREMENTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "invoice_counter_increments_total",
        "Total number of reserved invoice sequence numbers",
        &["scope"]
    )
    .expect("Failed to register counter_increments_total")
});

/// Saves by outcome.
pub static SAVES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "invoice_saves_total",
        "Total number of invoice saves by outcome",
        &["outcome"] // created, updated, renumbered
    )
    .expect("Failed to register saves_total")
});

/// Error counter for alerting.
pub static ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "invoice_errors_total",
        "Total number of errors by type",
        &["error_type"]
    )
    .expect("Failed to register errors_total")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&DB_QUERY_DURATION);
    Lazy::force(&COUNTER_INCREMENTS_TOTAL);
    Lazy::force(&SAVES_TOTAL);
    Lazy::force(&ERRORS_TOTAL);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}
