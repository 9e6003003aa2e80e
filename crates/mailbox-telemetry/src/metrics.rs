//! Prometheus metrics for the mailbox application.
//!
//! All metrics follow the naming convention: `mailbox_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Admitted calls by operation
    pub static ref CALLS_ADMITTED: CounterVec = CounterVec::new(
        Opts::new("mailbox_calls_admitted_total", "Admitted application calls"),
        &["operation"]
    ).expect("metric creation failed");

    /// Rejected calls by operation and reason
    pub static ref CALLS_REJECTED: CounterVec = CounterVec::new(
        Opts::new("mailbox_calls_rejected_total", "Rejected application calls"),
        &["operation", "reason"]
    ).expect("metric creation failed");
}

/// Handle proving the metrics are registered.
pub struct MetricsHandle {
    _registry: Registry,
}

/// Register all metrics with the global registry.
///
/// # Errors
///
/// A metric is already registered.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(CALLS_ADMITTED.clone()),
        Box::new(CALLS_REJECTED.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle {
        _registry: REGISTRY.clone(),
    })
}

/// Encode all metrics as Prometheus text format.
///
/// # Errors
///
/// Encoder failures.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Record an admitted call.
pub fn record_admitted(operation: &str) {
    CALLS_ADMITTED.with_label_values(&[operation]).inc();
}

/// Record a rejected call with its reason label.
pub fn record_rejected(operation: &str, reason: &str) {
    CALLS_REJECTED.with_label_values(&[operation, reason]).inc();
}
