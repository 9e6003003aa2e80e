//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to log lines.
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error, or a directive list).
    pub log_level: String,

    /// Whether to emit JSON formatted logs.
    pub json_logs: bool,

    /// Whether to register Prometheus metrics.
    pub metrics_enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "mailbox".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: true,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `MAILBOX_SERVICE_NAME`: Service name (default: mailbox)
    /// - `MAILBOX_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `MAILBOX_JSON_LOGS`: Enable JSON logs (default: false)
    /// - `MAILBOX_METRICS`: Register metrics (default: true)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`TelemetryConfig::from_env`] over an arbitrary lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            service_name: lookup("MAILBOX_SERVICE_NAME").unwrap_or(defaults.service_name),

            log_level: lookup("MAILBOX_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            json_logs: lookup("MAILBOX_JSON_LOGS")
                .map_or(defaults.json_logs, |v| parse_flag(&v)),

            metrics_enabled: lookup("MAILBOX_METRICS")
                .map_or(defaults.metrics_enabled, |v| parse_flag(&v)),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
