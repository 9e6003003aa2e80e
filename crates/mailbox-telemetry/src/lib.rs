//! # Mailbox Telemetry
//!
//! Logging and metrics bootstrap shared by the mailbox binaries.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mailbox_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(&TelemetryConfig::from_env())?;
//!     // Application code here
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MAILBOX_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `MAILBOX_JSON_LOGS` | `false` | Emit JSON lines instead of text |
//! | `MAILBOX_METRICS` | `true` | Register Prometheus metrics |

#![warn(missing_docs)]

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{encode_metrics, register_metrics, MetricsHandle};

use thiserror::Error;

/// Telemetry initialization errors.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// Prometheus registration failed.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Install logging and, if enabled, register metrics.
///
/// The returned guard keeps the metrics handle alive; drop it on exit.
///
/// # Errors
///
/// A subscriber is already installed, the filter is invalid, or metric
/// registration fails.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = if config.metrics_enabled {
        Some(register_metrics()?)
    } else {
        None
    };
    init_logging(config)?;

    Ok(TelemetryGuard { metrics })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    metrics: Option<MetricsHandle>,
}

impl TelemetryGuard {
    /// Metrics in Prometheus text format, if metrics are enabled.
    ///
    /// # Errors
    ///
    /// Encoding failures.
    pub fn render_metrics(&self) -> Result<Option<String>, TelemetryError> {
        self.metrics.as_ref().map(|_| encode_metrics()).transpose()
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::debug!("Shutting down telemetry");
    }
}
