//! Telemetry error types.

use thiserror::Error;

/// Errors raised while installing the subscriber or the metrics recorder.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The tracing subscriber could not be installed.
    #[error("tracing subscriber not installed: {0}")]
    Subscriber(String),

    /// The Prometheus recorder could not be installed.
    #[error("metrics recorder not installed: {0}")]
    Recorder(String),

    /// Histogram buckets were rejected.
    #[error("unusable histogram buckets: {0}")]
    Buckets(String),
}
