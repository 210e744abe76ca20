//! Request metrics.
//!
//! Recording functions go through the `metrics` facade and are no-ops until
//! a recorder is installed with [`init_metrics`].

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

/// Completed requests.
pub const REQUESTS_TOTAL: &str = "trestle_requests_total";
/// Request latency.
pub const REQUEST_DURATION_SECONDS: &str = "trestle_request_duration_seconds";
/// Requests being processed.
pub const IN_FLIGHT_REQUESTS: &str = "trestle_in_flight_requests";
/// Rendered error envelopes.
pub const ERRORS_TOTAL: &str = "trestle_errors_total";
/// Conditional GETs answered with 304.
pub const NOT_MODIFIED_TOTAL: &str = "trestle_not_modified_total";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether a recorder is installed.
    pub enabled: bool,

    /// Histogram buckets for request duration, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_buckets: vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        }
    }
}

/// Renders installed metrics in Prometheus text format.
#[derive(Debug, Clone)]
pub struct MetricsRegistry {
    handle: PrometheusHandle,
}

impl MetricsRegistry {
    /// Wraps a recorder handle.
    #[must_use]
    pub fn new(handle: PrometheusHandle) -> Self {
        Self { handle }
    }

    /// The registry of the globally installed recorder, if any.
    #[must_use]
    pub fn global() -> Option<Self> {
        METRICS_HANDLE.get().cloned().map(Self::new)
    }

    /// Renders all metrics.
    #[must_use]
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Installs the global Prometheus recorder.
///
/// # Errors
///
/// Returns [`TelemetryError::Buckets`] for unusable buckets and
/// [`TelemetryError::Recorder`] when a recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<Option<MetricsRegistry>> {
    if !config.enabled {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(REQUEST_DURATION_SECONDS.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::Buckets(e.to_string()))?
        .install_recorder()
        .map_err(|e| TelemetryError::Recorder(e.to_string()))?;

    let _ = METRICS_HANDLE.set(handle.clone());
    describe_metrics();

    Ok(Some(MetricsRegistry::new(handle)))
}

fn describe_metrics() {
    describe_counter!(REQUESTS_TOTAL, "Total number of API requests processed");
    describe_histogram!(REQUEST_DURATION_SECONDS, "API request duration in seconds");
    describe_gauge!(IN_FLIGHT_REQUESTS, "Number of API requests currently being processed");
    describe_counter!(ERRORS_TOTAL, "Total number of error envelopes rendered, by error name");
    describe_counter!(NOT_MODIFIED_TOTAL, "Total number of conditional GETs answered with 304");
}

/// Records a completed request.
pub fn record_request(action: &str, status_code: u16, duration: Duration) {
    counter!(
        REQUESTS_TOTAL,
        "action" => action.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(REQUEST_DURATION_SECONDS, "action" => action.to_string())
        .record(duration.as_secs_f64());
}

/// Records a rendered error envelope.
pub fn record_error(error_name: &str) {
    counter!(ERRORS_TOTAL, "error" => error_name.to_string()).increment(1);
}

/// Records a conditional GET short-circuited with 304.
pub fn record_not_modified() {
    counter!(NOT_MODIFIED_TOTAL).increment(1);
}

/// Tracks one in-flight request for as long as it lives.
#[derive(Debug)]
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Increments the in-flight gauge.
    #[must_use]
    pub fn new() -> Self {
        gauge!(IN_FLIGHT_REQUESTS).increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(IN_FLIGHT_REQUESTS).decrement(1.0);
    }
}
