//! Observability for Trestle services.
//!
//! - **Logging**: structured output through `tracing-subscriber`, JSON in
//!   production and pretty-printed in development
//! - **Metrics**: request counters and latency histograms through the
//!   `metrics` facade, optionally rendered by a Prometheus recorder
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `trestle_requests_total` | Counter | `action`, `status` | Completed requests |
//! | `trestle_request_duration_seconds` | Histogram | `action` | Request latency |
//! | `trestle_in_flight_requests` | Gauge | - | Requests being processed |
//! | `trestle_errors_total` | Counter | `error` | Rendered error envelopes |
//! | `trestle_not_modified_total` | Counter | - | Conditional GETs answered with 304 |
//!
//! # Example
//!
//! ```rust,ignore
//! use trestle_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! tracing::info!(action = "users#index", "ready");
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{fields, init_logging, LogConfig};
pub use metrics::{init_metrics, InFlightGuard, MetricsConfig, MetricsRegistry};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
