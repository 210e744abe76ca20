//! Errors raised while assembling or serving an API.

use thiserror::Error;
use trestle_config::ConfigError;
use trestle_router::RouteError;

/// Errors from building settings, drawing routes or serving connections.
///
/// Request-time failures never surface here; they are rendered as error
/// envelopes.
#[derive(Debug, Error)]
pub enum TrestleError {
    /// Configuration could not be loaded or validated.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A route scope or version pattern was invalid.
    #[error("routing error: {0}")]
    Route(#[from] RouteError),

    /// Binding or accepting connections failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Telemetry could not be initialised.
    #[error("telemetry error: {0}")]
    Telemetry(#[from] trestle_telemetry::TelemetryError),
}
