//! Client errors.

use thiserror::Error;
use trestle_core::ApiError;

/// Message used when a response body is not a JSON object.
pub const UNSUPPORTED_FORMAT: &str = "The response from the server was not in a supported format.";

/// Errors returned by [`ApiClient`](crate::ApiClient).
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with an error envelope.
    ///
    /// The error carries the registered kind for the envelope's `error`
    /// name, or the root kind when the name is not registered.
    #[error("{}: {}", .0.class_name(), .0.message())]
    Api(ApiError),

    /// The response body was not a JSON object.
    #[error("{UNSUPPORTED_FORMAT}")]
    UnsupportedFormat,

    /// Transport error.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// The response could not be decoded into the requested type.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// The API error, if the server returned one.
    #[must_use]
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(error) => Some(error),
            _ => None,
        }
    }
}

impl From<ApiError> for ClientError {
    fn from(error: ApiError) -> Self {
        Self::Api(error)
    }
}

/// Result alias for client calls.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_display_uses_class_and_message() {
        let error = ClientError::from(ApiError::named("not_found").with_message("no such user"));
        assert_eq!(error.to_string(), "NotFound: no such user");
        assert_eq!(error.as_api().map(ApiError::name), Some("not_found"));
    }

    #[test]
    fn test_unsupported_format_message() {
        assert_eq!(ClientError::UnsupportedFormat.to_string(), UNSUPPORTED_FORMAT);
        assert!(ClientError::UnsupportedFormat.as_api().is_none());
    }
}
