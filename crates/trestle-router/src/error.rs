//! Route declaration errors.

use thiserror::Error;

/// Errors raised while drawing routes.
///
/// These are configuration errors: they surface when routes are declared,
/// never while a request is being matched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// A declared version is not a string of digits.
    #[error("invalid version: '{0}'")]
    InvalidVersion(String),

    /// A scope declared no versions.
    #[error("please provide at least one version")]
    NoVersions,

    /// A route path could not be parsed.
    #[error("invalid route path '{path}': {reason}")]
    InvalidPath {
        /// The offending path.
        path: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A header version pattern is unusable.
    #[error("invalid version pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl RouteError {
    /// Creates an invalid path error.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}
