//! Handler failures.
//!
//! A [`Failure`] is anything a handler can fail with. It knows its class
//! chain, which the error-handling pipeline walks to find a mapping.

use crate::class::{Classified, ErrorClass, API_ERROR, RUNTIME_ERROR};
use crate::error::ApiError;
use std::fmt;

/// Maximum number of cause-chain entries reported by [`Failure::chain`].
pub const CHAIN_LIMIT: usize = 10;

/// An error raised while handling a request.
#[derive(Debug)]
pub enum Failure {
    /// A registered API error; always rendered with its own kind.
    Api(ApiError),

    /// An application error with a declared class.
    Classified {
        /// The declared class.
        class: &'static ErrorClass,
        /// The underlying error.
        error: anyhow::Error,
    },

    /// An opaque error, classed as `RuntimeError`.
    Other(anyhow::Error),
}

impl Failure {
    /// Wraps an opaque error.
    pub fn other(error: impl Into<anyhow::Error>) -> Self {
        Self::Other(error.into())
    }

    /// Wraps an error under an explicit class.
    pub fn classified(class: &'static ErrorClass, error: impl Into<anyhow::Error>) -> Self {
        Self::Classified {
            class,
            error: error.into(),
        }
    }

    /// Returns the API error, if this is one.
    #[must_use]
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(error) => Some(error),
            _ => None,
        }
    }

    /// Returns true if this wraps a registered API error.
    #[must_use]
    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api(_))
    }

    /// Class names from the most specific class up to the root, nearest first.
    #[must_use]
    pub fn class_chain(&self) -> Vec<&str> {
        match self {
            Self::Api(error) => {
                let mut chain = error.kind().ancestors();
                if chain.last() == Some(&API_ERROR.name()) {
                    chain.pop();
                }
                for class in API_ERROR.ancestors() {
                    chain.push(class.name());
                }
                chain
            }
            Self::Classified { class, .. } => class.ancestors().map(ErrorClass::name).collect(),
            Self::Other(_) => RUNTIME_ERROR.ancestors().map(ErrorClass::name).collect(),
        }
    }

    /// The most specific class name.
    #[must_use]
    pub fn class_name(&self) -> &str {
        match self {
            Self::Api(error) => error.class_name(),
            Self::Classified { class, .. } => class.name(),
            Self::Other(_) => RUNTIME_ERROR.name(),
        }
    }

    /// The failure message.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Api(error) => error.message().to_string(),
            Self::Classified { error, .. } | Self::Other(error) => error.to_string(),
        }
    }

    /// The failure followed by its sources, at most [`CHAIN_LIMIT`] entries.
    #[must_use]
    pub fn chain(&self) -> Vec<String> {
        match self {
            Self::Api(error) => vec![error.to_string()],
            Self::Classified { error, .. } | Self::Other(error) => error
                .chain()
                .take(CHAIN_LIMIT)
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// Attempts to downcast the underlying error.
    #[must_use]
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        match self {
            Self::Api(_) => None,
            Self::Classified { error, .. } | Self::Other(error) => error.downcast_ref::<E>(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.class_name(), self.message())
    }
}

impl From<ApiError> for Failure {
    fn from(error: ApiError) -> Self {
        Self::Api(error)
    }
}

impl<E: Classified> From<E> for Failure {
    fn from(error: E) -> Self {
        Self::Classified {
            class: error.error_class(),
            error: anyhow::Error::new(error),
        }
    }
}

impl From<anyhow::Error> for Failure {
    fn from(error: anyhow::Error) -> Self {
        Self::Other(error)
    }
}
