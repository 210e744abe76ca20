//! Failure mapping and error envelope rendering.
//!
//! A handler failure goes through three steps:
//!
//! 1. [`ErrorMapping::resolve`] walks the failure's class chain nearest-first
//!    and converts it with the first mapping found. Registered API errors
//!    need no mapping.
//! 2. Anything still unmapped is logged and reported to the controller's
//!    notifier, unless errors pass through.
//! 3. [`render_error`] builds `{error, error_description, ...metadata}` with
//!    the kind's status, or `system` / 500 for unmapped failures.

use crate::i18n::ERROR_SCOPE;
use crate::settings::Settings;
use http::StatusCode;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use trestle_core::{ApiError, Failure, CHAIN_LIMIT, METADATA_KEY, STANDARD_ERROR};
use trestle_middleware::{Response, ResponseExt};

/// Message shown when a failure's own message is hidden.
pub const GENERIC_MESSAGE: &str = "An unknown error has occurred.";

/// Error name rendered for unmapped failures.
pub const SYSTEM_ERROR: &str = "system";

/// Builds an API error from a failure.
pub type ErrorTransform = Arc<dyn Fn(&Failure) -> ApiError + Send + Sync>;

/// What a failure class maps to.
#[derive(Clone)]
pub enum MapTo {
    /// A registered error kind, by name; the failure's message is kept.
    Kind(String),
    /// A conversion function.
    Transform(ErrorTransform),
}

impl MapTo {
    fn apply(&self, failure: &Failure) -> ApiError {
        match self {
            Self::Kind(name) => ApiError::named(name).with_message(failure.message()),
            Self::Transform(transform) => transform(failure),
        }
    }
}

impl fmt::Debug for MapTo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kind(name) => f.debug_tuple("Kind").field(name).finish(),
            Self::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}

/// Failure class name to error kind, consulted nearest ancestor first.
///
/// ```
/// use trestle::ErrorMapping;
/// use trestle_core::Failure;
///
/// let mapping = ErrorMapping::new().map("RuntimeError", "conflict");
/// let resolved = mapping.resolve(Failure::other(anyhow::anyhow!("stale")));
/// assert_eq!(resolved.error_name(), "conflict");
/// assert_eq!(resolved.status().as_u16(), 409);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ErrorMapping {
    entries: Vec<(String, MapTo)>,
}

impl ErrorMapping {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `class` to the registered kind `kind`.
    #[must_use]
    pub fn map(self, class: impl Into<String>, kind: impl Into<String>) -> Self {
        self.with_entry(class, MapTo::Kind(kind.into()))
    }

    /// Maps `class` through a conversion function.
    #[must_use]
    pub fn map_with<F>(self, class: impl Into<String>, transform: F) -> Self
    where
        F: Fn(&Failure) -> ApiError + Send + Sync + 'static,
    {
        self.with_entry(class, MapTo::Transform(Arc::new(transform)))
    }

    /// Adds or replaces the entry for `class`.
    #[must_use]
    pub fn with_entry(mut self, class: impl Into<String>, target: MapTo) -> Self {
        self.insert(class, target);
        self
    }

    /// Adds or replaces the entry for `class`.
    pub fn insert(&mut self, class: impl Into<String>, target: MapTo) {
        let class = class.into();
        match self.entries.iter_mut().find(|(name, _)| *name == class) {
            Some(entry) => entry.1 = target,
            None => self.entries.push((class, target)),
        }
    }

    /// Copies every entry of `other` over this mapping.
    pub fn merge(&mut self, other: &ErrorMapping) {
        for (class, target) in &other.entries {
            self.insert(class.clone(), target.clone());
        }
    }

    /// The entry for exactly `class`.
    #[must_use]
    pub fn get(&self, class: &str) -> Option<&MapTo> {
        self.entries
            .iter()
            .find(|(name, _)| name == class)
            .map(|(_, target)| target)
    }

    /// Returns true if `class` has an entry.
    #[must_use]
    pub fn contains(&self, class: &str) -> bool {
        self.get(class).is_some()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts `failure` through the nearest mapped ancestor class.
    ///
    /// The hierarchy root is never matched.
    #[must_use]
    pub fn resolve(&self, failure: Failure) -> ResolvedFailure {
        let mapped = failure
            .class_chain()
            .into_iter()
            .filter(|class| *class != STANDARD_ERROR.name())
            .find_map(|class| self.get(class).map(|target| (class, target)))
            .map(|(class, target)| {
                tracing::debug!(error.class = failure.class_name(), mapped.from = class, "mapped failure");
                target.apply(&failure)
            });

        match (mapped, failure) {
            (Some(error), _) | (None, Failure::Api(error)) => ResolvedFailure::Api(error),
            (None, failure) => ResolvedFailure::Unmapped(failure),
        }
    }
}

/// A failure after mapping.
#[derive(Debug)]
pub enum ResolvedFailure {
    /// A registered API error, rendered with its own kind.
    Api(ApiError),
    /// A failure no mapping claimed, rendered as `system`.
    Unmapped(Failure),
}

impl ResolvedFailure {
    /// Returns true if no mapping claimed the failure.
    #[must_use]
    pub fn is_unmapped(&self) -> bool {
        matches!(self, Self::Unmapped(_))
    }

    /// The rendered status: the kind's, or 500.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Api(error) => error.http_status(),
            Self::Unmapped(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The rendered error name: the kind's, or `system`.
    #[must_use]
    pub fn error_name(&self) -> &str {
        match self {
            Self::Api(error) => error.name(),
            Self::Unmapped(_) => SYSTEM_ERROR,
        }
    }

    /// The failure's own message.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Api(error) => error.message().to_string(),
            Self::Unmapped(failure) => failure.message(),
        }
    }

    /// Returns true if the message differs from the class name.
    #[must_use]
    pub fn has_custom_message(&self) -> bool {
        match self {
            Self::Api(error) => error.has_custom_message(),
            Self::Unmapped(failure) => failure.message() != failure.class_name(),
        }
    }

    /// The translation context, empty for unmapped failures.
    #[must_use]
    pub fn context(&self) -> Map<String, Value> {
        match self {
            Self::Api(error) => error.context(),
            Self::Unmapped(_) => Map::new(),
        }
    }

    /// The context's `metadata` map.
    #[must_use]
    pub fn metadata(&self) -> Map<String, Value> {
        match self {
            Self::Api(error) => error.metadata(),
            Self::Unmapped(_) => Map::new(),
        }
    }

    /// Returns the original failure.
    #[must_use]
    pub fn into_failure(self) -> Failure {
        match self {
            Self::Api(error) => Failure::Api(error),
            Self::Unmapped(failure) => failure,
        }
    }
}

/// The client-visible description of `resolved`.
///
/// The failure's message is only used when exception messages are shown and
/// it is not just the class name. A translation under
/// `trestle.errors.{name}` takes precedence either way.
#[must_use]
pub fn error_message(resolved: &ResolvedFailure, settings: &Settings) -> String {
    let default = if settings.show_exception_message() && resolved.has_custom_message() {
        resolved.message()
    } else {
        GENERIC_MESSAGE.to_string()
    };
    let mut context = resolved.context();
    context.remove(METADATA_KEY);
    settings
        .translations()
        .translate(ERROR_SCOPE, resolved.error_name(), &default, &context)
}

/// The error envelope body.
#[must_use]
pub fn error_envelope(
    resolved: &ResolvedFailure,
    settings: &Settings,
    extras: Map<String, Value>,
) -> Value {
    let mut envelope = Map::new();
    envelope.insert("error".into(), Value::from(resolved.error_name()));
    envelope.insert(
        "error_description".into(),
        Value::from(error_message(resolved, settings)),
    );
    envelope.extend(resolved.metadata());
    envelope.extend(extras);
    Value::Object(envelope)
}

/// Renders `resolved` as an error envelope response.
#[must_use]
pub fn render_error(
    resolved: &ResolvedFailure,
    settings: &Settings,
    extras: Map<String, Value>,
) -> Response {
    let status = resolved.status();
    tracing::debug!(
        error.name = resolved.error_name(),
        http.status_code = status.as_u16(),
        "rendering error: {}",
        resolved.message()
    );
    trestle_telemetry::metrics::record_error(resolved.error_name());
    Response::json(status, &error_envelope(resolved, settings, extras))
}

/// Logs a rescued failure and the first entries of its cause chain.
pub fn log_failure(failure: &Failure) {
    tracing::error!(
        error.class = failure.class_name(),
        "failure rescued: {} - {}",
        failure.class_name(),
        failure.message()
    );
    for cause in failure.chain().iter().take(CHAIN_LIMIT) {
        tracing::error!("=> {cause}");
    }
}

/// A plain-text 500 for a failure that passed through error rendering.
#[must_use]
pub fn pass_through_response(failure: &Failure) -> Response {
    let mut body = failure.to_string();
    for cause in failure.chain().iter().skip(1) {
        body.push_str("\n=> ");
        body.push_str(cause);
    }
    tracing::error!(error.class = failure.class_name(), "unhandled failure: {}", failure.message());
    Response::text(StatusCode::INTERNAL_SERVER_ERROR, &body)
}
