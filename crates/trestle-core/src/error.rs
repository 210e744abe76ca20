//! Raised API errors.

use crate::kind::ErrorKind;
use crate::registry::ErrorRegistry;
use crate::validation::ValidationErrors;
use http::StatusCode;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Context key whose map is merged into the rendered error envelope.
pub const METADATA_KEY: &str = "metadata";

/// A raised occurrence of an [`ErrorKind`].
///
/// The context is a free-form map; its `metadata` entry, if an object, is
/// merged into the rendered envelope and every other entry is available for
/// message interpolation.
///
/// # Example
///
/// ```
/// use trestle_core::ApiError;
/// use serde_json::json;
///
/// let error = ApiError::named("not_found")
///     .with_message("no such user")
///     .with_metadata("id", json!(42));
///
/// assert_eq!(error.name(), "not_found");
/// assert_eq!(error.http_status().as_u16(), 404);
/// assert_eq!(error.metadata()["id"], json!(42));
/// ```
#[derive(Debug, Clone)]
pub struct ApiError {
    kind: Arc<ErrorKind>,
    message: Option<String>,
    context: Map<String, Value>,
    validation: Option<ValidationErrors>,
}

impl ApiError {
    /// Creates an error of the given kind with no message.
    #[must_use]
    pub fn new(kind: Arc<ErrorKind>) -> Self {
        Self {
            kind,
            message: None,
            context: Map::new(),
            validation: None,
        }
    }

    /// Creates an error by looking up `name` in the global registry.
    ///
    /// Unregistered names fall back to the root `unknown` kind.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self::new(ErrorRegistry::global().lookup_or_root(name))
    }

    /// Creates an `invalid_resource` error carrying validation messages.
    #[must_use]
    pub fn invalid_resource(errors: ValidationErrors) -> Self {
        let mut error = Self::named("invalid_resource");
        error.validation = Some(errors);
        error
    }

    /// Sets the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Replaces the context.
    #[must_use]
    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = context;
        self
    }

    /// Inserts one context entry.
    #[must_use]
    pub fn with_context_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }

    /// Inserts one entry into the context's `metadata` map.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        let metadata = self
            .context
            .entry(METADATA_KEY)
            .or_insert_with(|| Value::Object(Map::new()));
        if !metadata.is_object() {
            *metadata = Value::Object(Map::new());
        }
        if let Value::Object(map) = metadata {
            map.insert(key.into(), value);
        }
        self
    }

    /// The kind of this error.
    #[must_use]
    pub fn kind(&self) -> &Arc<ErrorKind> {
        &self.kind
    }

    /// The wire-visible error name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// The class name of this error's kind.
    #[must_use]
    pub fn class_name(&self) -> &str {
        self.kind.class_name()
    }

    /// The HTTP status of this error's kind.
    #[must_use]
    pub fn http_status(&self) -> StatusCode {
        self.kind.http_status()
    }

    /// The message, or the class name when none was given.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message
            .as_deref()
            .unwrap_or_else(|| self.kind.class_name())
    }

    /// Returns true if a message other than the class name was supplied.
    #[must_use]
    pub fn has_custom_message(&self) -> bool {
        self.message
            .as_deref()
            .is_some_and(|message| message != self.kind.class_name())
    }

    /// Validation messages, for `invalid_resource` errors.
    #[must_use]
    pub fn validation(&self) -> Option<&ValidationErrors> {
        self.validation.as_ref()
    }

    /// The full context.
    ///
    /// When validation messages are present they are written to
    /// `metadata.messages`, keeping every other metadata key.
    #[must_use]
    pub fn context(&self) -> Map<String, Value> {
        let mut context = self.context.clone();
        if let Some(errors) = &self.validation {
            let metadata = context
                .entry(METADATA_KEY)
                .or_insert_with(|| Value::Object(Map::new()));
            if !metadata.is_object() {
                *metadata = Value::Object(Map::new());
            }
            if let Value::Object(map) = metadata {
                map.insert("messages".to_string(), Value::Object(errors.to_map()));
            }
        }
        context
    }

    /// The context's `metadata` map, empty when absent.
    #[must_use]
    pub fn metadata(&self) -> Map<String, Value> {
        match self.context().remove(METADATA_KEY) {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ApiError {}
