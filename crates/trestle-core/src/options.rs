//! Per-call expose options.

use crate::resource::Serializer;
use http::StatusCode;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Options for a single `expose` / `responds` call.
///
/// Rendering options (`status`, `content_type`) affect the response; the rest
/// flow through conversion to converters and serializers.
#[derive(Clone)]
pub struct ExposeOptions {
    /// Response status; defaults to 200.
    pub status: Option<StatusCode>,
    /// Response content type; defaults to `application/json`.
    pub content_type: Option<String>,
    /// Caller metadata, merged over converter metadata.
    pub metadata: Map<String, Value>,
    /// Envelope key for the converted body; defaults to `response`.
    pub response_key: Option<String>,
    /// Serializer applied to the exposed object.
    pub serializer: Option<Arc<dyn Serializer>>,
    /// Serializer applied to each element of a collection.
    pub each_serializer: Option<Arc<dyn Serializer>>,
    /// Whether serializers wrap their output in a root key.
    pub include_root: bool,
    /// Attribute whitelist for records that present a subset of fields.
    pub only: Option<Vec<String>>,
    /// Whether an object's own serializer lookup is consulted.
    pub serializer_lookup: bool,
    /// Free-form options passed through to serializers.
    pub extra: Map<String, Value>,
}

impl Default for ExposeOptions {
    fn default() -> Self {
        Self {
            status: None,
            content_type: None,
            metadata: Map::new(),
            response_key: None,
            serializer: None,
            each_serializer: None,
            include_root: false,
            only: None,
            serializer_lookup: true,
            extra: Map::new(),
        }
    }
}

impl ExposeOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the response status.
    #[must_use]
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the response content type.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Adds one metadata entry.
    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Merges a metadata map.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata.extend(metadata);
        self
    }

    /// Sets the envelope key for the converted body.
    #[must_use]
    pub fn response_key(mut self, key: impl Into<String>) -> Self {
        self.response_key = Some(key.into());
        self
    }

    /// Sets the serializer.
    #[must_use]
    pub fn serializer(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.serializer = Some(serializer);
        self
    }

    /// Sets the per-element serializer.
    #[must_use]
    pub fn each_serializer(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.each_serializer = Some(serializer);
        self
    }

    /// Restricts presented attributes.
    #[must_use]
    pub fn only<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut only = self.only.take().unwrap_or_default();
        for attribute in attributes {
            let attribute = attribute.into();
            if !only.contains(&attribute) {
                only.push(attribute);
            }
        }
        self.only = if only.is_empty() { None } else { Some(only) };
        self
    }

    /// Adds a free-form option.
    #[must_use]
    pub fn option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// The envelope key, falling back to `response`.
    #[must_use]
    pub fn response_key_or_default(&self) -> &str {
        self.response_key.as_deref().unwrap_or("response")
    }

    /// Keeps only whitelisted keys of `attributes`, when a whitelist is set.
    #[must_use]
    pub fn present(&self, attributes: Map<String, Value>) -> Map<String, Value> {
        match &self.only {
            Some(only) => attributes
                .into_iter()
                .filter(|(key, _)| only.iter().any(|attr| attr == key))
                .collect(),
            None => attributes,
        }
    }

    /// Options handed to a serializer: the same options with the root disabled.
    #[must_use]
    pub fn for_serializer(&self) -> Self {
        let mut options = self.clone();
        options.include_root = false;
        options
    }
}

impl fmt::Debug for ExposeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExposeOptions")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .field("metadata", &self.metadata)
            .field("response_key", &self.response_key)
            .field("serializer", &self.serializer.is_some())
            .field("each_serializer", &self.each_serializer.is_some())
            .field("include_root", &self.include_root)
            .field("only", &self.only)
            .field("serializer_lookup", &self.serializer_lookup)
            .finish_non_exhaustive()
    }
}
