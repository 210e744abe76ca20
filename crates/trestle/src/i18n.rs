//! Error message translations.
//!
//! Messages are looked up by `"{scope}.{name}"`. A missing key falls back to
//! the supplied default. `%{key}` placeholders are filled from the error
//! context; unknown placeholders are left as they are.

use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Translation scope for error messages.
pub const ERROR_SCOPE: &str = "trestle.errors";

const ENGLISH: [(&str, &str); 9] = [
    ("throttled", "The given request has been throttled."),
    ("unauthenticated", "The given request was not authenticated."),
    ("invalid_version", "The specified API version is not supported."),
    ("not_implemented", "The specified resource is not yet implemented."),
    ("not_found", "The requested resource could not be found."),
    ("bad_request", "The given request was not as expected."),
    ("conflict", "The resource could not be saved due to a conflict."),
    ("forbidden", "The requested action was forbidden."),
    ("invalid_resource", "The current resource was deemed invalid."),
];

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"%\{(\w+)\}").expect("valid regex"))
}

/// A flat table of translated messages.
#[derive(Debug, Clone, Default)]
pub struct Translations {
    entries: HashMap<String, String>,
}

impl Translations {
    /// An empty table; every lookup uses its default.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// English messages for the built-in error kinds.
    #[must_use]
    pub fn english() -> Self {
        ENGLISH
            .iter()
            .fold(Self::empty(), |table, (name, message)| {
                table.with(format!("{ERROR_SCOPE}.{name}"), *message)
            })
    }

    /// Adds or replaces a message under its full key.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.insert(key, message);
        self
    }

    /// Adds or replaces a message under its full key.
    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.entries.insert(key.into(), message.into());
    }

    /// The raw message stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Translates `name` within `scope`, interpolating `context`.
    #[must_use]
    pub fn translate(
        &self,
        scope: &str,
        name: &str,
        default: &str,
        context: &Map<String, Value>,
    ) -> String {
        let template = self
            .get(&format!("{scope}.{name}"))
            .unwrap_or(default);
        interpolate(template, context)
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Replaces `%{key}` placeholders with values from `context`.
#[must_use]
pub fn interpolate(template: &str, context: &Map<String, Value>) -> String {
    if !template.contains("%{") {
        return template.to_string();
    }
    placeholder()
        .replace_all(template, |captures: &regex::Captures<'_>| {
            match context.get(&captures[1]) {
                Some(Value::String(text)) => text.clone(),
                Some(value) => value.to_string(),
                None => captures[0].to_string(),
            }
        })
        .into_owned()
}
