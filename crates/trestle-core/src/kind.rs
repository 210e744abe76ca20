//! Error kinds.
//!
//! An [`ErrorKind`] is pure data: a wire-visible name, a class name used by
//! error mappings, an HTTP status and an optional base kind. Kinds are created
//! through [`ErrorRegistry::register`](crate::ErrorRegistry::register) and are
//! immutable afterwards.

use heck::ToUpperCamelCase;
use http::StatusCode;
use std::fmt;
use std::sync::Arc;

/// Class name of the root kind every registered kind descends from.
pub const ROOT_CLASS: &str = "Error";

/// Wire name of the root kind.
pub const ROOT_NAME: &str = "unknown";

/// A named, registered category of API failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorKind {
    name: String,
    class_name: String,
    http_status: StatusCode,
    base: Option<Arc<ErrorKind>>,
}

impl ErrorKind {
    /// Creates a kind that descends directly from the root kind.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        class_name: impl Into<String>,
        http_status: StatusCode,
    ) -> Self {
        Self {
            name: name.into(),
            class_name: class_name.into(),
            http_status,
            base: Some(Arc::new(Self::root())),
        }
    }

    /// The generic kind used when a name is not registered.
    ///
    /// It carries the name `unknown` and the default status of 400.
    #[must_use]
    pub fn root() -> Self {
        Self {
            name: ROOT_NAME.to_string(),
            class_name: ROOT_CLASS.to_string(),
            http_status: StatusCode::BAD_REQUEST,
            base: None,
        }
    }

    /// Returns a copy of this kind descending from `base`.
    #[must_use]
    pub fn with_base(mut self, base: Arc<ErrorKind>) -> Self {
        self.base = Some(base);
        self
    }

    /// The wire-visible error name (e.g. `not_found`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The class name used as an error mapping key (e.g. `NotFound`).
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// The HTTP status rendered for this kind.
    #[must_use]
    pub fn http_status(&self) -> StatusCode {
        self.http_status
    }

    /// The kind this one was registered under, if any.
    #[must_use]
    pub fn base(&self) -> Option<&Arc<ErrorKind>> {
        self.base.as_ref()
    }

    /// Returns true if this is the root kind.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.base.is_none() && self.class_name == ROOT_CLASS
    }

    /// Class names from this kind up to the root, nearest first.
    #[must_use]
    pub fn ancestors(&self) -> Vec<&str> {
        let mut chain = vec![self.class_name.as_str()];
        let mut current = self.base.as_deref();
        while let Some(kind) = current {
            chain.push(kind.class_name.as_str());
            current = kind.base.as_deref();
        }
        chain
    }

    /// Returns true if this kind is, or descends from, the class `class_name`.
    #[must_use]
    pub fn is_a(&self, class_name: &str) -> bool {
        self.ancestors().contains(&class_name)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.http_status.as_u16())
    }
}

/// Options accepted by [`ErrorRegistry::register`](crate::ErrorRegistry::register).
#[derive(Debug, Clone, Default)]
pub struct RegisterOptions {
    /// HTTP status; defaults to 400.
    pub http_status: Option<StatusCode>,
    /// Wire name; defaults to the registered name.
    pub error_name: Option<String>,
    /// Class name; defaults to the camel-cased registered name.
    pub class_name: Option<String>,
    /// Name of an already registered kind to descend from.
    pub base: Option<String>,
}

impl RegisterOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP status.
    #[must_use]
    pub fn http_status(mut self, status: StatusCode) -> Self {
        self.http_status = Some(status);
        self
    }

    /// Sets the wire name.
    #[must_use]
    pub fn error_name(mut self, name: impl Into<String>) -> Self {
        self.error_name = Some(name.into());
        self
    }

    /// Sets the class name.
    #[must_use]
    pub fn class_name(mut self, name: impl Into<String>) -> Self {
        self.class_name = Some(name.into());
        self
    }

    /// Sets the base kind by its registered name.
    #[must_use]
    pub fn base(mut self, name: impl Into<String>) -> Self {
        self.base = Some(name.into());
        self
    }
}

/// Converts `snake_case` into `CamelCase`.
///
/// ```
/// assert_eq!(trestle_core::camelize("invalid_version"), "InvalidVersion");
/// ```
#[must_use]
pub fn camelize(name: &str) -> String {
    name.to_upper_camel_case()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_kind() {
        let root = ErrorKind::root();
        assert_eq!(root.name(), "unknown");
        assert_eq!(root.http_status(), StatusCode::BAD_REQUEST);
        assert!(root.is_root());
        assert_eq!(root.ancestors(), vec!["Error"]);
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let parent = Arc::new(ErrorKind::new("payment", "Payment", StatusCode::BAD_REQUEST));
        let child =
            ErrorKind::new("card_declined", "CardDeclined", StatusCode::PAYMENT_REQUIRED)
                .with_base(parent);

        assert_eq!(child.ancestors(), vec!["CardDeclined", "Payment", "Error"]);
        assert!(child.is_a("Payment"));
        assert!(!child.is_a("NotFound"));
    }

    #[test]
    fn test_camelize() {
        assert_eq!(camelize("not_found"), "NotFound");
        assert_eq!(camelize("throttled"), "Throttled");
        assert_eq!(camelize("a__b"), "AB");
        assert_eq!(camelize(""), "");
    }

    #[test]
    fn test_display() {
        let kind = ErrorKind::new("conflict", "Conflict", StatusCode::CONFLICT);
        assert_eq!(kind.to_string(), "conflict (409)");
    }
}
