//! The process-wide error registry.
//!
//! The registry is read on every failed request and written at startup, so it
//! sits behind a [`parking_lot::RwLock`]. Re-registering a name replaces the
//! previous kind without touching other entries.

use crate::kind::{camelize, ErrorKind, RegisterOptions};
use http::StatusCode;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

static GLOBAL: OnceLock<ErrorRegistry> = OnceLock::new();

/// Errors raised while registering error kinds.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The requested base is not a registered kind.
    #[error("base must be a registered error kind, got '{0}'")]
    UnknownBase(String),

    /// The kind name was empty.
    #[error("error kind name must not be empty")]
    EmptyName,
}

/// Table of error kinds, keyed by wire name.
#[derive(Debug)]
pub struct ErrorRegistry {
    kinds: RwLock<IndexMap<String, Arc<ErrorKind>>>,
    root: Arc<ErrorKind>,
}

impl Default for ErrorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl ErrorRegistry {
    /// Creates a registry with no kinds besides the root.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            kinds: RwLock::new(IndexMap::new()),
            root: Arc::new(ErrorKind::root()),
        }
    }

    /// Creates a registry seeded with the built-in kinds.
    ///
    /// | Name | Status |
    /// |------|--------|
    /// | `throttled` | 503 |
    /// | `unauthenticated` | 401 |
    /// | `invalid_version` | 404 |
    /// | `not_implemented` | 503 |
    /// | `not_found` | 404 |
    /// | `bad_request` | 400 |
    /// | `conflict` | 409 |
    /// | `forbidden` | 403 |
    /// | `invalid_resource` | 422 |
    #[must_use]
    pub fn with_builtins() -> Self {
        let registry = Self::empty();
        let builtins = [
            ("throttled", StatusCode::SERVICE_UNAVAILABLE),
            ("unauthenticated", StatusCode::UNAUTHORIZED),
            ("invalid_version", StatusCode::NOT_FOUND),
            ("not_implemented", StatusCode::SERVICE_UNAVAILABLE),
            ("not_found", StatusCode::NOT_FOUND),
            ("bad_request", StatusCode::BAD_REQUEST),
            ("conflict", StatusCode::CONFLICT),
            ("forbidden", StatusCode::FORBIDDEN),
            ("invalid_resource", StatusCode::UNPROCESSABLE_ENTITY),
        ];
        for (name, status) in builtins {
            let kind = ErrorKind::new(name, camelize(name), status).with_base(registry.root());
            registry.insert(kind);
        }
        registry
    }

    /// Returns the process-wide registry, seeding it with built-ins on first use.
    pub fn global() -> &'static ErrorRegistry {
        GLOBAL.get_or_init(Self::with_builtins)
    }

    /// The root kind (`unknown`, 400) used when a lookup misses.
    #[must_use]
    pub fn root(&self) -> Arc<ErrorKind> {
        Arc::clone(&self.root)
    }

    /// Registers a new kind and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownBase`] if `options.base` matches neither
    /// the wire name nor the class name of a registered kind.
    pub fn register(
        &self,
        name: &str,
        options: RegisterOptions,
    ) -> Result<Arc<ErrorKind>, RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }

        let base = match options.base.as_deref() {
            None => self.root(),
            Some(base) if base == self.root.name() || base == self.root.class_name() => {
                self.root()
            }
            Some(base) => self
                .lookup(base)
                .or_else(|| self.lookup_class(base))
                .ok_or_else(|| RegistryError::UnknownBase(base.to_string()))?,
        };

        let error_name = options.error_name.unwrap_or_else(|| name.to_string());
        let class_name = options.class_name.unwrap_or_else(|| camelize(name));
        let status = options.http_status.unwrap_or(StatusCode::BAD_REQUEST);

        let kind = ErrorKind::new(error_name, class_name, status).with_base(base);
        tracing::debug!(
            error.name = kind.name(),
            error.class = kind.class_name(),
            http.status_code = kind.http_status().as_u16(),
            "registered error kind"
        );
        Ok(self.insert(kind))
    }

    fn insert(&self, kind: ErrorKind) -> Arc<ErrorKind> {
        let kind = Arc::new(kind);
        self.kinds
            .write()
            .insert(kind.name().to_string(), Arc::clone(&kind));
        kind
    }

    /// Looks up a kind by wire name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Arc<ErrorKind>> {
        self.kinds.read().get(name).cloned()
    }

    /// Looks up a kind by wire name, falling back to the root kind.
    #[must_use]
    pub fn lookup_or_root(&self, name: &str) -> Arc<ErrorKind> {
        self.lookup(name).unwrap_or_else(|| self.root())
    }

    /// Looks up a kind by class name.
    #[must_use]
    pub fn lookup_class(&self, class_name: &str) -> Option<Arc<ErrorKind>> {
        self.kinds
            .read()
            .values()
            .find(|kind| kind.class_name() == class_name)
            .cloned()
    }

    /// Returns a copy of every registered kind in registration order.
    ///
    /// Mutating the returned map never affects the registry.
    #[must_use]
    pub fn all(&self) -> IndexMap<String, Arc<ErrorKind>> {
        self.kinds.read().clone()
    }

    /// Number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.read().len()
    }

    /// Returns true if no kinds are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_builtins_are_registered() {
        let registry = ErrorRegistry::with_builtins();
        let expected = [
            ("throttled", 503),
            ("unauthenticated", 401),
            ("invalid_version", 404),
            ("not_implemented", 503),
            ("not_found", 404),
            ("bad_request", 400),
            ("conflict", 409),
            ("forbidden", 403),
            ("invalid_resource", 422),
        ];
        for (name, status) in expected {
            let kind = registry.lookup(name).unwrap();
            assert_eq!(kind.name(), name);
            assert_eq!(kind.http_status().as_u16(), status);
        }
        assert_eq!(registry.len(), expected.len());
    }

    #[test]
    fn test_lookup_roundtrip_for_all_kinds() {
        let registry = ErrorRegistry::with_builtins();
        for (name, kind) in registry.all() {
            assert_eq!(registry.lookup(&name).unwrap(), kind);
            assert!((100..=599).contains(&kind.http_status().as_u16()));
        }
    }

    #[test]
    fn test_unknown_lookup_is_absent() {
        let registry = ErrorRegistry::with_builtins();
        assert!(registry.lookup("no_such_error").is_none());
        assert_eq!(registry.lookup_or_root("no_such_error").name(), "unknown");
    }

    #[test]
    fn test_register_defaults() {
        let registry = ErrorRegistry::with_builtins();
        let kind = registry
            .register("payment_required", RegisterOptions::new())
            .unwrap();

        assert_eq!(kind.name(), "payment_required");
        assert_eq!(kind.class_name(), "PaymentRequired");
        assert_eq!(kind.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(registry.lookup("payment_required").unwrap(), kind);
    }

    #[test]
    fn test_register_with_options() {
        let registry = ErrorRegistry::with_builtins();
        let kind = registry
            .register(
                "gone",
                RegisterOptions::new()
                    .http_status(StatusCode::GONE)
                    .error_name("resource_gone")
                    .class_name("ResourceGone")
                    .base("not_found"),
            )
            .unwrap();

        assert_eq!(kind.name(), "resource_gone");
        assert_eq!(kind.http_status(), StatusCode::GONE);
        assert_eq!(kind.ancestors(), vec!["ResourceGone", "NotFound", "Error"]);
        assert!(registry.lookup("resource_gone").is_some());
        assert!(registry.lookup("gone").is_none());
    }

    #[test]
    fn test_register_base_by_class_name() {
        let registry = ErrorRegistry::with_builtins();
        let kind = registry
            .register("record_missing", RegisterOptions::new().base("NotFound"))
            .unwrap();
        assert_eq!(kind.ancestors(), vec!["RecordMissing", "NotFound", "Error"]);
    }

    #[test]
    fn test_register_unknown_base_fails() {
        let registry = ErrorRegistry::with_builtins();
        let err = registry
            .register("child", RegisterOptions::new().base("missing"))
            .unwrap_err();
        assert_eq!(err, RegistryError::UnknownBase("missing".to_string()));
        assert!(registry.lookup("child").is_none());
    }

    #[test]
    fn test_register_empty_name_fails() {
        let registry = ErrorRegistry::empty();
        assert_eq!(
            registry.register("", RegisterOptions::new()),
            Err(RegistryError::EmptyName)
        );
    }

    #[test]
    fn test_reregistration_overwrites_only_that_name() {
        let registry = ErrorRegistry::with_builtins();
        let before_not_found = registry.lookup("not_found").unwrap();

        registry
            .register(
                "conflict",
                RegisterOptions::new().http_status(StatusCode::PRECONDITION_FAILED),
            )
            .unwrap();

        assert_eq!(
            registry.lookup("conflict").unwrap().http_status(),
            StatusCode::PRECONDITION_FAILED
        );
        assert_eq!(registry.lookup("not_found").unwrap(), before_not_found);
    }

    #[test]
    fn test_all_is_a_defensive_copy() {
        let registry = ErrorRegistry::with_builtins();
        let mut copy = registry.all();
        copy.clear();
        assert!(!registry.is_empty());
        assert!(registry.lookup("throttled").is_some());
    }

    #[test]
    fn test_lookup_class() {
        let registry = ErrorRegistry::with_builtins();
        let kind = registry.lookup_class("InvalidVersion").unwrap();
        assert_eq!(kind.name(), "invalid_version");
    }

    #[test]
    fn test_global_registry_has_builtins() {
        assert!(ErrorRegistry::global().lookup("forbidden").is_some());
    }

    proptest! {
        #[test]
        fn prop_register_then_lookup(name in "[a-z][a-z_]{0,20}", status in 400u16..600) {
            let registry = ErrorRegistry::with_builtins();
            let status = StatusCode::from_u16(status).unwrap();
            registry.register(&name, RegisterOptions::new().http_status(status)).unwrap();
            let kind = registry.lookup(&name).unwrap();
            prop_assert_eq!(kind.name(), name.as_str());
            prop_assert_eq!(kind.http_status(), status);
        }
    }
}
