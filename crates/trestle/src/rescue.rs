//! Exception notifiers.
//!
//! When an unmapped failure is rescued, the controller's notifier is told
//! about it before the error envelope is rendered. A notifier may return an
//! error identifier, which is echoed to the client as `error_identifier`.
//!
//! Notifiers are chosen by name from a [`NotifierRegistry`]:
//!
//! | Name | Behaviour |
//! |------|-----------|
//! | `default` | Does nothing |
//! | `tracing` | Logs the failure and returns a fresh UUID v7 identifier |
//!
//! Applications register further names for their error tracking services.

use crate::action::RequestInfo;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use trestle_core::Failure;
use uuid::Uuid;

static GLOBAL: OnceLock<NotifierRegistry> = OnceLock::new();

/// Name of the no-op notifier.
pub const DEFAULT_NOTIFIER: &str = "default";

/// Name of the logging notifier.
pub const TRACING_NOTIFIER: &str = "tracing";

/// Receives failures that reached the rescue path.
pub trait Notifier: Send + Sync {
    /// Reports `failure`; the returned identifier is sent to the client.
    fn notify(&self, failure: &Failure, request: &RequestInfo) -> Option<String>;
}

impl<F> Notifier for F
where
    F: Fn(&Failure, &RequestInfo) -> Option<String> + Send + Sync,
{
    fn notify(&self, failure: &Failure, request: &RequestInfo) -> Option<String> {
        self(failure, request)
    }
}

/// Ignores every failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _failure: &Failure, _request: &RequestInfo) -> Option<String> {
        None
    }
}

/// Logs failures at `error` level and tags each with a UUID v7 identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, failure: &Failure, request: &RequestInfo) -> Option<String> {
        let identifier = Uuid::now_v7().to_string();
        tracing::error!(
            error.identifier = %identifier,
            error.class = failure.class_name(),
            request_id = %request.request_id,
            http.method = %request.method,
            http.path = request.uri.path(),
            "notified failure: {}",
            failure.message()
        );
        Some(identifier)
    }
}

/// Named notifiers.
pub struct NotifierRegistry {
    notifiers: RwLock<HashMap<String, Arc<dyn Notifier>>>,
    default: Arc<dyn Notifier>,
}

impl Default for NotifierRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl NotifierRegistry {
    /// Creates a registry holding `default` and `tracing`.
    #[must_use]
    pub fn with_builtins() -> Self {
        let default: Arc<dyn Notifier> = Arc::new(NoopNotifier);
        let mut notifiers: HashMap<String, Arc<dyn Notifier>> = HashMap::new();
        notifiers.insert(DEFAULT_NOTIFIER.to_string(), Arc::clone(&default));
        notifiers.insert(TRACING_NOTIFIER.to_string(), Arc::new(TracingNotifier));
        Self {
            notifiers: RwLock::new(notifiers),
            default,
        }
    }

    /// The process-wide registry.
    pub fn global() -> &'static NotifierRegistry {
        GLOBAL.get_or_init(Self::with_builtins)
    }

    /// Registers or replaces a notifier.
    pub fn register(&self, name: impl Into<String>, notifier: Arc<dyn Notifier>) {
        self.notifiers.write().insert(name.into(), notifier);
    }

    /// The notifier registered as `name`, or the default notifier.
    #[must_use]
    pub fn get(&self, name: &str) -> Arc<dyn Notifier> {
        match self.notifiers.read().get(name) {
            Some(notifier) => Arc::clone(notifier),
            None => {
                tracing::warn!(notifier = name, "unknown notifier, using default");
                Arc::clone(&self.default)
            }
        }
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.notifiers.read().contains_key(name)
    }

    /// The no-op notifier.
    #[must_use]
    pub fn default_notifier(&self) -> Arc<dyn Notifier> {
        Arc::clone(&self.default)
    }
}

impl fmt::Debug for NotifierRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self.notifiers.read().keys().cloned().collect();
        names.sort();
        f.debug_struct("NotifierRegistry")
            .field("notifiers", &names)
            .finish_non_exhaustive()
    }
}
