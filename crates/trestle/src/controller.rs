//! Controllers and their endpoints.
//!
//! A [`Controller`] holds the per-controller configuration that the request
//! cycle consults: the accepted version range, the error mapping, the caching
//! policy, the notifier and the expose hooks. It is built once, when routes
//! are drawn, and shared by every [`Endpoint`] it owns.
//!
//! Controllers inherit explicitly: [`ControllerBuilder::inherit`] copies a
//! parent's configuration, and later builder calls override it.
//!
//! ```
//! use trestle::Controller;
//!
//! let base = Controller::builder("api")
//!     .version(1..=2)
//!     .map_error("RecordNotFound", "not_found")
//!     .build();
//!
//! let users = Controller::builder("users")
//!     .inherit(&base)
//!     .caches(["show"])
//!     .build();
//!
//! assert_eq!(users.version_range().map(|range| range.end()), Some(2));
//! assert!(users.error_mapping().contains("RecordNotFound"));
//! assert!(users.caching().is_cached("show"));
//! ```

use crate::action::{Action, RequestInfo};
use crate::caching::CachePolicy;
use crate::error_handling::{log_failure, render_error, ErrorMapping, MapTo, ResolvedFailure};
use crate::rescue::{NoopNotifier, Notifier, NotifierRegistry};
use crate::settings::Settings;
use crate::versioning::VersionRange;
use serde_json::{Map, Value};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use trestle_core::{ApiError, Exposable, Failure, TrestleResult};
use trestle_middleware::{BoxFuture, Response};

/// Key under which a notifier's identifier is rendered.
pub const ERROR_IDENTIFIER_KEY: &str = "error_identifier";

/// Called with the object before it is converted.
pub type PreProcessHook = Arc<dyn Fn(&dyn Exposable) + Send + Sync>;

/// Called with the envelope metadata before it is rendered.
pub type MetadataHook = Arc<dyn Fn(&mut Map<String, Value>) + Send + Sync>;

/// Called with the rendered response, the object and whether it was singular.
pub type PostProcessHook = Arc<dyn Fn(&mut Response, &dyn Exposable, bool) + Send + Sync>;

/// Returns extra metadata for an error envelope.
pub type ErrorExtrasHook = Arc<dyn Fn(&ResolvedFailure) -> Map<String, Value> + Send + Sync>;

/// Returns the URL of a page of the current resource.
pub type PageUrl = Arc<dyn Fn(&RequestInfo, u64) -> Option<String> + Send + Sync>;

/// A type-erased action handler.
pub type BoxedHandler = Arc<dyn Fn(Action) -> BoxFuture<'static, TrestleResult<Response>> + Send + Sync>;

#[derive(Clone, Default)]
struct Hooks {
    pre_process: Vec<PreProcessHook>,
    metadata: Vec<MetadataHook>,
    post_process: Vec<PostProcessHook>,
    error_extras: Option<ErrorExtrasHook>,
    page_url: Option<PageUrl>,
}

/// Per-controller configuration.
#[derive(Clone)]
pub struct Controller {
    name: String,
    version_range: Option<VersionRange>,
    error_mapping: ErrorMapping,
    caching: CachePolicy,
    notifier: Arc<dyn Notifier>,
    hooks: Hooks,
}

impl Controller {
    /// Starts building a controller.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ControllerBuilder {
        ControllerBuilder::new(name)
    }

    /// A controller with no version range, mapping or caching.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::builder(name).build()
    }

    /// The controller name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The accepted versions; `None` accepts any request.
    #[must_use]
    pub fn version_range(&self) -> Option<VersionRange> {
        self.version_range
    }

    /// The error mapping, inherited entries included.
    #[must_use]
    pub fn error_mapping(&self) -> &ErrorMapping {
        &self.error_mapping
    }

    /// The caching policy.
    #[must_use]
    pub fn caching(&self) -> &CachePolicy {
        &self.caching
    }

    /// The notifier told about unmapped failures.
    #[must_use]
    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// The page URL function, if declared.
    #[must_use]
    pub fn page_url(&self) -> Option<&PageUrl> {
        self.hooks.page_url.as_ref()
    }

    /// Checks a resolved request version against the version range.
    ///
    /// # Errors
    ///
    /// Returns an `invalid_version` failure when the controller declares a
    /// range and the version is missing or outside it.
    pub fn verify_version(&self, requested: Option<u32>) -> Result<Option<u32>, Failure> {
        let Some(range) = self.version_range else {
            return Ok(requested);
        };
        match requested {
            Some(version) if range.contains(version) => Ok(Some(version)),
            _ => {
                tracing::debug!(
                    controller = %self.name,
                    requested = ?requested,
                    accepted = %range,
                    "rejecting request version"
                );
                Err(ApiError::named("invalid_version").into())
            }
        }
    }

    /// Turns a handler failure into an error response.
    ///
    /// Unmapped failures are logged and reported to the notifier first.
    ///
    /// # Errors
    ///
    /// Returns the failure unchanged when it is unmapped and errors pass
    /// through.
    pub fn rescue(
        &self,
        failure: Failure,
        request: &RequestInfo,
        settings: &Settings,
    ) -> Result<Response, Failure> {
        let resolved = self.error_mapping.resolve(failure);

        if resolved.is_unmapped() && settings.pass_through_errors() {
            return Err(resolved.into_failure());
        }

        let mut extras = self
            .hooks
            .error_extras
            .as_ref()
            .map(|hook| hook(&resolved))
            .unwrap_or_default();

        if let ResolvedFailure::Unmapped(failure) = &resolved {
            log_failure(failure);
            if let Some(identifier) = self.notifier.notify(failure, request) {
                extras.insert(ERROR_IDENTIFIER_KEY.into(), Value::String(identifier));
            }
        }

        Ok(render_error(&resolved, settings, extras))
    }

    pub(crate) fn pre_process(&self, object: &dyn Exposable) {
        for hook in &self.hooks.pre_process {
            hook(object);
        }
    }

    pub(crate) fn expose_metadata(&self, metadata: &mut Map<String, Value>) {
        for hook in &self.hooks.metadata {
            hook(metadata);
        }
    }

    pub(crate) fn post_process(&self, response: &mut Response, object: &dyn Exposable, singular: bool) {
        for hook in &self.hooks.post_process {
            hook(response, object, singular);
        }
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("name", &self.name)
            .field("version_range", &self.version_range)
            .field("error_mapping", &self.error_mapping)
            .field("caching", &self.caching)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Controller`].
#[must_use]
pub struct ControllerBuilder {
    controller: Controller,
    notifier_set: bool,
}

impl ControllerBuilder {
    /// Starts a controller named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            controller: Controller {
                name: name.into(),
                version_range: None,
                error_mapping: ErrorMapping::new(),
                caching: CachePolicy::new(),
                notifier: Arc::new(NoopNotifier),
                hooks: Hooks::default(),
            },
            notifier_set: false,
        }
    }

    /// Copies `parent`'s configuration; the name is kept.
    ///
    /// Entries already set on this builder win over the parent's.
    pub fn inherit(mut self, parent: &Controller) -> Self {
        let child = &mut self.controller;
        if child.version_range.is_none() {
            child.version_range = parent.version_range;
        }

        let mut mapping = parent.error_mapping.clone();
        mapping.merge(&child.error_mapping);
        child.error_mapping = mapping;

        child.caching.inherit(&parent.caching);
        if !self.notifier_set {
            child.notifier = Arc::clone(&parent.notifier);
        }

        let mut hooks = parent.hooks.clone();
        hooks.pre_process.append(&mut child.hooks.pre_process);
        hooks.metadata.append(&mut child.hooks.metadata);
        hooks.post_process.append(&mut child.hooks.post_process);
        hooks.error_extras = child.hooks.error_extras.take().or(hooks.error_extras);
        hooks.page_url = child.hooks.page_url.take().or(hooks.page_url);
        child.hooks = hooks;
        self
    }

    /// Accepts `range`, a single version or an inclusive range.
    pub fn version(mut self, range: impl Into<VersionRange>) -> Self {
        self.controller.version_range = Some(range.into());
        self
    }

    /// Maps failures of `class` to the registered kind `kind`.
    pub fn map_error(mut self, class: impl Into<String>, kind: impl Into<String>) -> Self {
        self.controller.error_mapping.insert(class, MapTo::Kind(kind.into()));
        self
    }

    /// Maps failures of `class` through `transform`.
    pub fn map_error_with<F>(mut self, class: impl Into<String>, transform: F) -> Self
    where
        F: Fn(&Failure) -> ApiError + Send + Sync + 'static,
    {
        self.controller
            .error_mapping
            .insert(class, MapTo::Transform(Arc::new(transform)));
        self
    }

    /// Merges a prepared mapping.
    pub fn error_mapping(mut self, mapping: &ErrorMapping) -> Self {
        self.controller.error_mapping.merge(mapping);
        self
    }

    /// Caches the named actions.
    pub fn caches<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.controller.caching = std::mem::take(&mut self.controller.caching).caches(actions);
        self
    }

    /// Overrides the collection max-age.
    pub fn cache_for(mut self, max_age: Duration) -> Self {
        self.controller.caching = std::mem::take(&mut self.controller.caching).cache_for(max_age);
        self
    }

    /// Overrides the `Cache-Control` directives.
    pub fn cache_control<I, S>(mut self, directives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.controller.caching =
            std::mem::take(&mut self.controller.caching).cache_control(directives);
        self
    }

    /// Uses `notifier` for unmapped failures.
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.controller.notifier = notifier;
        self.notifier_set = true;
        self
    }

    /// Uses the notifier registered as `name` in the global registry.
    pub fn use_named_notifier(self, name: &str) -> Self {
        let notifier = NotifierRegistry::global().get(name);
        self.notifier(notifier)
    }

    /// Adds a hook run before conversion.
    pub fn before_expose<F>(mut self, hook: F) -> Self
    where
        F: Fn(&dyn Exposable) + Send + Sync + 'static,
    {
        self.controller.hooks.pre_process.push(Arc::new(hook));
        self
    }

    /// Adds a hook run on the metadata before rendering.
    pub fn on_metadata<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Map<String, Value>) + Send + Sync + 'static,
    {
        self.controller.hooks.metadata.push(Arc::new(hook));
        self
    }

    /// Adds a hook run on the rendered response.
    pub fn after_expose<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Response, &dyn Exposable, bool) + Send + Sync + 'static,
    {
        self.controller.hooks.post_process.push(Arc::new(hook));
        self
    }

    /// Sets the extra metadata added to error envelopes.
    pub fn error_extras<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ResolvedFailure) -> Map<String, Value> + Send + Sync + 'static,
    {
        self.controller.hooks.error_extras = Some(Arc::new(hook));
        self
    }

    /// Sets the page URL function used for pagination links.
    pub fn page_url<F>(mut self, page_url: F) -> Self
    where
        F: Fn(&RequestInfo, u64) -> Option<String> + Send + Sync + 'static,
    {
        self.controller.hooks.page_url = Some(Arc::new(page_url));
        self
    }

    /// Finishes the controller.
    #[must_use]
    pub fn build(self) -> Controller {
        self.controller
    }
}

/// A routed action: a controller and the handler for one of its actions.
#[derive(Clone)]
pub struct Endpoint {
    controller: Arc<Controller>,
    action: String,
    handler: BoxedHandler,
}

impl Endpoint {
    /// Creates an endpoint from an async handler.
    pub fn new<F, Fut>(controller: &Arc<Controller>, action: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Action) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TrestleResult<Response>> + Send + 'static,
    {
        Self {
            controller: Arc::clone(controller),
            action: action.into(),
            handler: Arc::new(move |action: Action| -> BoxFuture<'static, TrestleResult<Response>> {
                Box::pin(handler(action))
            }),
        }
    }

    /// The owning controller.
    #[must_use]
    pub fn controller(&self) -> &Arc<Controller> {
        &self.controller
    }

    /// The action name.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// `controller#action`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}#{}", self.controller.name(), self.action)
    }

    /// Runs the handler.
    pub fn call(&self, action: Action) -> BoxFuture<'static, TrestleResult<Response>> {
        (self.handler)(action)
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("controller", &self.controller.name())
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}
