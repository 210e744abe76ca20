//! Scope-aware route matching.

use crate::error::RouteError;
use crate::params::{RouteParams, VERSION_PARAM};
use crate::scope::{ApiScope, Scope, VersionConstraint};
use crate::version::VersionPrefix;
use http::Method;

/// A matched route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a, T> {
    /// The routed value.
    pub value: &'a T,
    /// Captured parameters, the raw version token included.
    pub params: RouteParams,
    /// The prefix descriptor of the matching scope.
    pub prefix: Option<&'a VersionPrefix>,
}

/// Routes requests through version scopes.
///
/// Scopes are tried in the order they were mounted. A scope whose version
/// constraint rejects the first path segment is skipped entirely.
///
/// ```rust
/// use trestle_router::{ApiScope, VersionedRouter};
/// use http::Method;
///
/// let router = VersionedRouter::new()
///     .mount(ApiScope::new().version(1).get("/users/{id}", "show"))
///     .unwrap();
///
/// let matched = router.match_route(&Method::GET, "/1/users/9").unwrap();
/// assert_eq!(*matched.value, "show");
/// assert_eq!(matched.params.version(), Some("1"));
/// assert_eq!(matched.params.get("id"), Some("9"));
///
/// assert!(router.match_route(&Method::GET, "/2/users/9").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct VersionedRouter<T> {
    scopes: Vec<Scope<T>>,
}

impl<T> Default for VersionedRouter<T> {
    fn default() -> Self {
        Self { scopes: Vec::new() }
    }
}

impl<T> VersionedRouter<T> {
    /// Creates a router with no scopes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and mounts a scope.
    ///
    /// # Errors
    ///
    /// Returns the [`RouteError`] raised by [`ApiScope::build`].
    pub fn mount(mut self, scope: ApiScope<T>) -> Result<Self, RouteError> {
        self.scopes.push(scope.build()?);
        Ok(self)
    }

    /// The mounted scopes.
    #[must_use]
    pub fn scopes(&self) -> &[Scope<T>] {
        &self.scopes
    }

    /// Number of routes across all scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.iter().map(|scope| scope.routes().len()).sum()
    }

    /// Returns true if no routes are mounted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Matches a method and path.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, T>> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let (token, rest) = parts.split_first()?;
        let matched = self.find(method, token, rest, |constraint| constraint.matches(token));
        if matched.is_none() {
            tracing::trace!(%method, path, "no versioned route matched");
        }
        matched
    }

    /// Matches a method and an unversioned path against a bare version
    /// taken from outside the path.
    ///
    /// Scope prefixes do not apply: a scope is tried when it declares
    /// `version`, whether its prefix is optional or required.
    ///
    /// ```rust
    /// use trestle_router::{ApiScope, VersionedRouter};
    /// use http::Method;
    ///
    /// let router = VersionedRouter::new()
    ///     .mount(ApiScope::new().version(2).require_prefix("v").get("/users", "index"))
    ///     .unwrap();
    ///
    /// let matched = router.match_version(&Method::GET, "2", "/users").unwrap();
    /// assert_eq!(*matched.value, "index");
    /// assert_eq!(matched.params.version(), Some("2"));
    /// assert!(matched.prefix.is_none());
    /// ```
    #[must_use]
    pub fn match_version(&self, method: &Method, version: &str, path: &str) -> Option<RouteMatch<'_, T>> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let matched = self
            .find(method, version, &parts, |constraint| constraint.declares(version))
            .map(|matched| RouteMatch {
                prefix: None,
                ..matched
            });
        if matched.is_none() {
            tracing::trace!(%method, version, path, "no route matched the version");
        }
        matched
    }

    fn find(
        &self,
        method: &Method,
        token: &str,
        rest: &[&str],
        accepts: impl Fn(&VersionConstraint) -> bool,
    ) -> Option<RouteMatch<'_, T>> {
        for scope in self.scopes.iter().filter(|scope| accepts(scope.constraint())) {
            for route in scope.routes() {
                if route.method() != method {
                    continue;
                }
                let mut params = RouteParams::new();
                params.push(VERSION_PARAM, token);
                if route.pattern().matches(rest, &mut params) {
                    return Some(RouteMatch {
                        value: route.value(),
                        params,
                        prefix: scope.constraint().prefix(),
                    });
                }
            }
        }
        None
    }

    /// Methods routed for `path`, for building `405` responses.
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let Some((token, rest)) = parts.split_first() else {
            return Vec::new();
        };
        let mut methods = Vec::new();
        for scope in self.scopes.iter().filter(|s| s.constraint().matches(token)) {
            for route in scope.routes() {
                let mut params = RouteParams::new();
                if route.pattern().matches(rest, &mut params) && !methods.contains(route.method()) {
                    methods.push(route.method().clone());
                }
            }
        }
        methods
    }
}
