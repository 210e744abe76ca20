//! Versioned route scopes.

use crate::error::RouteError;
use crate::pattern::RoutePattern;
use crate::version::VersionPrefix;
use http::Method;
use std::fmt::Display;

/// Matches the version path segment against a scope's declared versions.
///
/// A segment that is not one of the declared tokens (after prefix handling)
/// makes the whole scope fall through, independently of any per-controller
/// version range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    versions: Vec<String>,
    prefix: Option<VersionPrefix>,
}

impl VersionConstraint {
    /// The declared version tokens, deduplicated in declaration order.
    #[must_use]
    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    /// The prefix descriptor, if any.
    #[must_use]
    pub fn prefix(&self) -> Option<&VersionPrefix> {
        self.prefix.as_ref()
    }

    /// Returns true if `segment` names a declared version.
    #[must_use]
    pub fn matches(&self, segment: &str) -> bool {
        let bare = match &self.prefix {
            Some(prefix) => match prefix.strip(segment) {
                Some(bare) => bare,
                None => return false,
            },
            None => segment,
        };
        self.declares(bare)
    }

    /// Returns true if the bare `version` is declared, ignoring any prefix.
    #[must_use]
    pub fn declares(&self, version: &str) -> bool {
        self.versions.iter().any(|declared| declared == version)
    }
}

/// A route declared inside a scope.
#[derive(Debug, Clone)]
pub struct ScopedRoute<T> {
    pub(crate) method: Method,
    pub(crate) pattern: RoutePattern,
    pub(crate) value: T,
}

impl<T> ScopedRoute<T> {
    /// The route method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The route pattern, relative to the version segment.
    #[must_use]
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// The routed value.
    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }
}

/// Builder for a group of routes under a version path segment.
///
/// ```rust
/// use trestle_router::ApiScope;
///
/// let scope = ApiScope::new()
///     .versions([1, 2])
///     .allow_prefix("v")
///     .get("/users/{id}", "show_user")
///     .build()
///     .unwrap();
///
/// assert!(scope.constraint().matches("v2"));
/// assert!(scope.constraint().matches("1"));
/// assert!(!scope.constraint().matches("3"));
/// ```
#[derive(Debug, Clone)]
pub struct ApiScope<T> {
    versions: Vec<String>,
    prefix: Option<VersionPrefix>,
    routes: Vec<(Method, String, T)>,
}

impl<T> Default for ApiScope<T> {
    fn default() -> Self {
        Self {
            versions: Vec::new(),
            prefix: None,
            routes: Vec::new(),
        }
    }
}

impl<T> ApiScope<T> {
    /// Creates an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a single version.
    #[must_use]
    pub fn version(mut self, version: impl Display) -> Self {
        self.versions.push(version.to_string());
        self
    }

    /// Declares several versions.
    #[must_use]
    pub fn versions<I>(mut self, versions: I) -> Self
    where
        I: IntoIterator,
        I::Item: Display,
    {
        self.versions
            .extend(versions.into_iter().map(|version| version.to_string()));
        self
    }

    /// Allows a literal prefix before the version token.
    #[must_use]
    pub fn allow_prefix(mut self, text: impl Into<String>) -> Self {
        self.prefix = Some(VersionPrefix::optional(text));
        self
    }

    /// Requires a literal prefix before the version token.
    #[must_use]
    pub fn require_prefix(mut self, text: impl Into<String>) -> Self {
        self.prefix = Some(VersionPrefix::required(text));
        self
    }

    /// Adds a route for `method`.
    #[must_use]
    pub fn route(mut self, method: Method, path: impl Into<String>, value: T) -> Self {
        self.routes.push((method, path.into(), value));
        self
    }

    /// Adds a GET route.
    #[must_use]
    pub fn get(self, path: impl Into<String>, value: T) -> Self {
        self.route(Method::GET, path, value)
    }

    /// Adds a POST route.
    #[must_use]
    pub fn post(self, path: impl Into<String>, value: T) -> Self {
        self.route(Method::POST, path, value)
    }

    /// Adds a PUT route.
    #[must_use]
    pub fn put(self, path: impl Into<String>, value: T) -> Self {
        self.route(Method::PUT, path, value)
    }

    /// Adds a PATCH route.
    #[must_use]
    pub fn patch(self, path: impl Into<String>, value: T) -> Self {
        self.route(Method::PATCH, path, value)
    }

    /// Adds a DELETE route.
    #[must_use]
    pub fn delete(self, path: impl Into<String>, value: T) -> Self {
        self.route(Method::DELETE, path, value)
    }

    /// Validates the declaration.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidVersion`] for a version that is not all
    /// digits, [`RouteError::NoVersions`] when none were declared, and
    /// [`RouteError::InvalidPath`] for an unparsable route path.
    pub fn build(self) -> Result<Scope<T>, RouteError> {
        for version in &self.versions {
            if version.is_empty() || !version.bytes().all(|b| b.is_ascii_digit()) {
                return Err(RouteError::InvalidVersion(version.clone()));
            }
        }
        if self.versions.is_empty() {
            return Err(RouteError::NoVersions);
        }

        let mut versions: Vec<String> = Vec::with_capacity(self.versions.len());
        for version in self.versions {
            if !versions.contains(&version) {
                versions.push(version);
            }
        }

        let routes = self
            .routes
            .into_iter()
            .map(|(method, path, value)| {
                Ok(ScopedRoute {
                    method,
                    pattern: RoutePattern::parse(&path)?,
                    value,
                })
            })
            .collect::<Result<Vec<_>, RouteError>>()?;

        tracing::debug!(versions = ?versions, routes = routes.len(), "drew api scope");

        Ok(Scope {
            constraint: VersionConstraint {
                versions,
                prefix: self.prefix,
            },
            routes,
        })
    }
}

/// A validated scope: a version constraint and its routes.
#[derive(Debug, Clone)]
pub struct Scope<T> {
    constraint: VersionConstraint,
    routes: Vec<ScopedRoute<T>>,
}

impl<T> Scope<T> {
    /// The scope's version constraint.
    #[must_use]
    pub fn constraint(&self) -> &VersionConstraint {
        &self.constraint
    }

    /// The scope's routes, in declaration order.
    #[must_use]
    pub fn routes(&self) -> &[ScopedRoute<T>] {
        &self.routes
    }
}
