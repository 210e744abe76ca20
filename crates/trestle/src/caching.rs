//! Per-controller response caching.
//!
//! Cached actions add caching headers after an object is exposed. A single
//! record gets an `ETag` derived from its cache identity, which the
//! conditional GET stage later checks. A collection has no stable identity and
//! gets time-based caching instead: `Cache-Control: max-age=N, public`.

use crate::settings::Settings;
use http::header::{CACHE_CONTROL, ETAG};
use http::HeaderValue;
use std::collections::HashSet;
use std::time::Duration;
use trestle_cache::normalise_etag;
use trestle_core::Exposable;
use trestle_middleware::Response;

/// Which actions of a controller are cached, and how.
#[derive(Debug, Clone, Default)]
pub struct CachePolicy {
    actions: HashSet<String>,
    cache_for: Option<Duration>,
    cache_control: Option<Vec<String>>,
}

impl CachePolicy {
    /// Creates a policy with no cached actions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `actions` as cached.
    #[must_use]
    pub fn caches<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions.extend(actions.into_iter().map(Into::into));
        self
    }

    /// Overrides the collection max-age for this controller.
    #[must_use]
    pub fn cache_for(mut self, max_age: Duration) -> Self {
        self.cache_for = Some(max_age);
        self
    }

    /// Overrides the `Cache-Control` directives for this controller.
    #[must_use]
    pub fn cache_control<I, S>(mut self, directives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cache_control = Some(directives.into_iter().map(Into::into).collect());
        self
    }

    /// Returns true if `action` is cached.
    #[must_use]
    pub fn is_cached(&self, action: &str) -> bool {
        self.actions.contains(action)
    }

    /// Returns true if no action is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Adds a parent policy's actions; the parent's overrides apply where
    /// this policy has none.
    pub fn inherit(&mut self, parent: &CachePolicy) {
        self.actions.extend(parent.actions.iter().cloned());
        if self.cache_for.is_none() {
            self.cache_for = parent.cache_for;
        }
        if self.cache_control.is_none() {
            self.cache_control.clone_from(&parent.cache_control);
        }
    }

    /// The collection max-age: this policy's override or the configured one.
    #[must_use]
    pub fn max_age(&self, settings: &Settings) -> Duration {
        self.cache_for.unwrap_or_else(|| settings.max_age())
    }

    /// The `Cache-Control` directives: this policy's override or the configured ones.
    #[must_use]
    pub fn directives<'a>(&'a self, settings: &'a Settings) -> &'a [String] {
        self.cache_control
            .as_deref()
            .unwrap_or_else(|| settings.cache_control())
    }

    /// Adds caching headers for an exposed `object`.
    pub fn apply(
        &self,
        response: &mut Response,
        settings: &Settings,
        object: &dyn Exposable,
        singular: bool,
    ) {
        let mut directives = self.directives(settings).to_vec();

        if singular {
            match object.cache_identity() {
                Some(identity) => {
                    let etag = normalise_etag(&settings.cache().etag_for(identity));
                    insert_header(response, ETAG, &etag);
                }
                None => tracing::debug!("exposed object has no cache identity, skipping etag"),
            }
        } else {
            directives.insert(0, format!("max-age={}", self.max_age(settings).as_secs()));
        }

        if !directives.is_empty() {
            insert_header(response, CACHE_CONTROL, &directives.join(", "));
        }
    }
}

fn insert_header(response: &mut Response, name: http::HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            response.headers_mut().insert(name, value);
        }
        Err(e) => tracing::warn!(header = %name, error = %e, "skipping invalid caching header"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use serde_json::{json, Value};
    use trestle_core::CacheIdentity;
    use trestle_middleware::ResponseExt;

    struct Widget {
        id: u64,
        version: u32,
    }

    impl CacheIdentity for Widget {
        fn type_name(&self) -> &str {
            "Widget"
        }

        fn id(&self) -> Option<String> {
            Some(self.id.to_string())
        }

        fn cache_key(&self) -> Option<String> {
            Some(format!("widgets/{}-{}", self.id, self.version))
        }

        fn inspect(&self) -> String {
            format!("#<Widget id: {}>", self.id)
        }
    }

    impl Exposable for Widget {
        fn to_json(&self) -> Value {
            json!({"id": self.id})
        }

        fn cache_identity(&self) -> Option<&dyn CacheIdentity> {
            Some(self)
        }
    }

    fn response() -> Response {
        Response::json(StatusCode::OK, &json!({}))
    }

    #[test]
    fn test_singular_gets_etag() {
        let settings = Settings::for_environment("production");
        let policy = CachePolicy::new().caches(["show"]);
        let widget = Widget { id: 1, version: 1 };
        let mut res = response();
        policy.apply(&mut res, &settings, &widget, true);

        let expected = normalise_etag(&settings.cache().etag_for(&widget));
        assert_eq!(res.headers()[ETAG], expected.as_str());
        assert_eq!(res.headers()[CACHE_CONTROL], "public");
    }

    #[test]
    fn test_collection_gets_max_age() {
        let settings = Settings::for_environment("production");
        let policy = CachePolicy::new().caches(["index"]);
        let mut res = response();
        policy.apply(&mut res, &settings, &json!([1, 2]), false);

        assert_eq!(res.headers()[CACHE_CONTROL], "max-age=300, public");
        assert!(res.headers().get(ETAG).is_none());
    }

    #[test]
    fn test_singular_without_identity_has_no_etag() {
        let settings = Settings::for_environment("production");
        let mut res = response();
        CachePolicy::new().apply(&mut res, &settings, &json!({"a": 1}), true);
        assert!(res.headers().get(ETAG).is_none());
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::for_environment("production");
        let policy = CachePolicy::new()
            .cache_for(Duration::from_secs(60))
            .cache_control(["private"]);
        let mut res = response();
        policy.apply(&mut res, &settings, &json!([]), false);
        assert_eq!(res.headers()[CACHE_CONTROL], "max-age=60, private");
    }

    #[test]
    fn test_inherit() {
        let parent = CachePolicy::new().caches(["index"]).cache_for(Duration::from_secs(10));
        let mut child = CachePolicy::new().caches(["show"]);
        child.inherit(&parent);
        assert!(child.is_cached("index"));
        assert!(child.is_cached("show"));
        assert!(!child.is_cached("create"));
        assert_eq!(
            child.max_age(&Settings::for_environment("test")),
            Duration::from_secs(10)
        );
    }
}
