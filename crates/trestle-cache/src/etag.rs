//! ETag derivation and validation.

use crate::store::{CacheStore, MemoryStore};
use md5::{Digest, Md5};
use regex::Regex;
use std::sync::{Arc, OnceLock};
use trestle_core::CacheIdentity;

/// Token used in derived cache keys for objects without an identifier.
const NEW_MARKER: &str = "new";

/// Returns the lowercase hex MD5 digest of `input`.
#[must_use]
pub fn digest(input: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Wraps an entity tag in double quotes.
#[must_use]
pub fn normalise_etag(etag: &str) -> String {
    format!("\"{etag}\"")
}

fn quoted_tag() -> &'static Regex {
    static QUOTED: OnceLock<Regex> = OnceLock::new();
    QUOTED.get_or_init(|| Regex::new(r#""([^"]+)""#).expect("valid regex"))
}

/// Extracts the quoted entity tags from an `If-None-Match` value.
///
/// Unquoted entries (including `*`) are ignored.
#[must_use]
pub fn parse_if_none_match(header: &str) -> Vec<&str> {
    quoted_tag()
        .captures_iter(header)
        .filter_map(|captures| captures.get(1))
        .map(|tag| tag.as_str())
        .collect()
}

/// Splits an entity tag on its first `:` into cache key and digest.
#[must_use]
pub fn split_etag(etag: &str) -> Option<(&str, &str)> {
    etag.split_once(':')
}

/// Computes, stores and validates entity tags.
#[derive(Debug, Clone)]
pub struct EtagCache {
    store: Arc<dyn CacheStore>,
}

impl Default for EtagCache {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl EtagCache {
    /// Creates a cache over `store`.
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Creates a cache over a fresh [`MemoryStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// The cache key identifying `object`.
    ///
    /// Digest of the object's explicit key when it has one, otherwise of
    /// `"{type}/{id}"` with `new` standing in for unsaved objects.
    #[must_use]
    pub fn cache_key_for(&self, object: &dyn CacheIdentity) -> String {
        if let Some(key) = object.object_key().filter(|key| !key.is_empty()) {
            return digest(&key);
        }
        let suffix = if object.is_new() {
            NEW_MARKER.to_string()
        } else {
            object.id().unwrap_or_else(|| NEW_MARKER.to_string())
        };
        digest(&format!("{}/{suffix}", object.type_name()))
    }

    /// Records the current digest of `object` and returns it.
    pub fn record(&self, object: &dyn CacheIdentity) -> String {
        let key = self.cache_key_for(object);
        self.record_with_key(object, &key)
    }

    /// Records the current digest of `object` under `key` and returns it.
    pub fn record_with_key(&self, object: &dyn CacheIdentity, key: &str) -> String {
        let source = object
            .cache_key()
            .filter(|cache_key| !cache_key.is_empty())
            .unwrap_or_else(|| object.inspect());
        let value = digest(&source);
        tracing::debug!(cache.key = %key, cache.value = %value, "recorded etag");
        self.store.set(key, value.clone());
        value
    }

    /// The unquoted entity tag for `object`, recording it if absent.
    #[must_use]
    pub fn etag_for(&self, object: &dyn CacheIdentity) -> String {
        let key = self.cache_key_for(object);
        let value = match self.store.get(&key).filter(|value| !value.is_empty()) {
            Some(value) => value,
            None => self.record_with_key(object, &key),
        };
        format!("{key}:{value}")
    }

    /// Forgets the stored digest for `object`.
    pub fn remove(&self, object: &dyn CacheIdentity) {
        let key = self.cache_key_for(object);
        tracing::debug!(cache.key = %key, "removed etag");
        self.store.delete(&key);
    }

    /// Returns true if `value` is the digest stored under `key`.
    #[must_use]
    pub fn is_fresh(&self, key: &str, value: &str) -> bool {
        self.store.get(key).is_some_and(|stored| stored == value)
    }

    /// Returns true if any entity tag in an `If-None-Match` value is fresh.
    ///
    /// Tags without a `:` separator never match.
    #[must_use]
    pub fn matches_any(&self, if_none_match: &str) -> bool {
        parse_if_none_match(if_none_match)
            .into_iter()
            .filter_map(split_etag)
            .any(|(key, value)| {
                tracing::trace!(cache.key = %key, cache.value = %value, "checking etag");
                self.is_fresh(key, value)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Post {
        id: Option<u32>,
        revision: AtomicU32,
        explicit_key: Option<&'static str>,
    }

    impl Post {
        fn saved(id: u32) -> Self {
            Self {
                id: Some(id),
                revision: AtomicU32::new(1),
                explicit_key: None,
            }
        }
    }

    impl CacheIdentity for Post {
        fn type_name(&self) -> &str {
            "Post"
        }

        fn id(&self) -> Option<String> {
            self.id.map(|id| id.to_string())
        }

        fn object_key(&self) -> Option<String> {
            self.explicit_key.map(str::to_string)
        }

        fn cache_key(&self) -> Option<String> {
            let id = self.id?;
            Some(format!("posts/{id}-{}", self.revision.load(Ordering::SeqCst)))
        }

        fn inspect(&self) -> String {
            format!("#<Post id: {:?}>", self.id)
        }
    }

    #[test]
    fn test_digest_is_md5_hex() {
        assert_eq!(digest(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(digest("abc"), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(digest("Post/1"), digest("Post/1"));
        assert_eq!(digest("Post/1").len(), 32);
    }

    #[test]
    fn test_cache_key_derivation() {
        let cache = EtagCache::in_memory();
        assert_eq!(cache.cache_key_for(&Post::saved(1)), digest("Post/1"));

        let unsaved = Post {
            id: None,
            revision: AtomicU32::new(0),
            explicit_key: None,
        };
        assert_eq!(cache.cache_key_for(&unsaved), digest("Post/new"));

        let keyed = Post {
            explicit_key: Some("custom"),
            ..Post::saved(2)
        };
        assert_eq!(cache.cache_key_for(&keyed), digest("custom"));
    }

    #[test]
    fn test_record_prefers_cache_key_then_inspect() {
        let cache = EtagCache::in_memory();
        assert_eq!(cache.record(&Post::saved(1)), digest("posts/1-1"));

        let unsaved = Post {
            id: None,
            revision: AtomicU32::new(0),
            explicit_key: None,
        };
        assert_eq!(cache.record(&unsaved), digest("#<Post id: None>"));
    }

    #[test]
    fn test_etag_for_is_idempotent() {
        let cache = EtagCache::in_memory();
        let post = Post::saved(3);
        let first = cache.etag_for(&post);
        let second = cache.etag_for(&post);
        assert_eq!(first, second);
        assert_eq!(
            first,
            format!("{}:{}", digest("Post/3"), digest("posts/3-1"))
        );
    }

    #[test]
    fn test_etag_changes_after_revision_and_remove() {
        let cache = EtagCache::in_memory();
        let post = Post::saved(4);
        let before = cache.etag_for(&post);

        post.revision.store(2, Ordering::SeqCst);
        assert_eq!(cache.etag_for(&post), before);

        cache.remove(&post);
        let after = cache.etag_for(&post);
        assert_ne!(after, before);
        cache.remove(&post);
        cache.remove(&post);
    }

    #[test]
    fn test_parse_if_none_match() {
        assert_eq!(
            parse_if_none_match(r#""a:b", W/"c:d", *"#),
            vec!["a:b", "c:d"]
        );
        assert!(parse_if_none_match("").is_empty());
        assert!(parse_if_none_match("*").is_empty());
    }

    #[test]
    fn test_split_etag_on_first_colon() {
        assert_eq!(split_etag("k:v:w"), Some(("k", "v:w")));
        assert_eq!(split_etag("nocolon"), None);
    }

    #[test]
    fn test_matches_any() {
        let cache = EtagCache::in_memory();
        let post = Post::saved(5);
        let etag = cache.etag_for(&post);

        assert!(cache.matches_any(&normalise_etag(&etag)));
        assert!(cache.matches_any(&format!("\"x:y\", {}", normalise_etag(&etag))));
        assert!(!cache.matches_any("\"x:y\""));
        assert!(!cache.matches_any(&etag));
        assert!(!cache.matches_any(&normalise_etag(&cache.cache_key_for(&post))));
    }

    #[test]
    fn test_normalise_etag_quotes() {
        assert_eq!(normalise_etag("a:b"), "\"a:b\"");
    }
}
