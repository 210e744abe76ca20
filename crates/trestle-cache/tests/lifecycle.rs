//! Save and destroy lifecycle against a custom store.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use trestle_cache::{normalise_etag, CacheStore, Cacheable, EtagCache};
use trestle_core::CacheIdentity;

#[derive(Debug, Default)]
struct RecordingStore {
    entries: Mutex<HashMap<String, String>>,
    writes: Mutex<Vec<String>>,
}

impl CacheStore for RecordingStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.writes.lock().push(key.to_string());
        self.entries.lock().insert(key.to_string(), value);
    }

    fn delete(&self, key: &str) {
        self.entries.lock().remove(key);
    }
}

struct Widget {
    id: u32,
    updated_at: u64,
}

impl CacheIdentity for Widget {
    fn type_name(&self) -> &str {
        "Widget"
    }

    fn id(&self) -> Option<String> {
        Some(self.id.to_string())
    }

    fn cache_key(&self) -> Option<String> {
        Some(format!("widgets/{}-{}", self.id, self.updated_at))
    }

    fn inspect(&self) -> String {
        format!("#<Widget id: {}>", self.id)
    }
}

#[test]
fn test_save_then_conditional_match() {
    let store = Arc::new(RecordingStore::default());
    let cache = EtagCache::new(store.clone());

    let mut widget = Widget { id: 9, updated_at: 100 };
    widget.record_cache(&cache);
    let etag = cache.etag_for(&widget);
    assert_eq!(store.writes.lock().len(), 1);
    assert!(cache.matches_any(&normalise_etag(&etag)));

    widget.updated_at = 200;
    widget.record_cache(&cache);
    assert!(!cache.matches_any(&normalise_etag(&etag)));
    assert!(cache.matches_any(&normalise_etag(&cache.etag_for(&widget))));
}

#[test]
fn test_destroy_invalidates() {
    let cache = EtagCache::default();
    let widget = Widget { id: 1, updated_at: 1 };
    let etag = cache.etag_for(&widget);
    widget.remove_cache(&cache);
    assert!(!cache.matches_any(&normalise_etag(&etag)));
    assert!(cache.store().get(&cache.cache_key_for(&widget)).is_none());
}
