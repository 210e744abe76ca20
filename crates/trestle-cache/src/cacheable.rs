//! Lifecycle hooks for persisted objects.

use crate::etag::EtagCache;
use trestle_core::CacheIdentity;

/// Entry points a persistence integration calls after save and destroy.
///
/// Implemented for every [`CacheIdentity`].
pub trait Cacheable: CacheIdentity + Sized {
    /// Records the object's current digest; call after save.
    fn record_cache(&self, cache: &EtagCache) -> String {
        cache.record(self)
    }

    /// Forgets the object's digest; call after destroy.
    fn remove_cache(&self, cache: &EtagCache) {
        cache.remove(self);
    }
}

impl<T: CacheIdentity> Cacheable for T {}
