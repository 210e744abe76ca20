//! # Trestle Cache
//!
//! ETag support for conditional GET.
//!
//! - [`CacheStore`] - The key-value store digests are kept in
//! - [`MemoryStore`] - The default in-process store
//! - [`EtagCache`] - Derives cache keys and digests and checks freshness
//! - [`Cacheable`] - Lifecycle entry points for persistence integrations
//!
//! An entity tag has the form `"{cache-key}:{digest}"`: both parts are MD5
//! hex digests. The cache key identifies the object, the digest identifies
//! the version of it that was last recorded.
//!
//! ## Example
//!
//! ```
//! use trestle_cache::{normalise_etag, EtagCache};
//! use trestle_core::CacheIdentity;
//!
//! struct User(u64);
//!
//! impl CacheIdentity for User {
//!     fn type_name(&self) -> &str {
//!         "User"
//!     }
//!
//!     fn id(&self) -> Option<String> {
//!         Some(self.0.to_string())
//!     }
//!
//!     fn inspect(&self) -> String {
//!         format!("#<User id: {}>", self.0)
//!     }
//! }
//!
//! let cache = EtagCache::in_memory();
//! let etag = cache.etag_for(&User(1));
//! assert_eq!(cache.etag_for(&User(1)), etag);
//!
//! let header = normalise_etag(&etag);
//! assert!(cache.matches_any(&header));
//! ```

#![doc(html_root_url = "https://docs.rs/trestle-cache/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cacheable;
mod etag;
mod store;

pub use cacheable::Cacheable;
pub use etag::{digest, normalise_etag, parse_if_none_match, split_etag, EtagCache};
pub use store::{CacheStore, MemoryStore};
