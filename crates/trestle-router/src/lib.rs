//! # Trestle Router
//!
//! Version-aware routing for Trestle APIs.
//!
//! Routes are grouped in [`ApiScope`]s that live under a version path
//! segment (`/{version}/...`). A scope declares which version tokens it
//! accepts and whether a literal prefix such as `v` may or must precede the
//! token. Scope declarations are validated when drawn: a non-numeric
//! version or a scope with no versions is a [`RouteError`], never a request
//! failure.
//!
//! The matched route carries the raw token and the scope's
//! [`VersionPrefix`]; [`extract_version`] turns them into the request's
//! integer version. [`HeaderVersion`] is the alternate, header-based mode.
//!
//! # Example
//!
//! ```rust
//! use trestle_router::{extract_version, ApiScope, VersionedRouter};
//! use http::Method;
//!
//! let router = VersionedRouter::new()
//!     .mount(ApiScope::new().versions([1, 2]).require_prefix("v").get("/posts", "index"))
//!     .unwrap();
//!
//! let matched = router.match_route(&Method::GET, "/v2/posts").unwrap();
//! assert_eq!(extract_version(matched.params.version(), matched.prefix), Some(2));
//!
//! assert!(router.match_route(&Method::GET, "/2/posts").is_none());
//! ```

#![doc(html_root_url = "https://docs.rs/trestle-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod params;
mod pattern;
mod router;
mod scope;
mod version;

pub use error::RouteError;
pub use params::{RouteParams, VERSION_PARAM};
pub use pattern::{RoutePattern, Segment};
pub use router::{RouteMatch, VersionedRouter};
pub use scope::{ApiScope, Scope, ScopedRoute, VersionConstraint};
pub use version::{extract_version, parse_version, HeaderVersion, VersionPrefix};
