//! # Trestle
//!
//! **Versioned JSON APIs with uniform envelopes, typed errors and ETag caching**
//!
//! Trestle gives every endpoint of an API the same shape:
//!
//! - **Envelopes** - Objects are converted by the first matching converter and
//!   wrapped as `{"response": ..., "count": ..., "pagination": ...}`
//! - **Typed errors** - Failures map to registered error kinds and render as
//!   `{"error": ..., "error_description": ...}` with the kind's status
//! - **Versioning** - Routes live under version scopes and controllers reject
//!   versions outside their range with `invalid_version`
//! - **Caching** - Singular resources get ETags, collections get `max-age`,
//!   and fresh conditional requests are answered with `304`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trestle::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), TrestleError> {
//!     let users = Arc::new(
//!         Controller::builder("users")
//!             .version(1..=2)
//!             .map_error("RecordNotFound", "not_found")
//!             .caches(["show"])
//!             .build(),
//!     );
//!
//!     let index = Endpoint::new(&users, "index", |action| async move {
//!         action.expose(&serde_json::json!(["alice", "bob"]))
//!     });
//!
//!     let router = ApiRouter::new().mount(ApiScope::new().versions([1, 2]).get("/users", index))?;
//!
//!     let config = ConfigLoader::new().with_defaults().with_env_prefix("TRESTLE").load()?;
//!     let app = App::from_config(&config, router)?;
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//!     trestle::serve(Arc::new(app), listener).await
//! }
//! ```
//!
//! ## Request cycle
//!
//! ```text
//! Request -> RequestId -> ConditionalGet -> Instrumentation -> route -> version check
//!                                                                        |
//! Response <- Jsonp <- rescue (error envelope) <- expose (envelope) <- handler
//! ```

#![doc(html_root_url = "https://docs.rs/trestle/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod action;
pub mod caching;
pub mod controller;
pub mod error;
pub mod error_handling;
pub mod header_metadata;
pub mod i18n;
pub mod linking;
pub mod rescue;
pub mod routes;
mod serve;
pub mod settings;
pub mod versioning;

pub use action::{Action, JsonBody, RequestInfo};
pub use caching::CachePolicy;
pub use controller::{Controller, ControllerBuilder, Endpoint};
pub use error::TrestleError;
pub use error_handling::{ErrorMapping, MapTo, ResolvedFailure};
pub use i18n::Translations;
pub use linking::Links;
pub use rescue::{Notifier, NotifierRegistry};
pub use routes::{ApiRouter, App, Recognition};
pub use serve::{bind_and_serve, serve, serve_with_shutdown};
pub use settings::Settings;
pub use versioning::{VersionRange, VersionSource};

pub use trestle_cache as cache;
pub use trestle_config as config;
pub use trestle_convert as convert;
pub use trestle_core as core;
pub use trestle_middleware as middleware;
pub use trestle_router as router;
pub use trestle_telemetry as telemetry;

pub use trestle_core::raise;

/// Prelude module for convenient imports.
///
/// ```rust
/// use trestle::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Action, ApiRouter, App, CachePolicy, Controller, Endpoint, ErrorMapping, Settings,
        TrestleError, VersionRange,
    };

    pub use trestle_config::{ConfigLoader, TrestleConfig};
    pub use trestle_core::{
        raise, ApiError, Classified, ErrorClass, ErrorRegistry, Exposable, ExposeOptions,
        Failure, Json, KaminariPage, TrestleResult, ValidationErrors, WillPaginatePage,
        STANDARD_ERROR,
    };
    pub use trestle_router::ApiScope;
}
