//! # Trestle Core
//!
//! Core types shared by every Trestle crate:
//!
//! - [`ErrorKind`] - A named, registered category of API failure with an HTTP status
//! - [`ErrorRegistry`] - The process-wide table of error kinds, keyed by name
//! - [`ApiError`] - A raised occurrence of an error kind, with message and context
//! - [`Failure`] - Anything a handler can fail with, classified for error mapping
//! - [`Exposable`] - The capability interface domain objects implement to be rendered
//! - [`ExposeOptions`] - Per-call rendering options (status, metadata, serializers)
//!
//! ## Example
//!
//! ```
//! use trestle_core::{ApiError, ErrorRegistry};
//! use http::StatusCode;
//!
//! let registry = ErrorRegistry::with_builtins();
//! let kind = registry.lookup("throttled").unwrap();
//! assert_eq!(kind.http_status(), StatusCode::SERVICE_UNAVAILABLE);
//!
//! let error = ApiError::new(kind).with_message("slow down");
//! assert_eq!(error.name(), "throttled");
//! ```

#![doc(html_root_url = "https://docs.rs/trestle-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod class;
mod error;
mod failure;
mod kind;
mod macros;
mod options;
pub mod page;
mod registry;
pub mod resource;
mod validation;

pub use class::{Classified, ErrorClass, API_ERROR, RUNTIME_ERROR, STANDARD_ERROR};
pub use error::{ApiError, METADATA_KEY};
pub use failure::{Failure, CHAIN_LIMIT};
pub use kind::{camelize, ErrorKind, RegisterOptions};
#[doc(hidden)]
pub use macros::__context_map;
pub use options::ExposeOptions;
pub use page::{KaminariPage, PageState, WillPaginatePage};
pub use registry::{ErrorRegistry, RegistryError};
pub use resource::{
    CacheIdentity, Exposable, FnSerializer, Json, SerializableHash, SerializableObject,
    Serializer,
};
pub use validation::ValidationErrors;

/// Result type for handler code: every failure funnels into [`Failure`].
pub type TrestleResult<T> = Result<T, Failure>;
