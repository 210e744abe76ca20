//! # Trestle Middleware
//!
//! The request pipeline every Trestle API request flows through.
//!
//! ```text
//! Request → RequestId → ConditionalGet → Instrumentation → Jsonp → Handler
//!                            │ 304                                    ↓
//! Response ←─────────────────┴────────────────────────────────────────┘
//! ```
//!
//! | Stage | Middleware      | Purpose                                          |
//! |-------|-----------------|--------------------------------------------------|
//! | 1     | Request ID      | Generate/propagate request ID (UUID v7)          |
//! | 2     | Conditional GET | `304 Not Modified` when an entity tag is fresh   |
//! | 3     | Instrumentation | `start_processing` / `process_action` and metrics |
//! | 4     | JSONP           | Wrap JSON bodies as `callback(body);`            |
//!
//! Stages whose feature is disabled are left out when the pipeline is built.
//!
//! ## Example
//!
//! ```
//! use trestle_middleware::Stage;
//!
//! let stages = Stage::all();
//! assert_eq!(stages[0].name(), "request_id");
//! assert_eq!(stages[1].name(), "conditional_get");
//! assert!(stages[3].is_post_handler());
//! ```

#![doc(html_root_url = "https://docs.rs/trestle-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod middleware;
pub mod pipeline;
pub mod stages;
pub mod types;

pub use context::{MiddlewareContext, RequestId};
pub use middleware::{BoxFuture, Middleware, Next};
pub use pipeline::{BoxedMiddleware, Pipeline, PipelineBuilder, Stage};
pub use types::{body_bytes, is_json, query_param, replace_body, Request, Response, ResponseExt, JSON_CONTENT_TYPE};
