//! Built-in pipeline stages.
//!
//! ## Pre-handler
//!
//! 1. [`request_id`] - Generate/propagate the request ID
//! 2. [`conditional_get`] - Short-circuit fresh conditional requests with `304`
//! 3. [`instrumentation`] - Structured request events and metrics
//!
//! ## Post-handler
//!
//! 4. [`jsonp`] - Wrap JSON responses in a callback

pub mod conditional_get;
pub mod instrumentation;
pub mod jsonp;
pub mod request_id;

pub use conditional_get::ConditionalGetMiddleware;
pub use instrumentation::InstrumentationMiddleware;
pub use jsonp::JsonpMiddleware;
pub use request_id::RequestIdMiddleware;
