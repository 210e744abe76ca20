//! # Trestle Test
//!
//! In-memory testing for Trestle APIs: no sockets, the full pipeline, and
//! assertions that understand the response envelope.
//!
//! - [`TestClient`] - Sends requests straight to an app's handler
//! - [`TestRequest`] - Fluent request builder
//! - [`TestResponse`] - Buffered response with status, header and envelope assertions
//!
//! ## Example
//!
//! ```ignore
//! #[tokio::test]
//! async fn test_lists_users() {
//!     let client = TestClient::new(move |request| {
//!         let app = app.clone();
//!         async move { app.handle(request).await }
//!     });
//!
//!     client
//!         .get("/1/users?page=1")
//!         .send()
//!         .await
//!         .assert_status(StatusCode::OK)
//!         .assert_pagination(&json!({"current": 1, "previous": null, "next": 2,
//!                                    "per_page": 10, "count": 25, "pages": 3}));
//!
//!     client.get("/3/users").send().await.assert_error("invalid_version");
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/trestle-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest, TestHandler};
pub use error::TestError;
pub use request::{TestRequest, TestRequestBuilder};
pub use response::TestResponse;
