//! # trestle-client
//!
//! A client for APIs served by Trestle.
//!
//! - [`ApiClient`] - Sends requests to `{host}/{version}/{endpoint}/{path}`
//! - [`unpack`] - Decodes success envelopes into [`Unpacked`] values and
//!   error envelopes into [`ClientError::Api`] carrying the registered kind
//!
//! Paginated collections come back as [`trestle_core::WillPaginatePage`],
//! rebuilt from the envelope's `pagination` entry.

#![doc(html_root_url = "https://docs.rs/trestle-client/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod response;

pub use client::{normalize_base_uri, ApiClient, ClientBuilder, DEFAULT_TIMEOUT};
pub use error::{ClientError, ClientResult, UNSUPPORTED_FORMAT};
pub use response::{unpack, Unpacked};
