//! # Trestle Convert
//!
//! The converter dispatch engine. An exposed object is classified by checking
//! its [`Exposable`](trestle_core::Exposable) capabilities against an ordered
//! list of converters; the first match wins.
//!
//! ```text
//! WillPaginate → Kaminari → Collection → Serializer → SerializableObject → Base
//! └──────── paginated ───┘              └──────────── individual ──────────────┘
//! ```
//!
//! Collections convert each element through the individual converters only,
//! so an element is never itself treated as a page.
//!
//! ## Example
//!
//! ```
//! use trestle_convert::{fetch, Converter};
//! use trestle_core::ExposeOptions;
//! use serde_json::json;
//!
//! let object = json!(["a", "b", "c", "d"]);
//! let options = ExposeOptions::new();
//! let conversion = fetch(&object, &options).unwrap();
//!
//! assert_eq!(conversion.converter(), Converter::Collection);
//! let payload = conversion.payload().unwrap();
//! assert_eq!(payload.body, json!(["a", "b", "c", "d"]));
//! assert_eq!(payload.metadata["count"], json!(4));
//! ```

#![doc(html_root_url = "https://docs.rs/trestle-convert/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod converter;
mod dispatch;
mod error;
mod payload;

pub use converter::Converter;
pub use dispatch::{fetch, fetch_from, serialize_single, Conversion};
pub use error::{ConvertError, CONVERSION_ERROR};
pub use payload::{ConvertedPayload, Pagination};
