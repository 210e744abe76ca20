//! Test response wrapper with envelope-aware assertions.

use crate::error::TestError;
use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use trestle_middleware::{body_bytes, Response};

/// A buffered response.
///
/// Assertion methods panic with a descriptive message and return `&Self` so
/// they chain:
///
/// ```ignore
/// response
///     .assert_status(StatusCode::OK)
///     .assert_exposes(&json!(["a", "b"]))
///     .assert_header("x-api-count", "2");
/// ```
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    /// Buffers a pipeline response.
    pub async fn from_http(response: Response) -> Self {
        let (parts, body) = response.into_parts();
        Self {
            status: parts.status,
            headers: parts.headers,
            body: body_bytes(body).await,
        }
    }

    /// Creates a response from parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// The status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The status as a number.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// The headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// One header.
    #[must_use]
    pub fn header(&self, name: impl AsRef<str>) -> Option<&HeaderValue> {
        self.headers.get(name.as_ref())
    }

    /// One header as a string.
    #[must_use]
    pub fn header_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.header(name).and_then(|v| v.to_str().ok())
    }

    /// `Content-Type`.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header_str(header::CONTENT_TYPE.as_str())
    }

    /// `Content-Length`.
    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        self.header_str(header::CONTENT_LENGTH.as_str())
            .and_then(|v| v.parse().ok())
    }

    /// The raw body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The body as UTF-8 text.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| TestError::BodyRead(format!("invalid UTF-8: {e}")))
    }

    /// The body decoded as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// The body as a JSON value.
    pub fn json_value(&self) -> Result<Value, TestError> {
        self.json()
    }

    /// The `response` key of a success envelope.
    pub fn exposed(&self) -> Result<Value, TestError> {
        self.envelope_metadata("response")
            .ok_or_else(|| TestError::BodyRead("envelope has no `response` key".to_string()))
    }

    /// A top-level envelope key, such as `count` or `pagination`.
    #[must_use]
    pub fn envelope_metadata(&self, key: &str) -> Option<Value> {
        self.json_value().ok()?.get(key).cloned()
    }

    /// Asserts the status.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status, expected,
            "expected status {}, got {} with body {}",
            expected,
            self.status,
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    /// Asserts a header value.
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        let expected = expected.as_ref();
        let actual = self
            .header_str(name)
            .unwrap_or_else(|| panic!("header '{name}' not found"));
        assert_eq!(actual, expected, "header '{name}'");
        self
    }

    /// Asserts a header is absent.
    pub fn assert_no_header(&self, name: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        assert!(
            self.header(name).is_none(),
            "header '{name}' should be absent, got {:?}",
            self.header(name)
        );
        self
    }

    /// Asserts the whole JSON body.
    pub fn assert_json_eq(&self, expected: &Value) -> &Self {
        let actual = self
            .json_value()
            .unwrap_or_else(|e| panic!("body is not JSON: {e}"));
        assert_eq!(&actual, expected, "JSON body mismatch");
        self
    }

    /// Asserts `Content-Length` equals the body's byte length.
    pub fn assert_content_length(&self) -> &Self {
        assert_eq!(
            self.content_length(),
            Some(self.body.len() as u64),
            "Content-Length does not match the body"
        );
        self
    }

    /// Asserts a success envelope exposing `expected` under `response`.
    pub fn assert_exposes(&self, expected: &Value) -> &Self {
        assert!(
            self.status.is_success(),
            "expected a success envelope, got {} with body {}",
            self.status,
            String::from_utf8_lossy(&self.body)
        );
        let actual = self
            .exposed()
            .unwrap_or_else(|e| panic!("not a success envelope: {e}"));
        assert_eq!(&actual, expected, "exposed value mismatch");
        self
    }

    /// Asserts an error envelope named `name`.
    pub fn assert_error(&self, name: &str) -> &Self {
        let body = self
            .json_value()
            .unwrap_or_else(|e| panic!("error body is not JSON: {e}"));
        assert_eq!(
            body.get("error").and_then(Value::as_str),
            Some(name),
            "expected error '{name}' in {body}"
        );
        assert!(
            body.get("error_description").is_some_and(Value::is_string),
            "error envelope lacks error_description: {body}"
        );
        self
    }

    /// Asserts the `pagination` object of a paginated envelope.
    pub fn assert_pagination(&self, expected: &Value) -> &Self {
        let actual = self
            .envelope_metadata("pagination")
            .unwrap_or_else(|| panic!("envelope has no pagination"));
        assert_eq!(&actual, expected, "pagination mismatch");
        self
    }

    /// Asserts a bare `304 Not Modified`.
    pub fn assert_not_modified(&self) -> &Self {
        self.assert_status(StatusCode::NOT_MODIFIED);
        assert!(self.body.is_empty(), "304 response carries a body");
        self
    }
}

impl fmt::Debug for TestResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .finish()
    }
}
