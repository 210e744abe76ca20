//! Test request building.

use crate::error::TestError;
use bytes::Bytes;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, Uri};
use http_body_util::Full;
use serde::Serialize;
use trestle_middleware::Request;

/// A request ready to be sent through a [`TestClient`](crate::TestClient).
#[derive(Debug, Clone)]
pub struct TestRequest {
    /// HTTP method.
    pub method: Method,
    /// Request URI.
    pub uri: Uri,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: Bytes,
}

impl TestRequest {
    /// Starts a GET request.
    pub fn get(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::GET, uri)
    }

    /// Starts a POST request.
    pub fn post(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::POST, uri)
    }

    /// Starts a PUT request.
    pub fn put(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::PUT, uri)
    }

    /// Starts a PATCH request.
    pub fn patch(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::PATCH, uri)
    }

    /// Starts a DELETE request.
    pub fn delete(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::DELETE, uri)
    }

    /// Converts into the pipeline's request type.
    pub fn into_http_request(self) -> Result<Request, TestError> {
        let mut builder = http::Request::builder().method(self.method).uri(self.uri);
        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }
        builder
            .body(Full::new(self.body))
            .map_err(|e| TestError::RequestBuild(e.to_string()))
    }
}

/// Fluent builder for [`TestRequest`].
///
/// Invalid header names or values are reported by [`build`](Self::build).
#[must_use]
#[derive(Debug)]
pub struct TestRequestBuilder {
    method: Method,
    uri: String,
    headers: HeaderMap,
    body: Option<Bytes>,
    error: Option<String>,
}

impl TestRequestBuilder {
    /// Starts a request with `method` and `uri`.
    pub fn new(method: Method, uri: impl AsRef<str>) -> Self {
        Self {
            method,
            uri: uri.as_ref().to_string(),
            headers: HeaderMap::new(),
            body: None,
            error: None,
        }
    }

    /// Appends a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let name = HeaderName::try_from(name.as_ref());
        let value = HeaderValue::try_from(value.as_ref());
        match (name, value) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            (Err(e), _) => self.error = Some(format!("invalid header name: {e}")),
            (_, Err(e)) => self.error = Some(format!("invalid header value: {e}")),
        }
        self
    }

    /// Sets `Content-Type`.
    pub fn content_type(self, content_type: impl AsRef<str>) -> Self {
        self.header(header::CONTENT_TYPE.as_str(), content_type)
    }

    /// Sets `Accept`, as used by header versioning.
    pub fn accept(self, accept: impl AsRef<str>) -> Self {
        self.header(header::ACCEPT.as_str(), accept)
    }

    /// Sets `If-None-Match` to a quoted entity tag.
    pub fn if_none_match(self, etag: impl AsRef<str>) -> Self {
        self.header(header::IF_NONE_MATCH.as_str(), etag)
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets a JSON body and content type.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.body = Some(Bytes::from(bytes)),
            Err(e) => self.error = Some(format!("JSON encoding failed: {e}")),
        }
        self.content_type("application/json")
    }

    /// Builds the request.
    pub fn build(self) -> Result<TestRequest, TestError> {
        if let Some(error) = self.error {
            return Err(TestError::RequestBuild(error));
        }

        let uri: Uri = self
            .uri
            .parse()
            .map_err(|e| TestError::RequestBuild(format!("invalid URI: {e}")))?;

        Ok(TestRequest {
            method: self.method,
            uri,
            headers: self.headers,
            body: self.body.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_methods() {
        assert_eq!(TestRequest::get("/1/users").build().unwrap().method, Method::GET);
        assert_eq!(TestRequest::post("/1/users").build().unwrap().method, Method::POST);
        assert_eq!(TestRequest::put("/1/users/1").build().unwrap().method, Method::PUT);
        assert_eq!(TestRequest::patch("/1/users/1").build().unwrap().method, Method::PATCH);
        assert_eq!(TestRequest::delete("/1/users/1").build().unwrap().method, Method::DELETE);
    }

    #[test]
    fn test_headers() {
        let request = TestRequest::get("/users")
            .accept("application/vnd.api.v2+json")
            .if_none_match("\"a:b\"")
            .build()
            .unwrap();
        assert_eq!(request.headers[header::ACCEPT], "application/vnd.api.v2+json");
        assert_eq!(request.headers[header::IF_NONE_MATCH], "\"a:b\"");
    }

    #[test]
    fn test_json_body() {
        let request = TestRequest::post("/1/users")
            .json(&json!({"name": "Alice"}))
            .build()
            .unwrap();
        assert_eq!(request.headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(request.body, Bytes::from(r#"{"name":"Alice"}"#));
    }

    #[test]
    fn test_invalid_input_is_reported() {
        assert!(TestRequest::get("/users").header("bad header", "x").build().is_err());
        assert!(TestRequest::get("not a uri").build().is_err());
    }

    #[test]
    fn test_into_http_request() {
        let request = TestRequest::get("/1/users?page=2")
            .header("x-custom", "yes")
            .build()
            .unwrap()
            .into_http_request()
            .unwrap();
        assert_eq!(request.uri().query(), Some("page=2"));
        assert_eq!(request.headers()["x-custom"], "yes");
    }
}
