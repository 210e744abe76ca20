//! In-memory test client.

use crate::error::TestError;
use crate::request::{TestRequest, TestRequestBuilder};
use crate::response::TestResponse;
use http::Method;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use trestle_middleware::{Request, Response};

/// The service under test.
pub type TestHandler =
    Arc<dyn Fn(Request) -> Pin<Box<dyn Future<Output = Response> + Send>> + Send + Sync>;

/// Sends requests to a service without a network.
///
/// ```ignore
/// let app = Arc::new(app);
/// let client = TestClient::new(move |request| {
///     let app = app.clone();
///     async move { app.handle(request).await }
/// });
///
/// client.get("/1/users").send().await.assert_exposes(&json!([]));
/// ```
#[must_use]
pub struct TestClient {
    handler: TestHandler,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Wraps a request handler.
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        Self {
            handler: Arc::new(
                move |request: Request| -> Pin<Box<dyn Future<Output = Response> + Send>> {
                    Box::pin(handler(request))
                },
            ),
            default_headers: Vec::new(),
        }
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Starts a GET request.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::get(uri))
    }

    /// Starts a POST request.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::post(uri))
    }

    /// Starts a PUT request.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::put(uri))
    }

    /// Starts a PATCH request.
    pub fn patch(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::patch(uri))
    }

    /// Starts a DELETE request.
    pub fn delete(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::delete(uri))
    }

    /// Starts a request with any method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequestBuilder::new(method, uri))
    }

    async fn send_internal(&self, request: TestRequest) -> Result<TestResponse, TestError> {
        let request = request.into_http_request()?;
        let response = (self.handler)(request).await;
        Ok(TestResponse::from_http(response).await)
    }
}

/// A request bound to a [`TestClient`].
#[must_use]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl<'a> TestClientRequest<'a> {
    fn new(client: &'a TestClient, builder: TestRequestBuilder) -> Self {
        let builder = client
            .default_headers
            .iter()
            .fold(builder, |builder, (name, value)| builder.header(name, value));
        Self { client, builder }
    }

    /// Appends a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets `Accept`.
    pub fn accept(mut self, accept: impl AsRef<str>) -> Self {
        self.builder = self.builder.accept(accept);
        self
    }

    /// Sets `If-None-Match`.
    pub fn if_none_match(mut self, etag: impl AsRef<str>) -> Self {
        self.builder = self.builder.if_none_match(etag);
        self
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<bytes::Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets a JSON body.
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sends the request, panicking if it cannot be built.
    pub async fn send(self) -> TestResponse {
        match self.try_send().await {
            Ok(response) => response,
            Err(e) => panic!("test request failed: {e}"),
        }
    }

    /// Sends the request.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?;
        self.client.send_internal(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use serde_json::json;
    use trestle_middleware::ResponseExt;

    fn echo() -> TestClient {
        TestClient::new(|request: Request| async move {
            let custom = request
                .headers()
                .get("x-custom")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("none")
                .to_string();
            Response::json(
                StatusCode::OK,
                &json!({
                    "response": {
                        "method": request.method().as_str(),
                        "path": request.uri().path(),
                        "custom": custom,
                    }
                }),
            )
        })
    }

    #[tokio::test]
    async fn test_echo() {
        let response = echo().get("/1/users").send().await;
        response.assert_exposes(&json!({"method": "GET", "path": "/1/users", "custom": "none"}));
    }

    #[tokio::test]
    async fn test_methods() {
        let client = echo();
        for (method, response) in [
            ("POST", client.post("/x").send().await),
            ("PUT", client.put("/x").send().await),
            ("PATCH", client.patch("/x").send().await),
            ("DELETE", client.delete("/x").send().await),
            ("OPTIONS", client.request(Method::OPTIONS, "/x").send().await),
        ] {
            assert_eq!(response.exposed().unwrap()["method"], method);
        }
    }

    #[tokio::test]
    async fn test_default_headers() {
        let client = echo().with_default_header("x-custom", "default-value");
        let response = client.get("/x").send().await;
        assert_eq!(response.exposed().unwrap()["custom"], "default-value");
    }

    #[tokio::test]
    async fn test_try_send_reports_build_errors() {
        let result = echo().get("/x").header("bad header", "v").try_send().await;
        assert!(matches!(result, Err(TestError::RequestBuild(_))));
    }
}
