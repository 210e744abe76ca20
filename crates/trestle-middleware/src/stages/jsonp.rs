//! JSONP stage.
//!
//! For `GET` requests carrying a non-empty callback query parameter, a JSON
//! response body is rewritten to `callback(body);` and served as
//! `application/javascript`. Other responses are left alone.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{body_bytes, is_json, query_param, replace_body, Request, Response};
use bytes::{BufMut, Bytes, BytesMut};
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Method};
use http_body_util::Full;

/// The default callback parameter.
pub const DEFAULT_PARAMETER: &str = "callback";

/// Content type of JSONP responses.
pub const JAVASCRIPT_CONTENT_TYPE: &str = "application/javascript";

/// Wraps JSON bodies in a caller-named callback.
#[derive(Debug, Clone)]
pub struct JsonpMiddleware {
    parameter: String,
}

impl JsonpMiddleware {
    /// Creates the stage reading the callback from `parameter`.
    #[must_use]
    pub fn new(parameter: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
        }
    }

    /// The query parameter naming the callback.
    #[must_use]
    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    /// The callback requested by `request`, if any.
    #[must_use]
    pub fn callback(&self, request: &Request) -> Option<String> {
        if request.method() != Method::GET {
            return None;
        }
        query_param(request.uri(), &self.parameter).filter(|value| !value.is_empty())
    }
}

impl Default for JsonpMiddleware {
    fn default() -> Self {
        Self::new(DEFAULT_PARAMETER)
    }
}

impl Middleware for JsonpMiddleware {
    fn name(&self) -> &'static str {
        "jsonp"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let callback = self.callback(&request);
            let response = next.run(ctx, request).await;

            let Some(callback) = callback else {
                return response;
            };
            if !is_json(&response) {
                return response;
            }

            let (mut parts, body) = response.into_parts();
            let body = body_bytes(body).await;

            let mut wrapped = BytesMut::with_capacity(callback.len() + body.len() + 3);
            wrapped.put_slice(callback.as_bytes());
            wrapped.put_u8(b'(');
            wrapped.put_slice(&body);
            wrapped.put_slice(b");");

            parts
                .headers
                .insert(CONTENT_TYPE, HeaderValue::from_static(JAVASCRIPT_CONTENT_TYPE));
            let mut response = Response::from_parts(parts, Full::new(Bytes::new()));
            replace_body(&mut response, wrapped.freeze());
            response
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResponseExt;
    use http::header::CONTENT_LENGTH;
    use http::StatusCode;
    use serde_json::json;

    fn request(method: &str, uri: &str) -> Request {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn json_ok() -> Next<'static> {
        Next::handler(|_ctx, _req| {
            Box::pin(async { Response::json(StatusCode::OK, &json!({"response": "é"})) })
        })
    }

    #[tokio::test]
    async fn test_wraps_json_body() {
        let stage = JsonpMiddleware::default();
        let mut ctx = MiddlewareContext::new();
        let response = stage
            .process(&mut ctx, request("GET", "/1/users?callback=handle"), json_ok())
            .await;

        assert_eq!(response.headers()[CONTENT_TYPE], JAVASCRIPT_CONTENT_TYPE);
        let length: usize = response.headers()[CONTENT_LENGTH].to_str().unwrap().parse().unwrap();
        let body = body_bytes(response.into_body()).await;
        assert_eq!(body, Bytes::from(r#"handle({"response":"é"});"#));
        assert_eq!(length, body.len());
    }

    #[test]
    fn test_callback_is_form_decoded() {
        let stage = JsonpMiddleware::default();
        let callback = stage.callback(&request("GET", "/1/users?callback=my+cb"));
        assert_eq!(callback.as_deref(), Some("my cb"));
    }

    #[tokio::test]
    async fn test_skips_without_callback() {
        let stage = JsonpMiddleware::default();
        for uri in ["/1/users", "/1/users?callback=", "/1/users?other=x"] {
            let mut ctx = MiddlewareContext::new();
            let response = stage.process(&mut ctx, request("GET", uri), json_ok()).await;
            assert!(is_json(&response), "{uri} should stay JSON");
        }
    }

    #[tokio::test]
    async fn test_skips_non_get_and_non_json() {
        let stage = JsonpMiddleware::new("cb");
        let mut ctx = MiddlewareContext::new();
        let response = stage
            .process(&mut ctx, request("POST", "/1/users?cb=f"), json_ok())
            .await;
        assert!(is_json(&response));

        let mut ctx = MiddlewareContext::new();
        let text = Next::handler(|_ctx, _req| {
            Box::pin(async { Response::text(StatusCode::OK, "plain") })
        });
        let response = stage.process(&mut ctx, request("GET", "/1/users?cb=f"), text).await;
        let body = body_bytes(response.into_body()).await;
        assert_eq!(body, Bytes::from("plain"));
    }

    #[test]
    fn test_callback_is_decoded() {
        let stage = JsonpMiddleware::default();
        let req = request("GET", "/x?a=1&callback=jQuery%2E1");
        assert_eq!(stage.callback(&req).as_deref(), Some("jQuery.1"));
    }
}
