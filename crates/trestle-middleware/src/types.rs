//! HTTP types used throughout the pipeline.

use bytes::Bytes;
use http::{header, HeaderValue, StatusCode, Uri};
use http_body_util::{BodyExt, Full};

/// The request type flowing through the pipeline.
pub type Request = http::Request<Full<Bytes>>;

/// The response type flowing through the pipeline.
pub type Response = http::Response<Full<Bytes>>;

/// Content type of JSON envelopes.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Constructors for common responses.
pub trait ResponseExt {
    /// A plain-text response.
    fn text(status: StatusCode, message: &str) -> Response;

    /// A JSON response with a byte-accurate `Content-Length`.
    fn json(status: StatusCode, body: &serde_json::Value) -> Response;

    /// A bare `304 Not Modified` with no headers and no body.
    fn not_modified() -> Response;
}

impl ResponseExt for Response {
    fn text(status: StatusCode, message: &str) -> Response {
        http::Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .header(header::CONTENT_LENGTH, message.len())
            .body(Full::new(Bytes::from(message.to_string())))
            .expect("failed to build text response")
    }

    fn json(status: StatusCode, body: &serde_json::Value) -> Response {
        let rendered = body.to_string();
        http::Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header(header::CONTENT_LENGTH, rendered.len())
            .body(Full::new(Bytes::from(rendered)))
            .expect("failed to build JSON response")
    }

    fn not_modified() -> Response {
        http::Response::builder()
            .status(StatusCode::NOT_MODIFIED)
            .body(Full::new(Bytes::new()))
            .expect("failed to build not modified response")
    }
}

/// Collects a body into bytes.
pub async fn body_bytes(body: Full<Bytes>) -> Bytes {
    match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(never) => match never {},
    }
}

/// Returns true if the response content type is JSON, ignoring parameters.
#[must_use]
pub fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|media| media.trim().eq_ignore_ascii_case(JSON_CONTENT_TYPE))
}

/// Replaces the body and recomputes `Content-Length` from its byte length.
pub fn replace_body(response: &mut Response, body: Bytes) {
    response
        .headers_mut()
        .insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
    *response.body_mut() = Full::new(body);
}

/// The first query parameter named `name`, form-decoded.
///
/// `+` decodes to a space. A query that fails to decode yields `None`.
#[must_use]
pub fn query_param(uri: &Uri, name: &str) -> Option<String> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(uri.query()?).ok()?;
    pairs
        .into_iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value)
}
