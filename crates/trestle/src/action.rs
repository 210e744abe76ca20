//! The per-request handler context.
//!
//! Every handler receives an [`Action`]: the request, the routed parameters,
//! the owning controller and the settings snapshot. Handlers answer through
//! it, so envelopes, metadata headers, links and caching headers are built
//! the same way everywhere.
//!
//! # Exposing
//!
//! [`Action::expose_with`] runs these steps in order:
//!
//! 1. The controller's pre-process hooks see the object.
//! 2. The first matching converter turns it into a body and metadata.
//! 3. Caller metadata is merged over the converter's, then the metadata
//!    hooks run.
//! 4. With header metadata on, the metadata becomes `X-Api-*` headers and
//!    paginated responses get navigation links.
//! 5. The body is inserted under the response key, last.
//! 6. The envelope is rendered; cached actions get caching headers.
//! 7. The post-process hooks see the response.

use crate::controller::Controller;
use crate::header_metadata;
use crate::linking::{pagination_links, Links};
use crate::settings::Settings;
use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, Method, StatusCode, Uri};
use http_body_util::Full;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use trestle_core::{ApiError, Exposable, ExposeOptions, Failure, TrestleResult};
use trestle_middleware::{RequestId, Response, JSON_CONTENT_TYPE};
use trestle_router::RouteParams;

/// The parts of a request that outlive its body.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    /// Request method.
    pub method: Method,
    /// Request URI.
    pub uri: Uri,
    /// Request headers.
    pub headers: HeaderMap,
    /// Pipeline request ID.
    pub request_id: RequestId,
    /// The resolved API version, once checked.
    pub version: Option<u32>,
    /// The routed action name, empty when no route matched.
    pub action: String,
}

impl RequestInfo {
    /// Captures a request's method, URI and headers.
    #[must_use]
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, request_id: RequestId) -> Self {
        Self {
            method,
            uri,
            headers,
            request_id,
            version: None,
            action: String::new(),
        }
    }

    /// The request path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// The first query parameter named `name`, form-decoded.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<String> {
        trestle_middleware::query_param(&self.uri, name)
    }

    #[cfg(test)]
    pub(crate) fn for_test(path: &str) -> Self {
        Self::new(
            Method::GET,
            path.parse().unwrap_or_else(|_| Uri::from_static("/")),
            HeaderMap::new(),
            RequestId::new(),
        )
    }
}

/// A body for [`Action::render_json`].
#[derive(Debug, Clone, PartialEq)]
pub enum JsonBody {
    /// A value, encoded on render.
    Value(Value),
    /// Pre-serialized JSON, sent as is.
    Raw(String),
}

impl From<Value> for JsonBody {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<String> for JsonBody {
    fn from(raw: String) -> Self {
        Self::Raw(raw)
    }
}

impl From<&str> for JsonBody {
    fn from(raw: &str) -> Self {
        Self::Raw(raw.to_string())
    }
}

/// The handler's view of one request.
#[derive(Debug)]
pub struct Action {
    info: RequestInfo,
    params: RouteParams,
    body: Bytes,
    controller: Arc<Controller>,
    settings: Arc<Settings>,
    links: Links,
}

impl Action {
    /// Creates the context for a routed request.
    #[must_use]
    pub fn new(
        info: RequestInfo,
        params: RouteParams,
        body: Bytes,
        controller: Arc<Controller>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            info,
            params,
            body,
            controller,
            settings,
            links: Links::new(),
        }
    }

    /// The request.
    #[must_use]
    pub fn request(&self) -> &RequestInfo {
        &self.info
    }

    /// The routed action name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.info.action
    }

    /// The checked API version; `None` for unversioned controllers without a token.
    #[must_use]
    pub fn version(&self) -> Option<u32> {
        self.info.version
    }

    /// Route parameters, the raw version token included.
    #[must_use]
    pub fn params(&self) -> &RouteParams {
        &self.params
    }

    /// The route parameter `name`.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// The query parameter `name`.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<String> {
        self.info.query(name)
    }

    /// The raw request body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Decodes the request body as JSON.
    ///
    /// # Errors
    ///
    /// Returns a `bad_request` failure if the body does not decode.
    pub fn json<T: DeserializeOwned>(&self) -> TrestleResult<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            ApiError::named("bad_request")
                .with_message(e.to_string())
                .into()
        })
    }

    /// The owning controller.
    #[must_use]
    pub fn controller(&self) -> &Arc<Controller> {
        &self.controller
    }

    /// The settings snapshot.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Adds a `Link` header to the next rendered response.
    pub fn link(&mut self, rel: &str, uri: &str, attributes: &[(&str, &str)]) {
        self.links.link(rel, uri, attributes);
    }

    /// Adds a `Link` header per pair; pairs without a uri are skipped.
    pub fn links<'a, I>(&mut self, links: I)
    where
        I: IntoIterator<Item = (&'a str, Option<String>)>,
    {
        self.links.links(links);
    }

    /// Renders `object` in an envelope with default options.
    ///
    /// # Errors
    ///
    /// Returns a failure if conversion or rendering fails.
    pub fn expose(&self, object: &dyn Exposable) -> TrestleResult<Response> {
        self.expose_with(object, ExposeOptions::new())
    }

    /// Renders `object` in an envelope.
    ///
    /// # Errors
    ///
    /// Returns a failure if conversion or rendering fails.
    pub fn expose_with(&self, object: &dyn Exposable, mut options: ExposeOptions) -> TrestleResult<Response> {
        if !self.settings.serializers_enabled() {
            options.serializer_lookup = false;
        }

        self.controller.pre_process(object);

        let conversion = trestle_convert::fetch(object, &options)?;
        let payload = conversion.payload()?;
        let singular = !conversion.converter().is_collection();

        let mut metadata = payload.metadata;
        metadata.extend(options.metadata.clone());
        self.controller.expose_metadata(&mut metadata);

        let mut headers = HeaderMap::new();
        let mut links = self.links.clone();
        if self.settings.header_metadata() {
            header_metadata::apply(&mut headers, &metadata);
            if let (Some(pagination), Some(page_url)) =
                (metadata.get("pagination"), self.controller.page_url())
            {
                links.links(pagination_links(pagination, |page| page_url(&self.info, page)));
            }
        }

        metadata.insert(payload.response_key, payload.body);

        let mut response = self.render_json(Value::Object(metadata), &options)?;
        response.headers_mut().extend(headers);
        links.apply(response.headers_mut());

        let caching = self.controller.caching();
        if self.settings.caching_enabled() && caching.is_cached(self.name()) {
            caching.apply(&mut response, &self.settings, object, singular);
        }

        self.controller.post_process(&mut response, object, singular);
        Ok(response)
    }

    /// Renders the converted `object` without envelope metadata.
    ///
    /// # Errors
    ///
    /// Returns a failure if conversion or rendering fails.
    pub fn responds(&self, object: &dyn Exposable, options: &ExposeOptions) -> TrestleResult<Response> {
        let body = trestle_convert::fetch(object, options)?.convert()?;
        let mut response = self.render_json(body, options)?;
        self.links.apply(response.headers_mut());
        Ok(response)
    }

    /// Renders a JSON body with the status and content type of `options`.
    ///
    /// Values are encoded; raw strings are sent unchanged. `Content-Length`
    /// is the byte length of the body.
    ///
    /// # Errors
    ///
    /// Returns a failure if the content type is not a valid header value.
    pub fn render_json(&self, body: impl Into<JsonBody>, options: &ExposeOptions) -> TrestleResult<Response> {
        let rendered = match body.into() {
            JsonBody::Value(value) => value.to_string(),
            JsonBody::Raw(raw) => raw,
        };
        let content_type = options.content_type.as_deref().unwrap_or(JSON_CONTENT_TYPE);

        http::Response::builder()
            .status(options.status.unwrap_or(StatusCode::OK))
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, rendered.len())
            .body(Full::new(Bytes::from(rendered)))
            .map_err(Failure::other)
    }

    /// Turns this action's failure into an error response through its controller.
    ///
    /// # Errors
    ///
    /// Returns the failure when it is unmapped and errors pass through.
    pub fn rescue(&self, failure: Failure) -> Result<Response, Failure> {
        self.controller.rescue(failure, &self.info, &self.settings)
    }
}
