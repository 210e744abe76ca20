//! Versioned routing and the request cycle.
//!
//! [`ApiRouter`] maps `(method, path)` to an [`Endpoint`] through version
//! scopes. [`App`] joins the router with the settings snapshot and the
//! middleware pipeline:
//!
//! ```text
//! request_id -> conditional_get* -> instrumentation -> dispatch -> jsonp*
//!                                                        |
//!                         route -> version check -> handler -> rescue
//! ```
//!
//! Stages marked `*` are only installed when caching, or JSONP, is enabled.

use crate::action::{Action, RequestInfo};
use crate::controller::{Controller, Endpoint};
use crate::error::TrestleError;
use crate::error_handling::pass_through_response;
use crate::settings::Settings;
use crate::versioning::VersionSource;
use http::{HeaderMap, Method};
use std::sync::Arc;
use trestle_config::TrestleConfig;
use trestle_core::{ApiError, Failure, TrestleResult};
use trestle_middleware::stages::{
    ConditionalGetMiddleware, InstrumentationMiddleware, JsonpMiddleware, RequestIdMiddleware,
};
use trestle_middleware::{
    body_bytes, BoxFuture, MiddlewareContext, Pipeline, Request, Response,
};
use trestle_router::{ApiScope, RouteParams, VersionedRouter};

/// Name of the controller that renders routing failures.
pub const FALLBACK_CONTROLLER: &str = "application";

/// The outcome of routing a request.
#[derive(Debug)]
pub enum Recognition<'a> {
    /// A route matched.
    Matched {
        /// The routed endpoint.
        endpoint: &'a Endpoint,
        /// Captured parameters, the raw version token included.
        params: RouteParams,
        /// The parsed request version; `None` for a malformed token.
        version: Option<u32>,
    },
    /// Header versioning is on and the request carries no version.
    MissingVersion,
    /// No route matched.
    NotFound,
}

/// Endpoints grouped under version scopes.
///
/// ```
/// use std::sync::Arc;
/// use http::{HeaderMap, Method};
/// use trestle::{ApiRouter, Controller, Endpoint, Recognition, VersionSource};
/// use trestle_router::ApiScope;
///
/// let users = Arc::new(Controller::builder("users").version(1).build());
/// let index = Endpoint::new(&users, "index", |action| async move {
///     action.expose(&serde_json::json!([]))
/// });
///
/// let router = ApiRouter::new()
///     .mount(ApiScope::new().version(1).get("/users", index))
///     .unwrap();
///
/// let recognized = router.recognize(&Method::GET, "/1/users", &HeaderMap::new(), &VersionSource::Path);
/// assert!(matches!(recognized, Recognition::Matched { version: Some(1), .. }));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ApiRouter {
    inner: VersionedRouter<Endpoint>,
}

impl ApiRouter {
    /// Creates a router with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and mounts a scope of endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`TrestleError::Route`] for a scope without versions, a
    /// non-numeric version or an invalid path.
    pub fn mount(self, scope: ApiScope<Endpoint>) -> Result<Self, TrestleError> {
        Ok(Self {
            inner: self.inner.mount(scope)?,
        })
    }

    /// Number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if no routes are mounted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Routes a request.
    ///
    /// With header versioning, paths carry no version segment and every
    /// scope declaring the header version is tried, prefixed or not.
    #[must_use]
    pub fn recognize(
        &self,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
        source: &VersionSource,
    ) -> Recognition<'_> {
        let matched = match source {
            VersionSource::Path => self.inner.match_route(method, path),
            VersionSource::Header(header) => {
                let Some(token) = header.token(headers) else {
                    tracing::debug!(header = %header.header(), "request carries no version");
                    return Recognition::MissingVersion;
                };
                self.inner.match_version(method, token, path)
            }
        };

        match matched {
            Some(matched) => {
                let version = source.resolve(&matched.params, matched.prefix, headers);
                Recognition::Matched {
                    endpoint: matched.value,
                    params: matched.params,
                    version,
                }
            }
            None => Recognition::NotFound,
        }
    }
}

/// A routed API: settings, pipeline and router.
#[derive(Debug)]
pub struct App {
    settings: Arc<Settings>,
    router: Arc<ApiRouter>,
    fallback: Arc<Controller>,
    pipeline: Pipeline,
}

impl App {
    /// Creates an app from a settings snapshot and a router.
    #[must_use]
    pub fn new(settings: Settings, router: ApiRouter) -> Self {
        let mut builder = Pipeline::builder().add_pre_handler_stage(RequestIdMiddleware::new());
        if settings.caching_enabled() {
            builder = builder.add_pre_handler_stage(ConditionalGetMiddleware::new(settings.cache().clone()));
        }
        builder = builder.add_pre_handler_stage(InstrumentationMiddleware::new());
        if let Some(parameter) = settings.jsonp_parameter() {
            builder = builder.add_post_handler_stage(JsonpMiddleware::new(parameter));
        }
        let pipeline = builder.build();

        tracing::info!(
            env = settings.env(),
            routes = router.len(),
            stages = ?pipeline.stage_names(),
            "trestle app ready"
        );

        Self {
            settings: Arc::new(settings),
            router: Arc::new(router),
            fallback: Arc::new(Controller::new(FALLBACK_CONTROLLER)),
            pipeline,
        }
    }

    /// Creates an app from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TrestleError`] if the settings cannot be built.
    pub fn from_config(config: &TrestleConfig, router: ApiRouter) -> Result<Self, TrestleError> {
        Ok(Self::new(Settings::from_config(config)?, router))
    }

    /// Uses `controller` to render routing failures.
    #[must_use]
    pub fn with_fallback(mut self, controller: Controller) -> Self {
        self.fallback = Arc::new(controller);
        self
    }

    /// The settings snapshot.
    #[must_use]
    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    /// The router.
    #[must_use]
    pub fn router(&self) -> &ApiRouter {
        &self.router
    }

    /// The middleware pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Handles one request.
    ///
    /// ```
    /// use bytes::Bytes;
    /// use http_body_util::Full;
    /// use trestle::prelude::*;
    ///
    /// # tokio_test::block_on(async {
    /// let app = App::new(Settings::for_environment("test"), ApiRouter::new());
    /// let request = http::Request::get("/1/missing").body(Full::new(Bytes::new())).unwrap();
    /// let response = app.handle(request).await;
    /// assert_eq!(response.status(), http::StatusCode::NOT_FOUND);
    /// # });
    /// ```
    pub async fn handle(&self, request: Request) -> Response {
        let settings = Arc::clone(&self.settings);
        let router = Arc::clone(&self.router);
        let fallback = Arc::clone(&self.fallback);

        self.pipeline
            .process(MiddlewareContext::new(), request, move |ctx, request| {
                dispatch(ctx, request, settings, &router, fallback)
            })
            .await
    }
}

fn dispatch(
    ctx: &mut MiddlewareContext,
    request: Request,
    settings: Arc<Settings>,
    router: &ApiRouter,
    fallback: Arc<Controller>,
) -> BoxFuture<'static, Response> {
    let (parts, body) = request.into_parts();
    let mut info = RequestInfo::new(parts.method, parts.uri, parts.headers, ctx.request_id());

    let recognized = router.recognize(&info.method, info.uri.path(), &info.headers, settings.versioning());
    let (endpoint, params, checked) = match recognized {
        Recognition::Matched {
            endpoint,
            params,
            version,
        } => {
            ctx.set_action(endpoint.qualified_name());
            let checked = endpoint.controller().verify_version(version);
            if let Ok(Some(version)) = checked {
                ctx.set_api_version(version);
                info.version = Some(version);
            }
            info.action = endpoint.action().to_string();
            (endpoint.clone(), params, checked)
        }
        Recognition::MissingVersion => {
            return rescue_now(ApiError::named("invalid_version").into(), &fallback, &info, &settings);
        }
        Recognition::NotFound => {
            tracing::debug!(http.method = %info.method, http.path = info.path(), "no route matched");
            return rescue_now(ApiError::named("not_found").into(), &fallback, &info, &settings);
        }
    };

    Box::pin(async move {
        let controller = Arc::clone(endpoint.controller());
        let result: TrestleResult<Response> = match checked {
            Ok(_) => {
                let body = body_bytes(body).await;
                let action = Action::new(
                    info.clone(),
                    params,
                    body,
                    Arc::clone(&controller),
                    Arc::clone(&settings),
                );
                endpoint.call(action).await
            }
            Err(failure) => Err(failure),
        };
        finish(result, &controller, &info, &settings)
    })
}

fn rescue_now(
    failure: Failure,
    controller: &Controller,
    info: &RequestInfo,
    settings: &Settings,
) -> BoxFuture<'static, Response> {
    let response = finish(Err(failure), controller, info, settings);
    Box::pin(async move { response })
}

fn finish(
    result: TrestleResult<Response>,
    controller: &Controller,
    info: &RequestInfo,
    settings: &Settings,
) -> Response {
    match result {
        Ok(response) => response,
        Err(failure) => controller
            .rescue(failure, info, settings)
            .unwrap_or_else(|failure| pass_through_response(&failure)),
    }
}
