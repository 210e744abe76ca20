//! The ordered middleware pipeline.
//!
//! Stages run in a fixed order around the handler:
//!
//! 1. **Request ID** - Generate or propagate the request ID (UUID v7)
//! 2. **Conditional GET** - Answer `304 Not Modified` for fresh entity tags
//! 3. **Instrumentation** - Emit `start_processing` / `process_action` events and metrics
//! 4. **JSONP** - Wrap JSON bodies in a callback (post-handler)
//!
//! Stages that are disabled in configuration are simply not added.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response};
use std::sync::Arc;

/// A type-erased middleware.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// An immutable middleware pipeline.
///
/// # Example
///
/// ```
/// use trestle_middleware::Pipeline;
/// use trestle_middleware::stages::RequestIdMiddleware;
///
/// let pipeline = Pipeline::builder()
///     .add_pre_handler_stage(RequestIdMiddleware::new())
///     .build();
/// assert_eq!(pipeline.stage_names(), ["request_id"]);
/// ```
pub struct Pipeline {
    pre_handler_stages: Vec<BoxedMiddleware>,
    post_handler_stages: Vec<BoxedMiddleware>,
}

impl Pipeline {
    /// Creates a pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Runs `request` through every stage and the handler.
    pub async fn process<H>(
        &self,
        mut ctx: MiddlewareContext,
        request: Request,
        handler: H,
    ) -> Response
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'static,
    {
        let next = self.build_chain(handler);
        next.run(&mut ctx, request).await
    }

    fn build_chain<'a, H>(&'a self, handler: H) -> Next<'a>
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'a,
    {
        let mut next = Next::handler(handler);

        for middleware in self.post_handler_stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }

        for middleware in self.pre_handler_stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }

        next
    }

    /// Stage names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.pre_handler_stages
            .iter()
            .chain(&self.post_handler_stages)
            .map(|mw| mw.name())
            .collect()
    }

    /// Number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.pre_handler_stages.len() + self.post_handler_stages.len()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Builder for a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    pre_handler_stages: Vec<BoxedMiddleware>,
    post_handler_stages: Vec<BoxedMiddleware>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a stage that runs before the handler.
    ///
    /// Pre-handler stages run in insertion order and may short-circuit.
    #[must_use]
    pub fn add_pre_handler_stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.pre_handler_stages.push(Arc::new(middleware));
        self
    }

    /// Adds a stage that runs nearest the handler, after all pre-handler stages.
    ///
    /// Post-handler stages see the handler's response first.
    #[must_use]
    pub fn add_post_handler_stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.post_handler_stages.push(Arc::new(middleware));
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            pre_handler_stages: self.pre_handler_stages,
            post_handler_stages: self.post_handler_stages,
        }
    }
}

/// The built-in stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Stage {
    /// Request ID generation or propagation.
    RequestId = 1,
    /// Conditional GET short-circuit.
    ConditionalGet = 2,
    /// Logging and metrics.
    Instrumentation = 3,
    /// JSONP body wrapping.
    Jsonp = 4,
}

impl Stage {
    /// Returns true if the stage runs before the handler.
    #[must_use]
    pub const fn is_pre_handler(self) -> bool {
        (self as u8) <= 3
    }

    /// Returns true if the stage runs after the handler.
    #[must_use]
    pub const fn is_post_handler(self) -> bool {
        !self.is_pre_handler()
    }

    /// The stage name, as reported by [`Middleware::name`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RequestId => "request_id",
            Self::ConditionalGet => "conditional_get",
            Self::Instrumentation => "instrumentation",
            Self::Jsonp => "jsonp",
        }
    }

    /// All stages in order.
    #[must_use]
    pub const fn all() -> [Stage; 4] {
        [
            Self::RequestId,
            Self::ConditionalGet,
            Self::Instrumentation,
            Self::Jsonp,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResponseExt;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct OrderTracking {
        name: &'static str,
        order: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Middleware for OrderTracking {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process<'a>(
            &'a self,
            ctx: &'a mut MiddlewareContext,
            request: Request,
            next: Next<'a>,
        ) -> BoxFuture<'a, Response> {
            Box::pin(async move {
                self.order.lock().unwrap().push(self.name);
                next.run(ctx, request).await
            })
        }
    }

    struct ShortCircuit;

    impl Middleware for ShortCircuit {
        fn name(&self) -> &'static str {
            "short_circuit"
        }

        fn process<'a>(
            &'a self,
            _ctx: &'a mut MiddlewareContext,
            _request: Request,
            _next: Next<'a>,
        ) -> BoxFuture<'a, Response> {
            Box::pin(async { Response::not_modified() })
        }
    }

    fn request() -> Request {
        http::Request::builder()
            .uri("/1/users")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_stages_run_in_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::builder()
            .add_post_handler_stage(OrderTracking {
                name: "post",
                order: order.clone(),
            })
            .add_pre_handler_stage(OrderTracking {
                name: "first",
                order: order.clone(),
            })
            .add_pre_handler_stage(OrderTracking {
                name: "second",
                order: order.clone(),
            })
            .build();

        assert_eq!(pipeline.stage_names(), ["first", "second", "post"]);
        assert_eq!(pipeline.stage_count(), 3);

        let response = pipeline
            .process(MiddlewareContext::new(), request(), |_ctx, _req| {
                Box::pin(async { Response::text(StatusCode::OK, "ok") })
            })
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(*order.lock().unwrap(), ["first", "second", "post"]);
    }

    #[tokio::test]
    async fn test_short_circuit_skips_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::builder().add_pre_handler_stage(ShortCircuit).build();

        let handler_calls = calls.clone();
        let response = pipeline
            .process(MiddlewareContext::new(), request(), move |_ctx, _req| {
                handler_calls.fetch_add(1, Ordering::SeqCst);
                Box::pin(async { Response::text(StatusCode::OK, "ok") })
            })
            .await;

        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_stage_order() {
        let stages = Stage::all();
        assert!(stages.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(Stage::ConditionalGet.is_pre_handler());
        assert!(Stage::Jsonp.is_post_handler());
        assert_eq!(Stage::Instrumentation.name(), "instrumentation");
    }
}
