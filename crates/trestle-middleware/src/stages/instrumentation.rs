//! Instrumentation stage.
//!
//! Emits a `start_processing` event when a request enters and a
//! `process_action` event with the status and duration when it leaves, and
//! records the request metrics. The action label is the routed
//! `controller#action` when the handler recorded one, else the path.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response};
use trestle_telemetry::metrics::{record_request, InFlightGuard};

/// Logs and measures every request.
#[derive(Debug, Clone, Default)]
pub struct InstrumentationMiddleware {
    _private: (),
}

impl InstrumentationMiddleware {
    /// Creates the stage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Middleware for InstrumentationMiddleware {
    fn name(&self) -> &'static str {
        "instrumentation"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let method = request.method().clone();
            let path = request.uri().path().to_string();

            tracing::info!(
                request_id = %ctx.request_id(),
                http.method = %method,
                http.path = %path,
                "start_processing"
            );

            let response = {
                let _in_flight = InFlightGuard::new();
                next.run(ctx, request).await
            };

            let duration = ctx.elapsed();
            let status = response.status().as_u16();
            let action = ctx.action().unwrap_or(&path).to_string();

            tracing::info!(
                request_id = %ctx.request_id(),
                action = %action,
                api.version = ?ctx.api_version(),
                http.method = %method,
                http.path = %path,
                http.status_code = status,
                duration_ms = duration.as_secs_f64() * 1000.0,
                "process_action"
            );

            record_request(&action, status, duration);
            response
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResponseExt;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;

    fn request() -> Request {
        http::Request::builder()
            .method("POST")
            .uri("/1/users")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_passes_response_through() {
        let stage = InstrumentationMiddleware::new();
        let mut ctx = MiddlewareContext::new();
        let next = Next::handler(|ctx: &mut MiddlewareContext, _req| {
            ctx.set_action("users#create");
            Box::pin(async { Response::text(StatusCode::CREATED, "made") })
        });

        let response = stage.process(&mut ctx, request(), next).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(ctx.action(), Some("users#create"));
        assert_eq!(stage.name(), "instrumentation");
    }
}
