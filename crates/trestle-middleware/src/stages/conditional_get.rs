//! Conditional GET stage.
//!
//! Reads the entity tags listed in `If-None-Match` and, if any of them is
//! still the current digest in the ETag cache, answers with a bare
//! `304 Not Modified` without running the handler. Tags are of the form
//! `"<key>:<digest>"`; anything else passes through.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response, ResponseExt};
use http::header::IF_NONE_MATCH;
use trestle_cache::EtagCache;

/// Short-circuits requests whose entity tag is still fresh.
#[derive(Debug, Clone)]
pub struct ConditionalGetMiddleware {
    cache: EtagCache,
}

impl ConditionalGetMiddleware {
    /// Creates the stage over `cache`.
    #[must_use]
    pub fn new(cache: EtagCache) -> Self {
        Self { cache }
    }

    /// The cache consulted for freshness.
    #[must_use]
    pub fn cache(&self) -> &EtagCache {
        &self.cache
    }

    fn is_fresh(&self, request: &Request) -> bool {
        request
            .headers()
            .get_all(IF_NONE_MATCH)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .any(|value| self.cache.matches_any(value))
    }
}

impl Middleware for ConditionalGetMiddleware {
    fn name(&self) -> &'static str {
        "conditional_get"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            if self.is_fresh(&request) {
                tracing::debug!(
                    request_id = %ctx.request_id(),
                    http.path = %request.uri().path(),
                    "entity tag is fresh, returning not modified"
                );
                trestle_telemetry::metrics::record_not_modified();
                return Response::not_modified();
            }
            next.run(ctx, request).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;
    use trestle_cache::digest;

    fn request(if_none_match: Option<&str>) -> Request {
        let mut builder = http::Request::builder().uri("/1/users/1");
        if let Some(value) = if_none_match {
            builder = builder.header(IF_NONE_MATCH, value);
        }
        builder.body(Full::new(Bytes::new())).unwrap()
    }

    fn ok() -> Next<'static> {
        Next::handler(|_ctx, _req| Box::pin(async { Response::text(StatusCode::OK, "fresh body") }))
    }

    fn seeded() -> (ConditionalGetMiddleware, String) {
        let cache = EtagCache::in_memory();
        let key = digest("User/1");
        let value = digest("user 1 rev 1");
        cache.store().set(&key, value.clone());
        (ConditionalGetMiddleware::new(cache), format!("\"{key}:{value}\""))
    }

    #[tokio::test]
    async fn test_fresh_tag_short_circuits() {
        let (stage, etag) = seeded();
        let mut ctx = MiddlewareContext::new();
        let response = stage.process(&mut ctx, request(Some(&etag)), ok()).await;
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert!(response.headers().is_empty());
    }

    #[tokio::test]
    async fn test_any_listed_tag_may_match() {
        let (stage, etag) = seeded();
        let header = format!("\"abc:def\", {etag}");
        let mut ctx = MiddlewareContext::new();
        let response = stage.process(&mut ctx, request(Some(&header)), ok()).await;
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn test_stale_or_absent_tag_passes_through() {
        let (stage, _) = seeded();
        let key = digest("User/1");

        for header in [None, Some(format!("\"{key}:stale\"")), Some("\"no-colon\"".to_string())] {
            let mut ctx = MiddlewareContext::new();
            let response = stage
                .process(&mut ctx, request(header.as_deref()), ok())
                .await;
            assert_eq!(response.status(), StatusCode::OK);
        }
    }
}
