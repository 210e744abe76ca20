//! Serving an [`App`] over HTTP/1.

use crate::error::TrestleError;
use crate::routes::App;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use trestle_middleware::{Request, Response, ResponseExt};

/// Serves `app` on `listener` until the process ends.
///
/// # Errors
///
/// Returns [`TrestleError::Io`] if the listener has no local address.
pub async fn serve(app: Arc<App>, listener: TcpListener) -> Result<(), TrestleError> {
    serve_with_shutdown(app, listener, std::future::pending()).await
}

/// Serves `app` on `listener` until `shutdown` resolves.
///
/// Connections already accepted keep running after shutdown.
///
/// # Errors
///
/// Returns [`TrestleError::Io`] if the listener has no local address.
pub async fn serve_with_shutdown<S>(
    app: Arc<App>,
    listener: TcpListener,
    shutdown: S,
) -> Result<(), TrestleError>
where
    S: Future<Output = ()> + Send,
{
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "trestle listening");
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, remote_addr)) => {
                    let app = Arc::clone(&app);
                    tokio::spawn(async move {
                        if let Err(e) = serve_connection(app, stream).await {
                            tracing::debug!(%remote_addr, error = %e, "connection closed with error");
                        }
                    });
                }
                Err(e) => tracing::error!(error = %e, "failed to accept connection"),
            },
            () = &mut shutdown => {
                tracing::info!(%addr, "shutdown requested, no longer accepting connections");
                break;
            }
        }
    }

    Ok(())
}

async fn serve_connection(app: Arc<App>, stream: TcpStream) -> Result<(), hyper::Error> {
    let io = TokioIo::new(stream);
    let service = service_fn(move |request: http::Request<Incoming>| {
        let app = Arc::clone(&app);
        async move { Ok::<_, Infallible>(handle_incoming(&app, request).await) }
    });
    http1::Builder::new().serve_connection(io, service).await
}

async fn handle_incoming(app: &App, request: http::Request<Incoming>) -> Response {
    let (parts, body) = request.into_parts();
    match body.collect().await {
        Ok(collected) => {
            let request: Request = http::Request::from_parts(parts, Full::new(collected.to_bytes()));
            app.handle(request).await
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to read request body");
            Response::text(http::StatusCode::BAD_REQUEST, "failed to read request body")
        }
    }
}

/// Binds `addr` and serves `app` until `shutdown` resolves.
///
/// # Errors
///
/// Returns [`TrestleError::Io`] if binding fails.
pub async fn bind_and_serve<S>(app: App, addr: SocketAddr, shutdown: S) -> Result<(), TrestleError>
where
    S: Future<Output = ()> + Send,
{
    let listener = TcpListener::bind(addr).await?;
    serve_with_shutdown(Arc::new(app), listener, shutdown).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Controller, Endpoint};
    use crate::routes::ApiRouter;
    use crate::settings::Settings;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::sync::oneshot;
    use trestle_router::ApiScope;

    #[tokio::test]
    async fn test_serves_envelope_over_tcp() {
        let controller = Arc::new(Controller::new("letters"));
        let index = Endpoint::new(&controller, "index", |action| async move {
            action.expose(&json!(["a", "b"]))
        });
        let router = ApiRouter::new()
            .mount(ApiScope::new().version(1).get("/letters", index))
            .unwrap();
        let app = Arc::new(App::new(Settings::for_environment("test"), router));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();
        let server = tokio::spawn(serve_with_shutdown(app, listener, async {
            let _ = stopped.await;
        }));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /1/letters HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut raw = String::new();
        stream.read_to_string(&mut raw).await.unwrap();

        assert!(raw.starts_with("HTTP/1.1 200 OK"));
        assert!(raw.ends_with(r#"{"count":2,"response":["a","b"]}"#));

        stop.send(()).unwrap();
        server.await.unwrap().unwrap();
    }
}
