// Connection handling module
// Serves one accepted TCP connection and bridges hyper requests to the app

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use crate::app::App;
use crate::http::{Request, Response};
use crate::middleware::ClientAddr;

/// Serve a connection in a spawned task.
///
/// The whole connection (including keep-alive reuse) is bounded by `timeout`.
pub fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    app: Arc<App>,
    timeout: Duration,
) {
    tokio::spawn(async move {
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(%peer_addr, error = %e, "failed to set TCP_NODELAY");
        }
        let io = TokioIo::new(stream);

        let service = service_fn(move |req| handle_request(req, peer_addr, Arc::clone(&app)));
        let conn = http1::Builder::new()
            .keep_alive(true)
            .serve_connection(io, service);

        match tokio::time::timeout(timeout, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::warn!(%peer_addr, error = %err, "failed to serve connection"),
            Err(_) => tracing::warn!(
                %peer_addr,
                "connection timeout after {} seconds",
                timeout.as_secs()
            ),
        }
    });
}

/// Convert a hyper request, run the app on the blocking pool and convert back
///
/// Handler errors that escaped the exception boundary become `500`.
pub async fn handle_request(
    req: hyper::Request<Incoming>,
    peer_addr: SocketAddr,
    app: Arc<App>,
) -> Result<hyper::Response<Full<Bytes>>, Infallible> {
    let (mut parts, body) = req.into_parts();
    let is_head = parts.method == Method::HEAD;

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            tracing::warn!(%peer_addr, error = %e, "failed to read request body");
            let mut resp = Response::new();
            resp.set_status(StatusCode::BAD_REQUEST);
            resp.text("Bad Request");
            return Ok(resp.into_hyper(is_head));
        }
    };

    let method = parts.method.clone();
    let path = parts.uri.path().to_string();
    parts.extensions.insert(ClientAddr(peer_addr));
    let request = Request::from_parts(parts, body);

    let response = match tokio::task::spawn_blocking(move || app.handle(request)).await {
        Ok(Ok(resp)) => resp,
        Ok(Err(err)) => {
            tracing::error!(%method, path = %path, error = %err, "unhandled handler error");
            Response::internal_error()
        }
        Err(err) => {
            tracing::error!(%method, path = %path, error = %err, "handler task failed");
            Response::internal_error()
        }
    };

    Ok(response.into_hyper(is_head))
}
