//! Server module
//!
//! HTTP/1.1 transport: reusable listener, accept loop, per-connection hyper
//! service and shutdown signals. Dispatch itself is synchronous and runs on the
//! blocking pool.

pub mod connection;
pub mod listener;
pub mod signal;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::app::App;

pub use listener::create_reusable_listener;
pub use signal::shutdown_signal;

/// Accept connections until `shutdown` resolves
///
/// Connections accepted before shutdown keep running until they finish or hit
/// `connection_timeout`.
pub async fn serve(
    listener: TcpListener,
    app: Arc<App>,
    connection_timeout: Duration,
    shutdown: impl Future<Output = ()>,
) {
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        tracing::trace!(%peer_addr, "connection accepted");
                        connection::handle_connection(
                            stream,
                            peer_addr,
                            Arc::clone(&app),
                            connection_timeout,
                        );
                    }
                    Err(e) => tracing::error!(error = %e, "failed to accept connection"),
                }
            }

            () = &mut shutdown => {
                tracing::info!("shutdown requested, no longer accepting connections");
                break;
            }
        }
    }
}
