//! # HTTP Server
//!
//! Serves a router over HTTP/1.1 and HTTP/2 with [`hyper`]. Each accepted
//! connection runs on its own tokio task, so unrelated requests interleave
//! freely on the runtime's worker pool. When the shutdown future resolves the
//! listener is closed and in-flight connections are drained gracefully.
//!
//! Requests abandoned by the client are dropped with their pending futures;
//! storage operations already issued are not rolled back. No timeouts are
//! imposed here, wrap the router in a `tower` timeout layer if needed.

use std::{convert::Infallible, future::Future};

use http::{Request, Response};
use hyper::body::Incoming;
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::{conn::auto::Builder, graceful::GracefulShutdown},
    service::TowerToHyperService,
};
use tokio::net::TcpListener;
use tower::Service;
use tracing::{debug, info, warn};

use crate::people::api::router::PeopleBody;

/// Default port of the people HTTP server.
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Accepts connections on `listener` until `shutdown` resolves.
///
/// # Arguments
/// * `listener` - Bound TCP listener
/// * `router` - Service answering every request, cloned per connection
/// * `shutdown` - Future resolving when the server must stop accepting
pub async fn serve<R, F>(listener: TcpListener, router: R, shutdown: F)
where
    R: Service<Request<Incoming>, Response = Response<PeopleBody>, Error = Infallible>
        + Clone
        + Send
        + 'static,
    R::Future: Send + 'static,
    F: Future<Output = ()> + Send,
{
    if let Ok(address) = listener.local_addr() {
        info!("[http] listening on {}", address);
    }
    let builder = Builder::new(TokioExecutor::new());
    let graceful = GracefulShutdown::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => {
                info!("[http] shutdown requested");
                break;
            }
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!("[http] accept error: {}", e);
                        continue;
                    }
                };
                debug!("[http] connection from {}", peer);
                let connection = builder
                    .serve_connection(TokioIo::new(stream), TowerToHyperService::new(router.clone()))
                    .into_owned();
                let connection = graceful.watch(connection);
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        debug!("[http] connection from {} closed with error: {}", peer, e);
                    }
                });
            }
        }
    }

    drop(listener);
    graceful.shutdown().await;
    info!("[http] server stopped");
}
