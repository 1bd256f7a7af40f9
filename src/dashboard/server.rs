// ABOUTME: HTTP/1 accept loop serving the dashboard with hyper.
// ABOUTME: One task per connection; stops accepting when the shutdown future resolves.

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use crate::store::Repository;

use super::handler::Dashboard;

/// Delay before accepting again after a failed accept (e.g. fd exhaustion).
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Serve `dashboard` on `listener` until `shutdown` completes.
pub async fn serve<R, F>(listener: TcpListener, dashboard: Arc<Dashboard<R>>, shutdown: F)
where
    R: Repository + 'static,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Dashboard listening on http://{}", addr);
    }

    loop {
        let (stream, peer) = tokio::select! {
            () = &mut shutdown => {
                tracing::info!("Dashboard shutting down");
                return;
            }
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::warn!("Failed to accept connection: {}", e);
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            },
        };

        let dashboard = Arc::clone(&dashboard);
        tokio::spawn(async move {
            let service = service_fn(move |req: Request<Incoming>| {
                let dashboard = Arc::clone(&dashboard);
                async move { Ok::<_, Infallible>(dashboard.handle(req).await) }
            });

            if let Err(e) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                tracing::debug!("Connection from {} closed with error: {}", peer, e);
            }
        });
    }
}
